//! Background tasks that start reloads
//!
//! Every trigger calls [`ReloadController::reload`]; outcomes are logged by the
//! controller, so the tasks here ignore them.

use super::controller::ReloadController;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Reload whenever the process receives SIGUSR1
#[cfg(unix)]
pub fn spawn_signal_trigger(controller: Arc<ReloadController>) -> std::io::Result<JoinHandle<()>> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut signals = signal(SignalKind::user_defined1())?;
    Ok(tokio::spawn(async move {
        while signals.recv().await.is_some() {
            tracing::info!("received SIGUSR1, reloading schema");
            let _ = controller.reload().await;
        }
    }))
}

#[cfg(not(unix))]
pub fn spawn_signal_trigger(_controller: Arc<ReloadController>) -> std::io::Result<JoinHandle<()>> {
    Err(std::io::Error::new(
        std::io::ErrorKind::Unsupported,
        "signal-triggered reload requires a unix platform",
    ))
}

/// Reload every `period`, starting one period from now
pub fn spawn_interval_trigger(controller: Arc<ReloadController>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            tracing::debug!(period_secs = period.as_secs_f64(), "interval reload");
            let _ = controller.reload().await;
        }
    })
}
