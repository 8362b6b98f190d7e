//! HTTP server with a schema inferred from `demos/data.json`
//!
//! Edit the file (add a key to a record, say) and reload:
//!
//! ```text
//! kill -USR1 <pid>
//! curl -X POST http://127.0.0.1:8080/admin/reload
//! ```
//!
//! Requests already running finish against the schema they started with.

use hotql::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let mut records = RecordsConfig::new(concat!(env!("CARGO_MANIFEST_DIR"), "/demos/data.json"));
    records.infer_scalars = true;

    let config = HotqlConfig {
        records: Some(records),
        reload: ReloadConfig {
            on_signal: true,
            admin_endpoint: true,
            interval_secs: None,
        },
        ..Default::default()
    };
    let bind = config.server.bind.clone();

    println!("🚀 hotql dynamic schema demo (pid {})", std::process::id());
    println!("   GET  http://{}/graphql/schema", bind);
    println!("   POST http://{}/admin/reload\n", bind);

    ServerBuilder::new().with_config(config).serve(&bind).await
}
