//! Operational REST endpoints
//!
//! - `GET /health` and `GET /healthz`: liveness plus the active schema generation
//! - `POST /admin/reload`: rebuild the schema from its record source, when enabled

use super::super::host::ServerHost;
use crate::core::error::HotqlError;
use crate::reload::ReloadOutcome;
use axum::{
    Json, Router,
    extract::Extension,
    routing::{get, post},
};
use serde_json::{Value, json};
use std::sync::Arc;

pub struct RestExposure;

impl RestExposure {
    /// Build the REST router from a host
    ///
    /// The reload route exists only when `reload.admin_endpoint` is set; on a
    /// host without a record source it answers 404 with `RELOAD_NOT_CONFIGURED`.
    pub fn build_router(host: Arc<ServerHost>) -> Router {
        let mut router = Self::health_routes();
        if host.config.reload.admin_endpoint {
            router = router.route("/admin/reload", post(Self::reload));
        }
        router.layer(Extension(host))
    }

    fn health_routes() -> Router {
        Router::new()
            .route("/health", get(Self::health_check))
            .route("/healthz", get(Self::health_check))
    }

    async fn health_check(Extension(host): Extension<Arc<ServerHost>>) -> Json<Value> {
        let published = host.registry.snapshot();
        Json(json!({
            "status": "ok",
            "service": "hotql",
            "generation": published.generation,
            "published_at": published.published_at,
        }))
    }

    async fn reload(
        Extension(host): Extension<Arc<ServerHost>>,
    ) -> Result<Json<ReloadOutcome>, HotqlError> {
        Ok(Json(host.reload().await?))
    }
}
