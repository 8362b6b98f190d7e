//! Server host for transport-agnostic API exposure
//!
//! The host owns everything a request handler needs: the configuration, the
//! registry holding the active schema and, when the schema comes from
//! records, the controller that reloads it.

use crate::config::HotqlConfig;
use crate::core::error::ReloadError;
use crate::executor::Executor;
use crate::reload::{ReloadController, ReloadOutcome, SchemaRegistry};
use std::sync::Arc;

/// Host context shared by every exposure
///
/// # Example
///
/// ```rust,ignore
/// let host = Arc::new(ServerBuilder::new().with_schema(schema).build_host().await?);
/// let app = GraphQLExposure::build_router(host.clone())
///     .merge(RestExposure::build_router(host));
/// ```
pub struct ServerHost {
    pub config: Arc<HotqlConfig>,

    /// Active schema, swapped on reload
    pub registry: Arc<SchemaRegistry>,

    /// Present when the schema is derived from a record source
    pub reload: Option<Arc<ReloadController>>,
}

impl ServerHost {
    /// Host serving a fixed schema
    pub fn new(config: HotqlConfig, registry: Arc<SchemaRegistry>) -> Self {
        Self {
            config: Arc::new(config),
            registry,
            reload: None,
        }
    }

    /// Host whose schema is owned by a reload controller
    pub fn with_reload(config: HotqlConfig, controller: Arc<ReloadController>) -> Self {
        Self {
            config: Arc::new(config),
            registry: controller.registry().clone(),
            reload: Some(controller),
        }
    }

    /// Executor pinned to the schema active right now
    pub fn executor(&self) -> Executor {
        self.registry.executor()
    }

    pub fn generation(&self) -> u64 {
        self.registry.generation()
    }

    pub fn can_reload(&self) -> bool {
        self.reload.is_some()
    }

    pub async fn reload(&self) -> Result<ReloadOutcome, ReloadError> {
        match &self.reload {
            Some(controller) => controller.reload().await,
            None => Err(ReloadError::NotConfigured),
        }
    }
}
