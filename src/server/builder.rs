//! ServerBuilder for fluent API to build HTTP servers

use super::host::ServerHost;
use super::router::build_router;
use crate::config::HotqlConfig;
use crate::core::schema::Schema;
use crate::records::{JsonFileSource, RecordSchemaBuilder, RecordSource};
use crate::reload::{ReloadController, SchemaRegistry, spawn_interval_trigger, spawn_signal_trigger};
use anyhow::{Result, bail};
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Builder for a hotql HTTP server
///
/// The schema comes from exactly one place: a schema built in code
/// ([`with_schema`](Self::with_schema)), a record source
/// ([`with_record_source`](Self::with_record_source)) or the `records.path`
/// entry of the configuration.
///
/// # Example
///
/// ```ignore
/// ServerBuilder::new()
///     .with_config(HotqlConfig::from_yaml_file("hotql.yaml")?)
///     .serve("127.0.0.1:8080")
///     .await?;
/// ```
pub struct ServerBuilder {
    config: HotqlConfig,
    schema: Option<Schema>,
    record_source: Option<Arc<dyn RecordSource>>,
    record_schema: Option<RecordSchemaBuilder>,
    custom_routes: Vec<Router>,
}

impl ServerBuilder {
    pub fn new() -> Self {
        Self {
            config: HotqlConfig::default(),
            schema: None,
            record_source: None,
            record_schema: None,
            custom_routes: Vec::new(),
        }
    }

    pub fn with_config(mut self, config: HotqlConfig) -> Self {
        self.config = config;
        self
    }

    /// Serve a fixed schema; reload is unavailable
    pub fn with_schema(mut self, schema: Schema) -> Self {
        self.schema = Some(schema);
        self
    }

    /// Derive the schema from records, overriding `records.path`
    pub fn with_record_source(mut self, source: impl RecordSource + 'static) -> Self {
        let source: Arc<dyn RecordSource> = Arc::new(source);
        self.record_source = Some(source);
        self
    }

    /// Override the names and inference settings taken from `records`
    pub fn with_record_schema(mut self, builder: RecordSchemaBuilder) -> Self {
        self.record_schema = Some(builder);
        self
    }

    /// Add routes next to the GraphQL and REST ones
    pub fn with_custom_routes(mut self, routes: Router) -> Self {
        self.custom_routes.push(routes);
        self
    }

    /// Build the transport-agnostic host
    ///
    /// For record-backed schemas this loads the records and builds the first
    /// schema; a failure here is returned since nothing could be served.
    pub async fn build_host(&mut self) -> Result<ServerHost> {
        self.config.validate()?;

        if let Some(schema) = self.schema.take() {
            if self.record_source.is_some() {
                bail!("A static schema and a record source cannot be combined");
            }
            if self.config.reload_enabled() {
                tracing::warn!("reload triggers are configured but the schema is static; ignoring them");
            }
            let registry = Arc::new(SchemaRegistry::new(schema));
            return Ok(ServerHost::new(self.config.clone(), registry));
        }

        let source: Arc<dyn RecordSource> = match (self.record_source.take(), &self.config.records) {
            (Some(source), _) => source,
            (None, Some(records)) => Arc::new(JsonFileSource::new(&records.path)),
            (None, None) => bail!(
                "No schema configured. Call .with_schema(), .with_record_source() or set records.path"
            ),
        };
        let builder = match (self.record_schema.take(), &self.config.records) {
            (Some(builder), _) => builder,
            (None, Some(records)) => records.schema_builder(),
            (None, None) => RecordSchemaBuilder::new(),
        };

        let controller = ReloadController::initialize(source, builder).await?;
        Ok(ServerHost::with_reload(self.config.clone(), Arc::new(controller)))
    }

    /// Build the host and the router serving it
    pub async fn build(mut self) -> Result<Router> {
        let host = Arc::new(self.build_host().await?);
        Ok(build_router(host, std::mem::take(&mut self.custom_routes)))
    }

    /// Serve the application with graceful shutdown
    ///
    /// Reload triggers enabled in the configuration run until shutdown.
    /// SIGTERM and Ctrl+C stop the server after in-flight requests complete.
    pub async fn serve(mut self, addr: &str) -> Result<()> {
        let host = Arc::new(self.build_host().await?);
        let triggers = spawn_triggers(&host);
        let app = build_router(host, std::mem::take(&mut self.custom_routes));

        let listener = TcpListener::bind(addr).await?;
        tracing::info!("Server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        for trigger in triggers {
            trigger.abort();
        }
        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn spawn_triggers(host: &ServerHost) -> Vec<tokio::task::JoinHandle<()>> {
    let Some(controller) = &host.reload else {
        return Vec::new();
    };
    let mut triggers = Vec::new();

    if host.config.reload.on_signal {
        match spawn_signal_trigger(controller.clone()) {
            Ok(handle) => {
                tracing::info!("Reload on SIGUSR1 enabled (pid {})", std::process::id());
                triggers.push(handle);
            }
            Err(e) => tracing::warn!(error = %e, "could not install SIGUSR1 reload trigger"),
        }
    }
    if let Some(period) = host.config.reload.interval() {
        tracing::info!(period_secs = period.as_secs(), "Periodic reload enabled");
        triggers.push(spawn_interval_trigger(controller.clone(), period));
    }
    triggers
}

/// Wait for shutdown signal (SIGTERM or Ctrl+C)
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RecordsConfig;
    use crate::core::resolver::resolver_fn;
    use crate::core::schema::{FieldDefinition, FieldType, ObjectType};
    use crate::core::FieldValue;
    use crate::records::StaticRecords;
    use serde_json::json;
    use std::io::Write;

    fn hello_schema() -> Schema {
        let query = ObjectType::new("Query").field(
            FieldDefinition::new("hello", FieldType::named("String"))
                .resolver(resolver_fn(|_, _, _| Ok(FieldValue::string("world")))),
        );
        Schema::builder().query(query).build().unwrap()
    }

    #[tokio::test]
    async fn test_static_schema_host() {
        let host = ServerBuilder::new().with_schema(hello_schema()).build_host().await.unwrap();
        assert!(!host.can_reload());
        assert!(host.registry.current().query_type().get_field("hello").is_some());
    }

    #[tokio::test]
    async fn test_record_source_host() {
        let host = ServerBuilder::new()
            .with_record_source(StaticRecords::new(vec![json!({"id": "1", "name": "Dan"})]))
            .with_record_schema(RecordSchemaBuilder::new().type_name("Person").single_field("person"))
            .build_host()
            .await
            .unwrap();
        assert!(host.can_reload());
        assert!(host.registry.current().object_type("Person").is_some());
    }

    #[tokio::test]
    async fn test_records_path_from_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"[{{"id": "1"}}]"#).unwrap();
        let config = HotqlConfig {
            records: Some(RecordsConfig::new(file.path())),
            ..Default::default()
        };
        let host = ServerBuilder::new().with_config(config).build_host().await.unwrap();
        assert!(host.registry.current().object_type("User").is_some());
    }

    #[tokio::test]
    async fn test_missing_schema_is_an_error() {
        let err = ServerBuilder::new().build_host().await.err().unwrap();
        assert!(err.to_string().contains("No schema configured"));
    }

    #[tokio::test]
    async fn test_static_schema_and_source_conflict() {
        let result = ServerBuilder::new()
            .with_schema(hello_schema())
            .with_record_source(StaticRecords::new(vec![json!({"id": "1"})]))
            .build_host()
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_initial_build_failure_is_fatal() {
        let result = ServerBuilder::new()
            .with_record_source(StaticRecords::new(vec![json!("not a record")]))
            .build_host()
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_invalid_config_is_rejected() {
        let mut config = HotqlConfig::default();
        config.reload.interval_secs = Some(0);
        let result = ServerBuilder::new()
            .with_config(config)
            .with_schema(hello_schema())
            .build()
            .await;
        assert!(result.is_err());
    }
}
