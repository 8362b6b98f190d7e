//! Configuration loading and management

use crate::core::error::ConfigError;
use crate::records::RecordSchemaBuilder;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// HTTP listener settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind, e.g. "127.0.0.1:8080"
    pub bind: String,

    /// Path serving GraphQL requests; the SDL is served at `{graphql_path}/schema`
    pub graphql_path: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8080".to_string(),
            graphql_path: "/graphql".to_string(),
        }
    }
}

/// Where records come from and how the derived schema is named
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordsConfig {
    /// JSON file holding an array of records
    pub path: PathBuf,

    #[serde(default = "default_type_name")]
    pub type_name: String,

    #[serde(default = "default_single_field")]
    pub single_field: String,

    /// Set to null to leave the list field out
    #[serde(default = "default_list_field")]
    pub list_field: Option<String>,

    #[serde(default)]
    pub infer_scalars: bool,
}

fn default_type_name() -> String {
    "User".to_string()
}

fn default_single_field() -> String {
    "user".to_string()
}

fn default_list_field() -> Option<String> {
    Some("users".to_string())
}

impl RecordsConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            type_name: default_type_name(),
            single_field: default_single_field(),
            list_field: default_list_field(),
            infer_scalars: false,
        }
    }

    /// Schema builder configured with these names
    pub fn schema_builder(&self) -> RecordSchemaBuilder {
        RecordSchemaBuilder::new()
            .type_name(&self.type_name)
            .single_field(&self.single_field)
            .list_field(self.list_field.clone())
            .infer_scalars(self.infer_scalars)
    }
}

/// Which triggers may start a schema reload
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReloadConfig {
    /// Reload on SIGUSR1 (unix only)
    pub on_signal: bool,

    /// Expose `POST /admin/reload`
    pub admin_endpoint: bool,

    /// Reload periodically
    pub interval_secs: Option<u64>,
}

impl ReloadConfig {
    pub fn interval(&self) -> Option<Duration> {
        self.interval_secs.map(Duration::from_secs)
    }
}

/// Complete configuration of a hotql server
///
/// # Example
///
/// ```yaml
/// server:
///   bind: "0.0.0.0:8080"
/// records:
///   path: data.json
///   infer_scalars: true
/// reload:
///   on_signal: true
///   admin_endpoint: true
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HotqlConfig {
    pub server: ServerConfig,

    /// Absent when the schema is supplied in code
    pub records: Option<RecordsConfig>,

    pub reload: ReloadConfig,
}

impl HotqlConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&content)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the server cannot start with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.bind.trim().is_empty() {
            return Err(ConfigError::new("server.bind", "must not be empty"));
        }
        let path = &self.server.graphql_path;
        if !path.starts_with('/') || path.len() < 2 || path.ends_with('/') {
            return Err(ConfigError::new(
                "server.graphql_path",
                format!("\"{}\" must start with '/' and name a route", path),
            ));
        }
        if ["/health", "/healthz", "/admin"].iter().any(|reserved| path.starts_with(reserved)) {
            return Err(ConfigError::new(
                "server.graphql_path",
                format!("\"{}\" collides with the health and admin routes", path),
            ));
        }

        if let Some(records) = &self.records {
            for (field, value) in [
                ("records.type_name", &records.type_name),
                ("records.single_field", &records.single_field),
            ] {
                if value.trim().is_empty() {
                    return Err(ConfigError::new(field, "must not be empty"));
                }
            }
            if let Some(list_field) = &records.list_field {
                if list_field.trim().is_empty() {
                    return Err(ConfigError::new("records.list_field", "must not be empty"));
                }
                if list_field == &records.single_field {
                    return Err(ConfigError::new(
                        "records.list_field",
                        "must differ from records.single_field",
                    ));
                }
            }
        }

        if self.reload.interval_secs == Some(0) {
            return Err(ConfigError::new("reload.interval_secs", "must be at least 1"));
        }
        Ok(())
    }

    /// Whether any reload trigger is enabled
    pub fn reload_enabled(&self) -> bool {
        self.reload.on_signal || self.reload.admin_endpoint || self.reload.interval_secs.is_some()
    }
}
