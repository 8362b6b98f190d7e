//! Record sources feeding the schema builder

use crate::core::error::LoadError;
use async_trait::async_trait;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// Produces the record set a schema is derived from
///
/// Called once at startup and once per reload.
#[async_trait]
pub trait RecordSource: Send + Sync {
    async fn load_records(&self) -> Result<Vec<Value>, LoadError>;

    /// Short label used in log lines
    fn describe(&self) -> String {
        "records".to_string()
    }
}

/// Reads a JSON array of records from a file
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl RecordSource for JsonFileSource {
    async fn load_records(&self) -> Result<Vec<Value>, LoadError> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| LoadError::Io {
                path: self.path.clone(),
                source,
            })?;
        parse_records(&content).map_err(|e| match e {
            ParseFailure::Json(source) => LoadError::Json {
                path: self.path.clone(),
                source,
            },
            ParseFailure::NotAnArray => LoadError::NotAnArray,
        })
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

enum ParseFailure {
    Json(serde_json::Error),
    NotAnArray,
}

fn parse_records(content: &str) -> Result<Vec<Value>, ParseFailure> {
    match serde_json::from_str::<Value>(content).map_err(ParseFailure::Json)? {
        Value::Array(records) => Ok(records),
        _ => Err(ParseFailure::NotAnArray),
    }
}

/// In-memory record set that can be swapped out between reloads
#[derive(Debug, Default)]
pub struct StaticRecords {
    records: RwLock<Vec<Value>>,
}

impl StaticRecords {
    pub fn new(records: Vec<Value>) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }

    /// Replace the records served by the next load
    pub fn replace(&self, records: Vec<Value>) {
        *self
            .records
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = records;
    }
}

#[async_trait]
impl RecordSource for StaticRecords {
    async fn load_records(&self) -> Result<Vec<Value>, LoadError> {
        Ok(self
            .records
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone())
    }

    fn describe(&self) -> String {
        "in-memory records".to_string()
    }
}
