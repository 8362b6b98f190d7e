//! Reload orchestration
//!
//! One reload runs at a time; triggers that fire while a reload is in progress
//! wait for it and then run their own. A failed reload leaves the published
//! schema untouched.

use super::registry::SchemaRegistry;
use crate::core::error::ReloadError;
use crate::records::{RecordSchemaBuilder, RecordSource};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Summary of a successful reload
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReloadOutcome {
    pub generation: u64,
    pub type_name: String,
    pub field_count: usize,
    pub record_count: usize,
    pub published_at: DateTime<Utc>,
}

pub struct ReloadController {
    source: Arc<dyn RecordSource>,
    builder: RecordSchemaBuilder,
    registry: Arc<SchemaRegistry>,
    in_flight: Mutex<()>,
}

impl ReloadController {
    /// Load and build the first schema
    ///
    /// Unlike [`reload`](Self::reload), a failure here is returned to the
    /// caller since there is no previous schema to fall back on.
    pub async fn initialize(
        source: Arc<dyn RecordSource>,
        builder: RecordSchemaBuilder,
    ) -> Result<Self, ReloadError> {
        let records = source.load_records().await?;
        let schema = builder.build(&records)?;
        let field_count = count_fields(&schema, &builder);
        tracing::info!(
            source = %source.describe(),
            records = records.len(),
            fields = field_count,
            "initial schema built"
        );

        Ok(Self {
            source,
            builder,
            registry: Arc::new(SchemaRegistry::new(schema)),
            in_flight: Mutex::new(()),
        })
    }

    pub fn registry(&self) -> &Arc<SchemaRegistry> {
        &self.registry
    }

    /// Reload records, rebuild the schema and publish it
    pub async fn reload(&self) -> Result<ReloadOutcome, ReloadError> {
        let _guard = self.in_flight.lock().await;

        match self.rebuild().await {
            Ok(outcome) => {
                tracing::info!(
                    generation = outcome.generation,
                    fields = outcome.field_count,
                    records = outcome.record_count,
                    "schema reloaded"
                );
                Ok(outcome)
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    generation = self.registry.generation(),
                    source = %self.source.describe(),
                    "schema reload failed, keeping current schema"
                );
                Err(e)
            }
        }
    }

    async fn rebuild(&self) -> Result<ReloadOutcome, ReloadError> {
        let records = self.source.load_records().await?;
        let schema = self.builder.build(&records)?;
        let field_count = count_fields(&schema, &self.builder);
        let published = self.registry.publish(schema);

        Ok(ReloadOutcome {
            generation: published.generation,
            type_name: self.builder.object_type_name().to_string(),
            field_count,
            record_count: records.len(),
            published_at: published.published_at,
        })
    }
}

fn count_fields(schema: &crate::core::schema::Schema, builder: &RecordSchemaBuilder) -> usize {
    schema
        .object_type(builder.object_type_name())
        .map(|object| object.fields().count())
        .unwrap_or_default()
}
