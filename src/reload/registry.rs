//! Atomic publication of the active schema

use crate::core::schema::Schema;
use crate::executor::Executor;
use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// A schema together with the generation it was published as
#[derive(Debug)]
pub struct PublishedSchema {
    pub schema: Arc<Schema>,
    /// Starts at 1 and increases by one per publication
    pub generation: u64,
    pub published_at: DateTime<Utc>,
}

/// Holds the schema new requests execute against
///
/// Readers take a lock-free snapshot; a publication replaces the whole
/// snapshot in one swap, so no request ever observes a half-built schema.
#[derive(Debug)]
pub struct SchemaRegistry {
    current: ArcSwap<PublishedSchema>,
}

impl SchemaRegistry {
    pub fn new(schema: Schema) -> Self {
        Self {
            current: ArcSwap::from_pointee(PublishedSchema {
                schema: Arc::new(schema),
                generation: 1,
                published_at: Utc::now(),
            }),
        }
    }

    /// Schema for a new request; stays valid after later publications
    pub fn current(&self) -> Arc<Schema> {
        self.current.load().schema.clone()
    }

    pub fn snapshot(&self) -> Arc<PublishedSchema> {
        self.current.load_full()
    }

    pub fn generation(&self) -> u64 {
        self.current.load().generation
    }

    /// Executor bound to the current snapshot
    pub fn executor(&self) -> Executor {
        Executor::new(self.current())
    }

    /// Replace the active schema and return the new publication
    pub fn publish(&self, schema: Schema) -> Arc<PublishedSchema> {
        let schema = Arc::new(schema);
        let previous = self.current.rcu(|current| PublishedSchema {
            schema: schema.clone(),
            generation: current.generation + 1,
            published_at: Utc::now(),
        });
        tracing::debug!(previous = previous.generation, "schema published");
        self.snapshot()
    }
}
