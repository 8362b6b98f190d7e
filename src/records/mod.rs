//! Record-derived schemas
//!
//! A [`RecordSource`] supplies a JSON array of records and
//! [`RecordSchemaBuilder`] turns it into a schema with one object type and
//! lookup fields on the query root.

pub mod builder;
pub mod loader;

pub use builder::RecordSchemaBuilder;
pub use loader::{JsonFileSource, RecordSource, StaticRecords};
