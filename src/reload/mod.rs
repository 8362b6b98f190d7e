//! Hot schema reload
//!
//! - `registry`: the published schema, swapped atomically
//! - `controller`: load, build and publish, one reload at a time
//! - `trigger`: signal and interval tasks that start reloads

pub mod controller;
pub mod registry;
pub mod trigger;

pub use controller::{ReloadController, ReloadOutcome};
pub use registry::{PublishedSchema, SchemaRegistry};
pub use trigger::{spawn_interval_trigger, spawn_signal_trigger};
