//! # hotql
//!
//! A minimal GraphQL-style query engine: a schema of object types and
//! scalars, a parser for the selection-set subset of the query language, a
//! validator, an async executor with null propagation, and a schema that can
//! be rebuilt from JSON records and swapped atomically while requests run.
//!
//! ## Features
//!
//! - **Schema model**: object types, built-in and custom scalars, arguments with defaults
//! - **Async resolvers**: every field is resolved through a [`Resolver`](core::Resolver)
//! - **Null propagation**: failures bubble to the nearest nullable ancestor
//! - **Record-derived schemas**: build a type and lookup fields from a JSON array
//! - **Hot reload**: SIGUSR1, interval or admin endpoint; in-flight requests keep their schema
//! - **HTTP server**: axum router with GraphQL GET/POST, SDL and health routes
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use hotql::prelude::*;
//!
//! let query = ObjectType::new("Query").field(
//!     FieldDefinition::new("hello", FieldType::named("String"))
//!         .resolver(resolver_fn(|_, _, _| Ok(FieldValue::string("world")))),
//! );
//! let schema = Arc::new(Schema::builder().query(query).build()?);
//!
//! let response = hotql::executor::run("{ hello }", schema, ContextData::new()).await;
//! assert_eq!(response.to_json().to_string(), r#"{"data":{"hello":"world"}}"#);
//! ```

pub mod config;
pub mod core;
pub mod executor;
pub mod query;
pub mod records;
pub mod reload;
pub mod server;
pub mod validation;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Schema model ===
    pub use crate::core::{
        ArgumentDefinition, Arguments, CustomValue, FieldDefinition, FieldType, FieldValue,
        KeyResolver, ObjectType, Resolver, ScalarType, Schema, SchemaBuilder, SharedResolver,
        resolver_fn,
    };

    // === Execution ===
    pub use crate::core::{CancelHandle, ContextData, ExecutionContext};
    pub use crate::executor::{Executor, GraphQLError, PathSegment, Response, ResultNode};
    pub use crate::query::parse_query;
    pub use crate::validation::{ValidatedQuery, validate};

    // === Errors ===
    pub use crate::core::{
        HotqlError, LoadError, ReloadError, ResolverError, ScalarError, SchemaError, SyntaxError,
        ValidationError,
    };

    // === Records and reload ===
    pub use crate::records::{JsonFileSource, RecordSchemaBuilder, RecordSource, StaticRecords};
    pub use crate::reload::{ReloadController, ReloadOutcome, SchemaRegistry};

    // === Config ===
    pub use crate::config::{HotqlConfig, RecordsConfig, ReloadConfig, ServerConfig};

    // === Server ===
    pub use crate::server::{ServerBuilder, ServerHost};

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
    pub use serde_json::{Value, json};
    pub use std::sync::Arc;

    // === Axum ===
    pub use axum::{
        Router,
        http::HeaderMap,
        routing::{get, post},
    };
}
