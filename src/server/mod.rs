//! HTTP server for a hotql schema
//!
//! [`ServerBuilder`] assembles a [`ServerHost`] (configuration, schema
//! registry and optional reload controller) and exposes it through:
//! - the GraphQL endpoint (`/graphql` by default, GET and POST)
//! - health checks and the optional admin reload route

pub mod builder;
pub mod exposure;
pub mod host;
pub mod router;

pub use builder::ServerBuilder;
pub use exposure::{GraphQLExposure, RestExposure};
pub use host::ServerHost;
pub use router::build_router;
