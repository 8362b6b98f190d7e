//! Query execution
//!
//! The executor is split into several sub-modules:
//! - `core`: entry points that parse, validate and drive execution
//! - `field_resolver`: resolver invocation, value completion and null propagation
//! - `response`: the result tree and error entries returned to callers
//! - `utils`: argument coercion and field grouping

mod core;
mod field_resolver;
pub mod response;
pub(crate) mod utils;

pub use self::core::{Executor, execute, run};
pub use response::{ErrorExtensions, GraphQLError, Location, PathSegment, Response, ResultNode};

