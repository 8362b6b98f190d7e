//! Core schema model of the engine

pub mod context;
pub mod error;
pub mod field;
pub mod resolver;
pub mod scalar;
pub mod schema;

pub use context::{CancelHandle, ContextData, ExecutionContext};
pub use error::{
    ConfigError, HotqlError, LoadError, ReloadError, ResolverError, ScalarError, SchemaError,
    SyntaxError, ValidationError, ValidationErrorKind,
};
pub use field::{CustomValue, FieldValue};
pub use resolver::{Arguments, FnResolver, KeyResolver, Resolver, SharedResolver, resolver_fn};
pub use scalar::ScalarType;
pub use schema::{
    ArgumentDefinition, FieldDefinition, FieldType, NamedType, ObjectType, Schema, SchemaBuilder,
};
