//! Typed error handling for hotql
//!
//! Every failure the engine can produce has its own type so callers can
//! react to the category rather than to a string:
//!
//! - [`SyntaxError`]: the query text is malformed (parsing stops at the first one)
//! - [`SchemaError`]: a schema could not be constructed
//! - [`ValidationError`]: the query does not fit the schema (collected as a list)
//! - [`ResolverError`]: a resolver failed for one field at runtime
//! - [`ScalarError`]: a scalar could not convert between wire and native form
//! - [`LoadError`]: the record source could not produce records
//! - [`ReloadError`]: a reload was rejected (the previous schema stays active)
//!
//! [`HotqlError`] wraps the failures that reach an HTTP route as errors and
//! knows how to render itself as a response. Everything else is reported in
//! the GraphQL response body or through `anyhow` at startup.
//!
//! # Example
//!
//! ```rust,ignore
//! match controller.reload().await {
//!     Ok(outcome) => println!("now serving generation {}", outcome.generation),
//!     Err(ReloadError::Schema(SchemaError::MalformedRecord { index })) => {
//!         eprintln!("record #{} is not an object", index);
//!     }
//!     Err(e) => eprintln!("reload failed: {}", e),
//! }
//! ```

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// The main error type for the host layer
#[derive(Debug, thiserror::Error)]
pub enum HotqlError {
    #[error(transparent)]
    Reload(#[from] ReloadError),
}

/// Error response structure for HTTP responses
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
}

impl HotqlError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            HotqlError::Reload(e) => e.status_code(),
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            HotqlError::Reload(e) => e.error_code(),
        }
    }

    /// Convert to an error response
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.error_code().to_string(),
            message: self.to_string(),
        }
    }
}

impl IntoResponse for HotqlError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(self.to_response());
        (status, body).into_response()
    }
}

// =============================================================================
// Syntax Errors
// =============================================================================

/// Malformed query text
///
/// `position` is the byte offset of the offending token; `line` and `column`
/// are 1-based and count characters, not bytes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Syntax Error ({line}:{column}): {message}")]
pub struct SyntaxError {
    pub message: String,
    pub position: usize,
    pub line: usize,
    pub column: usize,
}

impl SyntaxError {
    /// Build an error located at `position` within `source`
    pub fn at(source: &str, position: usize, message: impl Into<String>) -> Self {
        let (line, column) = line_column(source, position);
        Self {
            message: message.into(),
            position,
            line,
            column,
        }
    }
}

fn line_column(source: &str, position: usize) -> (usize, usize) {
    let mut line = 1;
    let mut column = 1;
    for (offset, ch) in source.char_indices() {
        if offset >= position {
            break;
        }
        if ch == '\n' {
            line += 1;
            column = 1;
        } else {
            column += 1;
        }
    }
    (line, column)
}

// =============================================================================
// Schema Errors
// =============================================================================

/// Invalid schema construction
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("Schema has no query root type")]
    MissingRoot,

    #[error("Type '{name}' is defined more than once")]
    DuplicateType { name: String },

    #[error("Field '{type_name}.{field}' is defined more than once")]
    DuplicateField { type_name: String, field: String },

    #[error("Argument '{argument}' of field '{type_name}.{field}' is defined more than once")]
    DuplicateArgument {
        type_name: String,
        field: String,
        argument: String,
    },

    #[error("Field '{type_name}.{field}' references undeclared type '{referenced}'")]
    UnknownType {
        type_name: String,
        field: String,
        referenced: String,
    },

    #[error("Argument '{argument}' of '{type_name}.{field}' must have a scalar type")]
    ArgumentNotScalar {
        type_name: String,
        field: String,
        argument: String,
    },

    #[error("Type '{type_name}' must define one or more fields")]
    EmptyObject { type_name: String },

    #[error("Name '{name}' is not a valid identifier")]
    InvalidName { name: String },

    #[error("Record #{index} is not a key-value mapping")]
    MalformedRecord { index: usize },
}

impl SchemaError {
    pub fn error_code(&self) -> &'static str {
        match self {
            SchemaError::MissingRoot => "SCHEMA_MISSING_ROOT",
            SchemaError::DuplicateType { .. } => "SCHEMA_DUPLICATE_TYPE",
            SchemaError::DuplicateField { .. } => "SCHEMA_DUPLICATE_FIELD",
            SchemaError::DuplicateArgument { .. } => "SCHEMA_DUPLICATE_ARGUMENT",
            SchemaError::UnknownType { .. } => "SCHEMA_UNKNOWN_TYPE",
            SchemaError::ArgumentNotScalar { .. } => "SCHEMA_ARGUMENT_NOT_SCALAR",
            SchemaError::EmptyObject { .. } => "SCHEMA_EMPTY_OBJECT",
            SchemaError::InvalidName { .. } => "SCHEMA_INVALID_NAME",
            SchemaError::MalformedRecord { .. } => "SCHEMA_MALFORMED_RECORD",
        }
    }
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Category of a [`ValidationError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationErrorKind {
    UnknownField,
    UnknownArgument,
    ArgumentTypeMismatch,
    MissingRequiredArgument,
    /// Object-typed field selected without sub-fields
    MissingSelection,
    /// Scalar field selected with sub-fields
    UnexpectedSelection,
    /// One response key used for two different fields or argument sets
    FieldConflict,
}

impl ValidationErrorKind {
    pub fn error_code(&self) -> &'static str {
        match self {
            ValidationErrorKind::UnknownField => "UNKNOWN_FIELD",
            ValidationErrorKind::UnknownArgument => "UNKNOWN_ARGUMENT",
            ValidationErrorKind::ArgumentTypeMismatch => "ARGUMENT_TYPE_MISMATCH",
            ValidationErrorKind::MissingRequiredArgument => "MISSING_REQUIRED_ARGUMENT",
            ValidationErrorKind::MissingSelection => "MISSING_SELECTION",
            ValidationErrorKind::UnexpectedSelection => "UNEXPECTED_SELECTION",
            ValidationErrorKind::FieldConflict => "FIELD_CONFLICT",
        }
    }
}

/// A query/schema mismatch found by the validator
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ValidationError {
    pub kind: ValidationErrorKind,
    pub message: String,
    /// Response keys from the operation root down to the offending field
    pub path: Vec<String>,
}

impl ValidationError {
    pub fn new(kind: ValidationErrorKind, path: Vec<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            path,
        }
    }
}

// =============================================================================
// Runtime Errors
// =============================================================================

/// A resolver failed to produce its field's value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverError {
    pub message: String,
}

impl ResolverError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for ResolverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ResolverError {}

impl From<anyhow::Error> for ResolverError {
    fn from(err: anyhow::Error) -> Self {
        ResolverError::new(err.to_string())
    }
}

impl From<ScalarError> for ResolverError {
    fn from(err: ScalarError) -> Self {
        ResolverError::new(err.to_string())
    }
}

/// A scalar could not convert a value
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScalarError {
    /// Native value → wire representation failed
    #[error("{scalar} cannot represent value: {message}")]
    Serialize { scalar: String, message: String },

    /// Wire representation → native value failed
    #[error("{scalar} cannot parse input: {message}")]
    Parse { scalar: String, message: String },
}

impl ScalarError {
    pub fn serialize(scalar: &str, message: impl Into<String>) -> Self {
        ScalarError::Serialize {
            scalar: scalar.to_string(),
            message: message.into(),
        }
    }

    pub fn parse(scalar: &str, message: impl Into<String>) -> Self {
        ScalarError::Parse {
            scalar: scalar.to_string(),
            message: message.into(),
        }
    }
}

// =============================================================================
// Records, Reload and Configuration
// =============================================================================

/// The record source could not produce a record set
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Record source must contain a JSON array of records")]
    NotAnArray,
}

/// A reload was rejected; the previously published schema is still active
#[derive(Debug, thiserror::Error)]
pub enum ReloadError {
    #[error("Reload failed while loading records: {0}")]
    Load(#[from] LoadError),

    #[error("Reload failed while building schema: {0}")]
    Schema(#[from] SchemaError),

    #[error("Schema reload is not configured for this server")]
    NotConfigured,
}

impl ReloadError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ReloadError::Load(_) => StatusCode::SERVICE_UNAVAILABLE,
            ReloadError::Schema(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ReloadError::NotConfigured => StatusCode::NOT_FOUND,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ReloadError::Load(_) => "RELOAD_LOAD_FAILED",
            ReloadError::Schema(e) => e.error_code(),
            ReloadError::NotConfigured => "RELOAD_NOT_CONFIGURED",
        }
    }
}

/// Invalid configuration value
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid configuration for '{field}': {message}")]
pub struct ConfigError {
    pub field: String,
    pub message: String,
}

impl ConfigError {
    pub fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syntax_error_reports_line_and_column() {
        let err = SyntaxError::at("{\n  hello(", 10, "Expected Name, found <EOF>");
        assert_eq!(err.line, 2);
        assert_eq!(err.column, 9);
        assert_eq!(
            err.to_string(),
            "Syntax Error (2:9): Expected Name, found <EOF>"
        );
    }

    #[test]
    fn test_reload_schema_error_maps_to_422() {
        let err = HotqlError::Reload(ReloadError::Schema(SchemaError::MalformedRecord {
            index: 3,
        }));
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.error_code(), "SCHEMA_MALFORMED_RECORD");
        assert!(err.to_string().contains("Record #3"));
    }

    #[test]
    fn test_reload_not_configured_maps_to_404() {
        let err = HotqlError::from(ReloadError::NotConfigured);
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_response().code, "RELOAD_NOT_CONFIGURED");
    }

    #[test]
    fn test_resolver_error_from_anyhow() {
        let err: ResolverError = anyhow::anyhow!("database unavailable").into();
        assert_eq!(err.message, "database unavailable");
    }

    #[test]
    fn test_scalar_error_messages() {
        let err = ScalarError::parse("Int", "expected an integer");
        assert_eq!(err.to_string(), "Int cannot parse input: expected an integer");
    }
}
