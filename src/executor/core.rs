//! Core executor orchestration

use indexmap::IndexMap;
use std::sync::Arc;

use super::field_resolver;
use super::response::{GraphQLError, PathSegment, Response, ResultNode};
use super::utils;
use crate::core::context::{ContextData, ExecutionContext};
use crate::core::field::FieldValue;
use crate::core::schema::Schema;
use crate::query::parse_query;
use crate::validation::{ValidatedQuery, validate};

/// Runs queries against one schema snapshot
///
/// The snapshot is fixed for the executor's lifetime, so a schema reload never
/// affects a request that already started.
#[derive(Debug, Clone)]
pub struct Executor {
    schema: Arc<Schema>,
    root_value: FieldValue,
}

impl Executor {
    pub fn new(schema: Arc<Schema>) -> Self {
        Self {
            schema,
            root_value: FieldValue::Null,
        }
    }

    /// Value passed as `parent` to root field resolvers (null by default)
    pub fn with_root_value(mut self, root_value: FieldValue) -> Self {
        self.root_value = root_value;
        self
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Parse, validate and execute query text
    ///
    /// Syntax and validation failures produce a response without `data`.
    pub async fn run(&self, query: &str, data: ContextData) -> Response {
        self.run_operation(query, None, data).await
    }

    /// Like [`run`](Self::run), additionally checking the operation name a client asked for
    pub async fn run_operation(
        &self,
        query: &str,
        operation_name: Option<&str>,
        data: ContextData,
    ) -> Response {
        let operation = match parse_query(query) {
            Ok(operation) => operation,
            Err(e) => {
                tracing::debug!(error = %e, "query rejected by parser");
                return Response::from_errors(vec![GraphQLError::from(&e)]);
            }
        };

        if let Some(name) = operation_name
            && operation.name.as_deref() != Some(name)
        {
            return Response::from_errors(vec![
                GraphQLError::new(format!("Unknown operation named \"{}\".", name))
                    .with_code("OPERATION_NOT_FOUND"),
            ]);
        }

        let validated = match validate(operation, &self.schema) {
            Ok(validated) => validated,
            Err(errors) => {
                tracing::debug!(count = errors.len(), "query rejected by validation");
                return Response::from_errors(errors.iter().map(GraphQLError::from).collect());
            }
        };

        self.execute(&validated, data).await
    }

    /// Execute an already validated query
    pub async fn execute(&self, query: &ValidatedQuery, data: ContextData) -> Response {
        let ctx = ExecutionContext::new(self.schema.clone(), data);
        if ctx.is_cancelled() {
            return cancelled();
        }

        let root = self.schema.query_type();
        let mut result = IndexMap::new();
        for (key, nodes) in utils::collect_fields(query.operation().selections()) {
            let path = vec![PathSegment::Key(key.to_string())];
            // Root fields are independent: a failure nulls only its own entry
            let value = field_resolver::resolve_field(&ctx, root, &self.root_value, &nodes, &path)
                .await
                .unwrap_or(ResultNode::Null);
            result.insert(key.to_string(), value);
        }

        if ctx.is_cancelled() {
            tracing::debug!("execution cancelled, discarding partial result");
            return cancelled();
        }

        let errors = ctx.take_errors();
        if !errors.is_empty() {
            tracing::debug!(count = errors.len(), "execution finished with field errors");
        }
        Response::from_data(ResultNode::Object(result), errors)
    }
}

/// Execute a validated query against a schema snapshot
pub async fn execute(query: &ValidatedQuery, schema: Arc<Schema>, data: ContextData) -> Response {
    Executor::new(schema).execute(query, data).await
}

/// Parse, validate and execute query text against a schema snapshot
pub async fn run(query: &str, schema: Arc<Schema>, data: ContextData) -> Response {
    Executor::new(schema).run(query, data).await
}

fn cancelled() -> Response {
    Response::from_data(
        ResultNode::Null,
        vec![GraphQLError::new("Execution cancelled").with_code("CANCELLED")],
    )
}
