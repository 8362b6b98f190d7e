//! Field resolution and value completion
//!
//! Fields are resolved depth-first in request order. A failure in a non-null
//! position is reported once, at the deepest path where it happened, and then
//! travels up as [`Propagated`] until a nullable position absorbs it by
//! becoming null.

use futures::future::{BoxFuture, FutureExt};
use indexmap::IndexMap;
use serde_json::{Value, json};

use super::response::{GraphQLError, PathSegment, ResultNode};
use super::utils;
use crate::core::context::ExecutionContext;
use crate::core::field::FieldValue;
use crate::core::schema::{FieldDefinition, FieldType, NamedType, ObjectType, TYPENAME_FIELD};
use crate::query::ast::RequestNode;

/// A null reached a non-null position; the error is already recorded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Propagated;

type Completion = Result<ResultNode, Propagated>;

/// Field being completed, for error messages
#[derive(Clone, Copy)]
struct FieldInfo<'a> {
    parent_type: &'a str,
    field: &'a FieldDefinition,
}

/// Resolve the selections of one object value
pub(crate) fn resolve_object_fields<'a>(
    ctx: &'a ExecutionContext,
    object: &'a ObjectType,
    parent: &'a FieldValue,
    selections: &'a [&'a RequestNode],
    path: &'a [PathSegment],
) -> BoxFuture<'a, Result<IndexMap<String, ResultNode>, Propagated>> {
    async move { resolve_object_fields_impl(ctx, object, parent, selections, path).await }.boxed()
}

async fn resolve_object_fields_impl(
    ctx: &ExecutionContext,
    object: &ObjectType,
    parent: &FieldValue,
    selections: &[&RequestNode],
    path: &[PathSegment],
) -> Result<IndexMap<String, ResultNode>, Propagated> {
    let mut result = IndexMap::new();
    for (key, nodes) in utils::collect_fields(selections.iter().copied()) {
        let field_path = child_path(path, PathSegment::Key(key.to_string()));
        let value = resolve_field(ctx, object, parent, &nodes, &field_path).await?;
        result.insert(key.to_string(), value);
    }
    Ok(result)
}

/// Resolve one response key, which may merge several selections of the same field
pub(crate) fn resolve_field<'a>(
    ctx: &'a ExecutionContext,
    object: &'a ObjectType,
    parent: &'a FieldValue,
    nodes: &'a [&'a RequestNode],
    path: &'a [PathSegment],
) -> BoxFuture<'a, Completion> {
    async move { resolve_field_impl(ctx, object, parent, nodes, path).await }.boxed()
}

async fn resolve_field_impl(
    ctx: &ExecutionContext,
    object: &ObjectType,
    parent: &FieldValue,
    nodes: &[&RequestNode],
    path: &[PathSegment],
) -> Completion {
    let Some(node) = nodes.first() else {
        return Ok(ResultNode::Null);
    };
    if node.name == TYPENAME_FIELD {
        return Ok(ResultNode::Scalar(json!(object.name)));
    }
    if ctx.is_cancelled() {
        return Ok(ResultNode::Null);
    }

    let Some(field) = object.get_field(&node.name) else {
        ctx.push_error(
            GraphQLError::new(format!(
                "Cannot query field \"{}\" on type \"{}\".",
                node.name, object.name
            ))
            .with_path(path.to_vec())
            .with_code("UNKNOWN_FIELD"),
        );
        return Ok(ResultNode::Null);
    };
    let info = FieldInfo {
        parent_type: &object.name,
        field,
    };

    let arguments = match utils::coerce_arguments(ctx.schema(), field, node) {
        Ok(arguments) => arguments,
        Err(e) => {
            ctx.push_error(
                GraphQLError::new(e.to_string())
                    .with_path(path.to_vec())
                    .with_code("INVALID_ARGUMENT"),
            );
            return absorb(&field.ty);
        }
    };

    let value = match field.bound_resolver().resolve(parent, &arguments, ctx).await {
        Ok(value) => value,
        Err(e) => {
            tracing::debug!(
                field = %format!("{}.{}", info.parent_type, field.name),
                error = %e,
                "resolver failed"
            );
            ctx.push_error(
                GraphQLError::new(e.message)
                    .with_path(path.to_vec())
                    .with_code("RESOLVER_ERROR"),
            );
            return absorb(&field.ty);
        }
    };

    let children: Vec<&RequestNode> = nodes.iter().flat_map(|n| n.children.iter()).collect();
    complete_value(ctx, info, &field.ty, value, &children, path).await
}

/// Null for a nullable field, propagation for a non-null one
fn absorb(ty: &FieldType) -> Completion {
    if ty.is_non_null() {
        Err(Propagated)
    } else {
        Ok(ResultNode::Null)
    }
}

/// Complete a value at a position of type `ty`
///
/// Nullable positions turn a propagated failure into null. Non-null
/// positions report a null value and pass failures further up.
fn complete_value<'a>(
    ctx: &'a ExecutionContext,
    info: FieldInfo<'a>,
    ty: &'a FieldType,
    value: FieldValue,
    children: &'a [&'a RequestNode],
    path: &'a [PathSegment],
) -> BoxFuture<'a, Completion> {
    async move {
        match ty {
            FieldType::NonNull(inner) => {
                let completed = complete_inner(ctx, info, inner, value, children, path).await?;
                if completed.is_null() {
                    ctx.push_error(
                        GraphQLError::new(format!(
                            "Cannot return null for non-nullable field {}.{}.",
                            info.parent_type, info.field.name
                        ))
                        .with_path(path.to_vec())
                        .with_code("NON_NULL_VIOLATION"),
                    );
                    return Err(Propagated);
                }
                Ok(completed)
            }
            _ => Ok(complete_inner(ctx, info, ty, value, children, path)
                .await
                .unwrap_or(ResultNode::Null)),
        }
    }
    .boxed()
}

/// Complete a non-null value, propagating any failure unchanged
async fn complete_inner(
    ctx: &ExecutionContext,
    info: FieldInfo<'_>,
    ty: &FieldType,
    value: FieldValue,
    children: &[&RequestNode],
    path: &[PathSegment],
) -> Completion {
    if value.is_null() {
        return Ok(ResultNode::Null);
    }

    match ty {
        FieldType::NonNull(_) => complete_value(ctx, info, ty, value, children, path).await,
        FieldType::List(item_type) => {
            let Some(items) = value.as_list() else {
                ctx.push_error(
                    GraphQLError::new(format!(
                        "Expected a list for field {}.{}, got {}",
                        info.parent_type,
                        info.field.name,
                        value.kind()
                    ))
                    .with_path(path.to_vec())
                    .with_code("INVALID_VALUE"),
                );
                return Err(Propagated);
            };
            let mut completed = Vec::with_capacity(items.len());
            for (index, item) in items.iter().enumerate() {
                let item_path = child_path(path, PathSegment::Index(index));
                completed.push(
                    complete_value(ctx, info, item_type, item.clone(), children, &item_path)
                        .await?,
                );
            }
            Ok(ResultNode::List(completed))
        }
        FieldType::Named(name) => match ctx.schema().named_type(name) {
            Some(NamedType::Scalar(scalar)) => match scalar.serialize(&value) {
                Ok(Value::Null) => Ok(ResultNode::Null),
                Ok(wire) => Ok(ResultNode::Scalar(wire)),
                Err(e) => {
                    ctx.push_error(
                        GraphQLError::new(e.to_string())
                            .with_path(path.to_vec())
                            .with_code("SERIALIZATION_ERROR"),
                    );
                    Err(Propagated)
                }
            },
            Some(NamedType::Object(object)) => {
                let fields = resolve_object_fields(ctx, object, &value, children, path).await?;
                Ok(ResultNode::Object(fields))
            }
            None => {
                ctx.push_error(
                    GraphQLError::new(format!("Unknown type \"{}\"", name))
                        .with_path(path.to_vec())
                        .with_code("INTERNAL_ERROR"),
                );
                Err(Propagated)
            }
        },
    }
}

fn child_path(path: &[PathSegment], segment: PathSegment) -> Vec<PathSegment> {
    let mut child = Vec::with_capacity(path.len() + 1);
    child.extend_from_slice(path);
    child.push(segment);
    child
}
