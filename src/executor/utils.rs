//! Utility functions for execution

use crate::core::error::ScalarError;
use crate::core::resolver::Arguments;
use crate::core::schema::{FieldDefinition, FieldType, Schema};
use crate::core::FieldValue;
use crate::query::ast::{Literal, RequestNode};
use indexmap::IndexMap;

/// Convert an argument literal to its native value through the declared input type
///
/// A single value supplied for a list type is wrapped in a one-element list.
pub(crate) fn coerce_literal(
    schema: &Schema,
    ty: &FieldType,
    literal: &Literal,
) -> Result<FieldValue, ScalarError> {
    match ty {
        FieldType::NonNull(inner) => coerce_literal(schema, inner, literal),
        FieldType::List(inner) => Ok(FieldValue::List(vec![coerce_literal(
            schema, inner, literal,
        )?])),
        FieldType::Named(name) => {
            let scalar = schema
                .scalar(name)
                .ok_or_else(|| ScalarError::parse(name, "not an input type"))?;
            scalar.parse_input(&literal.to_json())
        }
    }
}

/// Build the arguments handed to a resolver
///
/// Declared defaults fill omitted arguments; undeclared arguments never reach
/// here because validation rejects them.
pub(crate) fn coerce_arguments(
    schema: &Schema,
    field: &FieldDefinition,
    node: &RequestNode,
) -> Result<Arguments, ScalarError> {
    let mut arguments = Arguments::new();
    for definition in field.arguments() {
        match node.arguments.get(&definition.name) {
            Some(Literal::Null) => arguments.insert(definition.name.clone(), FieldValue::Null),
            Some(literal) => arguments.insert(
                definition.name.clone(),
                coerce_literal(schema, &definition.ty, literal)?,
            ),
            None => {
                if let Some(default) = &definition.default {
                    arguments.insert(definition.name.clone(), default.clone());
                }
            }
        }
    }
    Ok(arguments)
}

/// Group selections by response key, keeping first-appearance order
///
/// Selections that share a key are executed once with their children merged.
pub(crate) fn collect_fields<'a>(
    nodes: impl IntoIterator<Item = &'a RequestNode>,
) -> IndexMap<&'a str, Vec<&'a RequestNode>> {
    let mut grouped: IndexMap<&'a str, Vec<&'a RequestNode>> = IndexMap::new();
    for node in nodes {
        grouped.entry(node.response_key()).or_default().push(node);
    }
    grouped
}
