//! Query validation against a schema
//!
//! The validator walks the whole request tree and reports every problem it
//! finds, unlike the parser which stops at the first syntax error. Fields that
//! do not exist are reported once and not descended into.

use crate::core::error::{ValidationError, ValidationErrorKind};
use crate::core::schema::{NamedType, ObjectType, Schema, TYPENAME_FIELD};
use crate::executor::utils::{coerce_literal, collect_fields};
use crate::query::ast::{Operation, RequestNode};

/// An operation that passed validation and is safe to execute
///
/// Only [`validate`] constructs this type.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedQuery {
    operation: Operation,
}

impl ValidatedQuery {
    pub fn operation(&self) -> &Operation {
        &self.operation
    }

    pub fn into_operation(self) -> Operation {
        self.operation
    }
}

/// Check an operation against a schema, collecting all errors
pub fn validate(operation: Operation, schema: &Schema) -> Result<ValidatedQuery, Vec<ValidationError>> {
    let mut validator = Validator {
        schema,
        errors: Vec::new(),
        path: Vec::new(),
    };
    validator.visit_selections(schema.query_type(), &operation.root.children);

    if validator.errors.is_empty() {
        Ok(ValidatedQuery { operation })
    } else {
        Err(validator.errors)
    }
}

struct Validator<'a> {
    schema: &'a Schema,
    errors: Vec<ValidationError>,
    path: Vec<String>,
}

impl<'a> Validator<'a> {
    /// Selections sharing a response key are validated as one field whose
    /// children are the union of theirs, matching how they execute
    fn visit_selections<'n>(
        &mut self,
        parent: &'a ObjectType,
        nodes: impl IntoIterator<Item = &'n RequestNode>,
    ) {
        for (key, group) in collect_fields(nodes) {
            self.path.push(key.to_string());
            if self.check_conflicts(key, &group) {
                self.visit_field(parent, &group);
            } else {
                for node in &group {
                    self.visit_field(parent, std::slice::from_ref(node));
                }
            }
            self.path.pop();
        }
    }

    fn visit_field(&mut self, parent: &'a ObjectType, group: &[&RequestNode]) {
        let Some(node) = group.first().copied() else {
            return;
        };
        if node.name == TYPENAME_FIELD {
            for argument in node.arguments.keys() {
                self.report(
                    ValidationErrorKind::UnknownArgument,
                    format!("Unknown argument \"{}\" on field \"{}\".", argument, TYPENAME_FIELD),
                );
            }
            if group.iter().any(|n| !n.is_leaf()) {
                self.report(
                    ValidationErrorKind::UnexpectedSelection,
                    format!(
                        "Field \"{}\" must not have a selection since type \"String\" has no subfields.",
                        TYPENAME_FIELD
                    ),
                );
            }
            return;
        }

        let Some(field) = parent.get_field(&node.name) else {
            self.report(
                ValidationErrorKind::UnknownField,
                format!(
                    "Cannot query field \"{}\" on type \"{}\".",
                    node.name, parent.name
                ),
            );
            return;
        };

        for (name, literal) in &node.arguments {
            let Some(definition) = field.get_argument(name) else {
                self.report(
                    ValidationErrorKind::UnknownArgument,
                    format!(
                        "Unknown argument \"{}\" on field \"{}.{}\".",
                        name, parent.name, field.name
                    ),
                );
                continue;
            };
            if literal.is_null() {
                if definition.ty.is_non_null() {
                    self.report(
                        ValidationErrorKind::ArgumentTypeMismatch,
                        format!(
                            "Argument \"{}\" of non-null type \"{}\" must not be null.",
                            name, definition.ty
                        ),
                    );
                }
                continue;
            }
            if let Err(e) = coerce_literal(self.schema, &definition.ty, literal) {
                self.report(
                    ValidationErrorKind::ArgumentTypeMismatch,
                    format!(
                        "Argument \"{}\" has invalid value {}: {}",
                        name,
                        literal.to_json(),
                        e
                    ),
                );
            }
        }

        for definition in field.arguments() {
            if definition.is_required() && !node.arguments.contains_key(&definition.name) {
                self.report(
                    ValidationErrorKind::MissingRequiredArgument,
                    format!(
                        "Field \"{}\" argument \"{}\" of type \"{}\" is required but not provided.",
                        field.name, definition.name, definition.ty
                    ),
                );
            }
        }

        match self.schema.named_type(field.ty.base_name()) {
            Some(NamedType::Object(object)) => {
                if group.iter().any(|n| n.is_leaf()) {
                    self.report(
                        ValidationErrorKind::MissingSelection,
                        format!(
                            "Field \"{}\" of type \"{}\" must have a selection of subfields.",
                            field.name, field.ty
                        ),
                    );
                } else {
                    self.visit_selections(object, group.iter().copied().flat_map(|n| n.children.iter()));
                }
            }
            Some(NamedType::Scalar(scalar)) => {
                if group.iter().any(|n| !n.is_leaf()) {
                    self.report(
                        ValidationErrorKind::UnexpectedSelection,
                        format!(
                            "Field \"{}\" must not have a selection since type \"{}\" has no subfields.",
                            field.name,
                            scalar.name()
                        ),
                    );
                }
            }
            // Schema construction guarantees every reference resolves
            None => {}
        }
    }

    /// Selections sharing a response key must ask for the same field with the
    /// same arguments; returns whether the group is consistent
    fn check_conflicts(&mut self, key: &str, group: &[&RequestNode]) -> bool {
        let Some((first, rest)) = group.split_first() else {
            return true;
        };
        let mut consistent = true;
        for node in rest {
            let message = if first.name != node.name {
                format!(
                    "Fields \"{}\" conflict because \"{}\" and \"{}\" are different fields.",
                    key, first.name, node.name
                )
            } else if first.arguments != node.arguments {
                format!(
                    "Fields \"{}\" conflict because they have differing arguments.",
                    key
                )
            } else {
                continue;
            };
            self.report(ValidationErrorKind::FieldConflict, message);
            consistent = false;
        }
        consistent
    }

    fn report(&mut self, kind: ValidationErrorKind, message: String) {
        self.errors
            .push(ValidationError::new(kind, self.path.clone(), message));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::schema::{ArgumentDefinition, FieldDefinition, FieldType, SchemaBuilder};
    use crate::query::parse_query;

    fn schema() -> Schema {
        let user = ObjectType::new("User")
            .field(FieldDefinition::new("id", FieldType::non_null(FieldType::named("ID"))))
            .field(FieldDefinition::new("name", FieldType::named("String")))
            .field(FieldDefinition::new("friends", FieldType::list(FieldType::named("User"))));
        let query = ObjectType::new("Query")
            .field(FieldDefinition::new("hello", FieldType::named("String")))
            .field(
                FieldDefinition::new("user", FieldType::named("User"))
                    .argument(ArgumentDefinition::new("id", FieldType::non_null(FieldType::named("ID")))),
            )
            .field(
                FieldDefinition::new("users", FieldType::list(FieldType::named("User")))
                    .argument(ArgumentDefinition::new("limit", FieldType::named("Int")))
                    .argument(
                        ArgumentDefinition::new("active", FieldType::non_null(FieldType::named("Boolean")))
                            .with_default(true.into()),
                    ),
            );
        SchemaBuilder::new()
            .query(query)
            .register_type(user)
            .build()
            .expect("test schema")
    }

    fn errors(query: &str) -> Vec<ValidationError> {
        let operation = parse_query(query).expect("query should parse");
        validate(operation, &schema()).expect_err("validation should fail")
    }

    #[test]
    fn test_valid_query_passes() {
        let operation = parse_query(r#"{ hello user(id: "1") { id name friends { name } } }"#).unwrap();
        let validated = validate(operation.clone(), &schema()).expect("should validate");
        assert_eq!(validated.operation(), &operation);
    }

    #[test]
    fn test_unknown_root_field() {
        let errors = errors("{ bogus }");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ValidationErrorKind::UnknownField);
        assert_eq!(errors[0].path, vec!["bogus".to_string()]);
        assert_eq!(errors[0].message, "Cannot query field \"bogus\" on type \"Query\".");
    }

    #[test]
    fn test_all_errors_are_collected() {
        let errors = errors(r#"{ bogus user(id: 1.5, extra: "x") { nope } }"#);
        let kinds: Vec<ValidationErrorKind> = errors.iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ValidationErrorKind::UnknownField,
                ValidationErrorKind::ArgumentTypeMismatch,
                ValidationErrorKind::UnknownArgument,
                ValidationErrorKind::UnknownField,
            ]
        );
        assert_eq!(errors[3].path, vec!["user".to_string(), "nope".to_string()]);
    }

    #[test]
    fn test_missing_required_argument() {
        let errors = errors("{ user { name } }");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ValidationErrorKind::MissingRequiredArgument);
        assert_eq!(
            errors[0].message,
            "Field \"user\" argument \"id\" of type \"ID!\" is required but not provided."
        );
    }

    #[test]
    fn test_null_for_non_null_argument() {
        let errors = errors("{ user(id: null) { name } }");
        assert_eq!(errors[0].kind, ValidationErrorKind::ArgumentTypeMismatch);
    }

    #[test]
    fn test_defaulted_non_null_argument_is_optional() {
        let operation = parse_query("{ users(limit: 2) { name } }").unwrap();
        assert!(validate(operation, &schema()).is_ok());
    }

    #[test]
    fn test_object_field_requires_selection() {
        let errors = errors(r#"{ user(id: "1") }"#);
        assert_eq!(errors[0].kind, ValidationErrorKind::MissingSelection);
        assert_eq!(errors[0].path, vec!["user".to_string()]);
    }

    #[test]
    fn test_scalar_field_rejects_selection() {
        let errors = errors("{ hello { length } }");
        assert_eq!(errors[0].kind, ValidationErrorKind::UnexpectedSelection);
    }

    #[test]
    fn test_alias_is_used_in_path() {
        let errors = errors(r#"{ me: user(id: "1") { missing } }"#);
        assert_eq!(errors[0].path, vec!["me".to_string(), "missing".to_string()]);
    }

    #[test]
    fn test_conflicting_response_keys() {
        let errors = errors(r#"{ a: hello a: user(id: "1") { id } }"#);
        assert_eq!(errors[0].kind, ValidationErrorKind::FieldConflict);
        assert_eq!(errors[0].path, vec!["a".to_string()]);
    }

    #[test]
    fn test_same_field_twice_is_not_a_conflict() {
        let operation = parse_query(r#"{ hello hello user(id: "1") { id } user(id: "1") { name } }"#).unwrap();
        assert!(validate(operation, &schema()).is_ok());
    }

    #[test]
    fn test_typename_is_accepted() {
        let operation = parse_query(r#"{ __typename user(id: "1") { __typename } }"#).unwrap();
        assert!(validate(operation, &schema()).is_ok());
    }

    #[test]
    fn test_conflict_inside_repeated_selections() {
        let errors = errors(r#"{ user(id: "1") { a: name } user(id: "1") { a: id } }"#);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ValidationErrorKind::FieldConflict);
        assert_eq!(errors[0].path, vec!["user".to_string(), "a".to_string()]);
    }

    #[test]
    fn test_repeated_selection_missing_subfields() {
        let errors = errors(r#"{ user(id: "1") { id } user(id: "1") }"#);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ValidationErrorKind::MissingSelection);
    }

    #[test]
    fn test_repeated_field_errors_are_reported_once() {
        let errors = errors(r#"{ user(id: "1") { missing } user(id: "1") { missing } }"#);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].path, vec!["user".to_string(), "missing".to_string()]);
    }
}
