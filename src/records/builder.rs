//! Derive a schema from a set of JSON records

use crate::core::context::ExecutionContext;
use crate::core::error::{ResolverError, SchemaError};
use crate::core::field::FieldValue;
use crate::core::resolver::{Arguments, Resolver};
use crate::core::scalar::{BOOLEAN, FLOAT, INT, STRING};
use crate::core::schema::{ArgumentDefinition, FieldDefinition, FieldType, ObjectType, Schema, SchemaBuilder};
use async_trait::async_trait;
use indexmap::IndexMap;
use serde_json::Value;
use std::sync::Arc;

/// Builds a queryable schema whose object type mirrors the records' keys
///
/// For records `[{"id": "1", "name": "Dan"}]` the default settings produce:
///
/// ```text
/// type Query {
///   user(id: String, name: String): User
///   users(id: String, name: String): [User!]
/// }
///
/// type User {
///   id: String
///   name: String
/// }
/// ```
#[derive(Debug, Clone)]
pub struct RecordSchemaBuilder {
    type_name: String,
    single_field: String,
    list_field: Option<String>,
    infer_scalars: bool,
}

impl Default for RecordSchemaBuilder {
    fn default() -> Self {
        Self {
            type_name: "User".to_string(),
            single_field: "user".to_string(),
            list_field: Some("users".to_string()),
            infer_scalars: false,
        }
    }
}

impl RecordSchemaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn type_name(mut self, name: impl Into<String>) -> Self {
        self.type_name = name.into();
        self
    }

    /// Name of the generated object type
    pub fn object_type_name(&self) -> &str {
        &self.type_name
    }

    pub fn single_field(mut self, name: impl Into<String>) -> Self {
        self.single_field = name.into();
        self
    }

    /// Root field returning every matching record; `None` leaves it out
    pub fn list_field(mut self, name: Option<String>) -> Self {
        self.list_field = name;
        self
    }

    /// Type fields as Int, Float or Boolean when every observed value agrees
    ///
    /// Off by default, in which case every field is a String.
    pub fn infer_scalars(mut self, infer: bool) -> Self {
        self.infer_scalars = infer;
        self
    }

    pub fn build(&self, records: &[Value]) -> Result<Schema, SchemaError> {
        let mut rows = Vec::with_capacity(records.len());
        let mut observed: IndexMap<&str, Vec<&Value>> = IndexMap::new();
        for (index, record) in records.iter().enumerate() {
            let Value::Object(map) = record else {
                return Err(SchemaError::MalformedRecord { index });
            };
            for (key, value) in map {
                observed.entry(key.as_str()).or_default().push(value);
            }
            rows.push(FieldValue::from(record));
        }

        let field_types: IndexMap<String, &'static str> = observed
            .iter()
            .map(|(key, values)| {
                let scalar = if self.infer_scalars {
                    infer_scalar(values)
                } else {
                    STRING
                };
                (key.to_string(), scalar)
            })
            .collect();

        let mut object = ObjectType::new(&self.type_name);
        for (key, scalar) in &field_types {
            object = object.field(FieldDefinition::new(key, FieldType::named(*scalar)));
        }

        let lookup = RecordLookup {
            records: Arc::new(rows),
            field_types: Arc::new(field_types),
        };
        let mut query = ObjectType::new("Query").field(lookup.field(
            &self.single_field,
            FieldType::named(&self.type_name),
            LookupMode::First,
        ));
        if let Some(list_field) = &self.list_field {
            query = query.field(lookup.field(
                list_field,
                FieldType::list(FieldType::non_null(FieldType::named(&self.type_name))),
                LookupMode::All,
            ));
        }

        SchemaBuilder::new()
            .query(query)
            .register_type(object)
            .build()
    }
}

/// Narrowest scalar that represents every non-null value
fn infer_scalar(values: &[&Value]) -> &'static str {
    let present: Vec<&Value> = values.iter().copied().filter(|v| !v.is_null()).collect();
    if present.is_empty() {
        return STRING;
    }
    if present.iter().all(|v| v.is_boolean()) {
        BOOLEAN
    } else if present
        .iter()
        .all(|v| v.as_i64().is_some_and(|i| i32::try_from(i).is_ok()))
    {
        INT
    } else if present.iter().all(|v| v.is_number()) {
        FLOAT
    } else {
        STRING
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LookupMode {
    First,
    All,
}

/// Filters the record set by the supplied arguments
#[derive(Clone)]
struct RecordLookup {
    records: Arc<Vec<FieldValue>>,
    /// Record key to scalar name
    field_types: Arc<IndexMap<String, &'static str>>,
}

struct BoundLookup {
    lookup: RecordLookup,
    mode: LookupMode,
}

impl RecordLookup {
    fn field(&self, name: &str, ty: FieldType, mode: LookupMode) -> FieldDefinition {
        let mut field = FieldDefinition::new(name, ty).resolver(Arc::new(BoundLookup {
            lookup: self.clone(),
            mode,
        }));
        for (key, scalar) in self.field_types.iter() {
            field = field.argument(ArgumentDefinition::new(key, FieldType::named(*scalar)));
        }
        field
    }

    /// Every supplied argument equals the record's value for that key
    ///
    /// Values are compared in their serialized form so "5" matches a record
    /// holding the number 5 on a String field. A null argument matches a
    /// missing or null value.
    fn matches(&self, record: &FieldValue, args: &Arguments, ctx: &ExecutionContext) -> bool {
        args.iter().all(|(key, wanted)| {
            let actual = record
                .as_object()
                .and_then(|object| object.get(key))
                .filter(|value| !value.is_null());
            let Some(actual) = actual else {
                return wanted.is_null();
            };
            if wanted.is_null() {
                return false;
            }
            let scalar = self
                .field_types
                .get(key)
                .and_then(|name| ctx.schema().scalar(name));
            match scalar {
                Some(scalar) => match (scalar.serialize(wanted), scalar.serialize(actual)) {
                    (Ok(wanted), Ok(actual)) => wanted == actual,
                    _ => false,
                },
                None => wanted == actual,
            }
        })
    }
}

#[async_trait]
impl Resolver for BoundLookup {
    async fn resolve(
        &self,
        _parent: &FieldValue,
        args: &Arguments,
        ctx: &ExecutionContext,
    ) -> Result<FieldValue, ResolverError> {
        let mut matching = self
            .lookup
            .records
            .iter()
            .filter(|record| self.lookup.matches(record, args, ctx));
        Ok(match self.mode {
            LookupMode::First => matching.next().cloned().unwrap_or_default(),
            LookupMode::All => FieldValue::List(matching.cloned().collect()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::context::ContextData;
    use crate::executor::run;
    use crate::core::schema::NamedType;
    use serde_json::json;

    fn dan_and_lee() -> Vec<Value> {
        vec![
            json!({"id": "1", "name": "Dan", "surname": "Jones"}),
            json!({"id": "2", "name": "Lee", "surname": "Brown"}),
            json!({"id": "3", "name": "Nick", "surname": "Doe"}),
        ]
    }

    async fn query(records: &[Value], text: &str) -> Value {
        let schema = Arc::new(RecordSchemaBuilder::new().build(records).unwrap());
        run(text, schema, ContextData::new()).await.to_json()
    }

    #[test]
    fn test_fields_follow_first_seen_key_order() {
        let records = vec![json!({"id": "1", "name": "Dan"}), json!({"id": "2", "email": "x@y"})];
        let schema = RecordSchemaBuilder::new().build(&records).unwrap();
        let user = schema.object_type("User").unwrap();
        assert_eq!(user.field_names().collect::<Vec<_>>(), vec!["id", "name", "email"]);
        let lookup = schema.query_type().get_field("user").unwrap();
        assert_eq!(
            lookup.arguments().map(|a| a.name.as_str()).collect::<Vec<_>>(),
            vec!["id", "name", "email"]
        );
        assert!(user.fields().all(|f| f.ty == FieldType::named("String")));
    }

    #[test]
    fn test_malformed_record_is_rejected() {
        let records = vec![json!({"id": "1"}), json!("not a record")];
        let err = RecordSchemaBuilder::new().build(&records).unwrap_err();
        assert!(matches!(err, SchemaError::MalformedRecord { index: 1 }));
    }

    #[test]
    fn test_empty_record_set_is_rejected() {
        let err = RecordSchemaBuilder::new().build(&[]).unwrap_err();
        assert!(matches!(err, SchemaError::EmptyObject { .. }));
    }

    #[test]
    fn test_invalid_key_is_rejected() {
        let err = RecordSchemaBuilder::new()
            .build(&[json!({"first name": "Dan"})])
            .unwrap_err();
        assert!(matches!(err, SchemaError::InvalidName { .. }));
    }

    #[test]
    fn test_custom_names() {
        let schema = RecordSchemaBuilder::new()
            .type_name("Person")
            .single_field("person")
            .list_field(None)
            .build(&dan_and_lee())
            .unwrap();
        assert!(schema.query_type().get_field("person").is_some());
        assert!(schema.query_type().get_field("users").is_none());
        assert!(matches!(schema.named_type("Person"), Some(NamedType::Object(_))));
    }

    #[test]
    fn test_scalar_inference() {
        let records = vec![
            json!({"id": 1, "score": 1.5, "active": true, "nick": null, "mixed": 1}),
            json!({"id": 2, "score": 2, "active": false, "mixed": "two"}),
        ];
        let schema = RecordSchemaBuilder::new().infer_scalars(true).build(&records).unwrap();
        let user = schema.object_type("User").unwrap();
        let type_of = |name: &str| user.get_field(name).unwrap().ty.to_string();
        assert_eq!(type_of("id"), "Int");
        assert_eq!(type_of("score"), "Float");
        assert_eq!(type_of("active"), "Boolean");
        assert_eq!(type_of("nick"), "String");
        assert_eq!(type_of("mixed"), "String");
    }

    #[tokio::test]
    async fn test_lookup_by_id() {
        let records = vec![json!({"id": "1", "name": "Dan"})];
        assert_eq!(
            query(&records, r#"{ user(id: "1") { name } }"#).await,
            json!({"data": {"user": {"name": "Dan"}}})
        );
        assert_eq!(
            query(&records, r#"{ user(id: "2") { name } }"#).await,
            json!({"data": {"user": null}})
        );
    }

    #[tokio::test]
    async fn test_every_argument_must_match() {
        let records = dan_and_lee();
        assert_eq!(
            query(&records, r#"{ user(name: "Lee", surname: "Brown") { id } }"#).await,
            json!({"data": {"user": {"id": "2"}}})
        );
        assert_eq!(
            query(&records, r#"{ user(name: "Lee", surname: "Jones") { id } }"#).await,
            json!({"data": {"user": null}})
        );
    }

    #[tokio::test]
    async fn test_no_arguments_returns_first_record() {
        assert_eq!(
            query(&dan_and_lee(), "{ user { name } }").await,
            json!({"data": {"user": {"name": "Dan"}}})
        );
    }

    #[tokio::test]
    async fn test_list_field_filters_all_records() {
        let records = vec![
            json!({"id": "1", "team": "red"}),
            json!({"id": "2", "team": "blue"}),
            json!({"id": "3", "team": "red"}),
        ];
        assert_eq!(
            query(&records, r#"{ users(team: "red") { id } }"#).await,
            json!({"data": {"users": [{"id": "1"}, {"id": "3"}]}})
        );
    }

    #[tokio::test]
    async fn test_numbers_match_string_arguments() {
        let records = vec![json!({"id": 7, "name": "Dan"})];
        assert_eq!(
            query(&records, r#"{ user(id: "7") { id name } }"#).await,
            json!({"data": {"user": {"id": "7", "name": "Dan"}}})
        );
    }

    #[tokio::test]
    async fn test_inferred_int_argument() {
        let records = vec![json!({"id": 1, "name": "Dan"}), json!({"id": 2, "name": "Lee"})];
        let schema = Arc::new(RecordSchemaBuilder::new().infer_scalars(true).build(&records).unwrap());
        let value = run("{ user(id: 2) { id name } }", schema, ContextData::new())
            .await
            .to_json();
        assert_eq!(value, json!({"data": {"user": {"id": 2, "name": "Lee"}}}));
    }
}
