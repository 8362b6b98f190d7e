//! End-to-end behaviour of the engine through the public API
//!
//! These tests verify that:
//! - Queries resolve through parser, validator and executor
//! - Failures surface as the documented response shapes
//! - Non-null violations propagate to the nearest nullable ancestor
//! - Record-derived schemas answer lookups and survive failed reloads

use hotql::prelude::*;

fn hello_schema() -> Arc<Schema> {
    let query = ObjectType::new("Query").field(
        FieldDefinition::new("hello", FieldType::named("String"))
            .resolver(resolver_fn(|_, _, _| Ok(FieldValue::string("world")))),
    );
    Arc::new(Schema::builder().query(query).build().unwrap())
}

async fn record_controller(records: Vec<Value>) -> (ReloadController, Arc<StaticRecords>) {
    let source = Arc::new(StaticRecords::new(records));
    let controller = ReloadController::initialize(source.clone(), RecordSchemaBuilder::new())
        .await
        .unwrap();
    (controller, source)
}

async fn run(registry: &SchemaRegistry, query: &str) -> Value {
    registry.executor().run(query, ContextData::new()).await.to_json()
}

// =============================================================================
// Documented Scenarios
// =============================================================================

mod scenario_tests {
    use super::*;

    #[tokio::test]
    async fn test_hello_world() {
        let response = hotql::executor::run("{ hello }", hello_schema(), ContextData::new()).await;
        assert!(response.is_ok());
        assert_eq!(
            serde_json::to_string(&response).unwrap(),
            r#"{"data":{"hello":"world"}}"#
        );
    }

    #[tokio::test]
    async fn test_record_lookup() {
        let (controller, _) = record_controller(vec![json!({"id": "1", "name": "Dan"})]).await;
        let registry = controller.registry();

        let found = run(registry, r#"{ user(id: "1") { name } }"#).await;
        assert_eq!(found, json!({"data": {"user": {"name": "Dan"}}}));

        let missing = run(registry, r#"{ user(id: "2") { name } }"#).await;
        assert_eq!(missing, json!({"data": {"user": null}}));
    }

    #[tokio::test]
    async fn test_truncated_query_is_a_syntax_error() {
        let response = hotql::executor::run("{ hello(", hello_schema(), ContextData::new()).await;
        let body = response.to_json();

        assert!(body.get("data").is_none());
        let errors = body["errors"].as_array().unwrap();
        assert!(!errors.is_empty());
        assert_eq!(errors[0]["extensions"]["code"], "GRAPHQL_PARSE_FAILED");
    }

    #[tokio::test]
    async fn test_deeply_nested_query_is_a_syntax_error() {
        let query = format!("{}{}", "{ hello ".repeat(10_000), "}".repeat(10_000));
        let response = hotql::executor::run(&query, hello_schema(), ContextData::new()).await;
        let body = response.to_json();

        assert!(body.get("data").is_none());
        assert_eq!(body["errors"][0]["extensions"]["code"], "GRAPHQL_PARSE_FAILED");
    }

    #[tokio::test]
    async fn test_conflict_in_merged_selections_is_a_validation_error() {
        let (controller, _) = record_controller(vec![json!({"id": "1", "name": "Dan"})]).await;
        let body = run(
            controller.registry(),
            r#"{ user(id: "1") { a: name } user(id: "1") { a: id } }"#,
        )
        .await;

        assert!(body.get("data").is_none());
        assert_eq!(body["errors"][0]["path"], json!(["user", "a"]));
    }

    #[tokio::test]
    async fn test_unknown_field_is_a_validation_error() {
        let response = hotql::executor::run("{ bogus }", hello_schema(), ContextData::new()).await;
        let body = response.to_json();

        assert!(body.get("data").is_none());
        let errors = body["errors"].as_array().unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0]["path"], json!(["bogus"]));
        assert_eq!(errors[0]["extensions"]["code"], "UNKNOWN_FIELD");
    }

    #[tokio::test]
    async fn test_malformed_reload_keeps_previous_schema() {
        let (controller, source) = record_controller(vec![json!({"id": "1", "name": "Dan"})]).await;

        source.replace(vec![json!({"id": "2"}), json!(["not", "a", "mapping"])]);
        let err = controller.reload().await.unwrap_err();
        assert!(matches!(
            err,
            ReloadError::Schema(SchemaError::MalformedRecord { index: 1 })
        ));

        let body = run(controller.registry(), r#"{ user(id: "1") { name } }"#).await;
        assert_eq!(body, json!({"data": {"user": {"name": "Dan"}}}));
        assert_eq!(controller.registry().generation(), 1);
    }
}

// =============================================================================
// Null Propagation
// =============================================================================

mod propagation_tests {
    use super::*;

    /// Query { viewer: Viewer, status: String }
    /// Viewer { id: String!, name: String, tags: [String!] }
    fn viewer_schema(id: FieldValue) -> Arc<Schema> {
        let viewer = ObjectType::new("Viewer")
            .field(
                FieldDefinition::new("id", FieldType::non_null(FieldType::named("String")))
                    .resolver(resolver_fn(move |_, _, _| Ok(id.clone()))),
            )
            .field(FieldDefinition::new("name", FieldType::named("String")))
            .field(FieldDefinition::new(
                "tags",
                FieldType::list(FieldType::non_null(FieldType::named("String"))),
            ));
        let query = ObjectType::new("Query")
            .field(
                FieldDefinition::new("viewer", FieldType::named("Viewer")).resolver(resolver_fn(
                    |_, _, _| {
                        Ok(FieldValue::from(json!({
                            "name": "Dan",
                            "tags": ["a", null, "c"],
                        })))
                    },
                )),
            )
            .field(
                FieldDefinition::new("status", FieldType::named("String"))
                    .resolver(resolver_fn(|_, _, _| Ok(FieldValue::string("up")))),
            );
        Arc::new(
            Schema::builder()
                .query(query)
                .register_type(viewer)
                .build()
                .unwrap(),
        )
    }

    #[tokio::test]
    async fn test_null_non_null_field_nulls_parent() {
        let schema = viewer_schema(FieldValue::Null);
        let body = hotql::executor::run("{ viewer { id name } status }", schema, ContextData::new())
            .await
            .to_json();

        assert_eq!(body["data"], json!({"viewer": null, "status": "up"}));
        let errors = body["errors"].as_array().unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0]["path"], json!(["viewer", "id"]));
        assert_eq!(errors[0]["extensions"]["code"], "NON_NULL_VIOLATION");
    }

    #[tokio::test]
    async fn test_null_list_item_nulls_the_list() {
        let schema = viewer_schema(FieldValue::string("v1"));
        let body = hotql::executor::run("{ viewer { id tags } }", schema, ContextData::new())
            .await
            .to_json();

        assert_eq!(body["data"], json!({"viewer": {"id": "v1", "tags": null}}));
        let errors = body["errors"].as_array().unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0]["path"], json!(["viewer", "tags", 1]));
    }

    #[tokio::test]
    async fn test_nullable_fields_never_lose_sibling_data() {
        let schema = viewer_schema(FieldValue::string("v1"));
        let body = hotql::executor::run("{ viewer { name } status }", schema, ContextData::new())
            .await
            .to_json();

        assert_eq!(body, json!({"data": {"viewer": {"name": "Dan"}, "status": "up"}}));
    }
}

// =============================================================================
// Reload Semantics
// =============================================================================

mod reload_tests {
    use super::*;

    #[tokio::test]
    async fn test_reload_with_same_records_is_idempotent() {
        let records = vec![
            json!({"id": "1", "name": "Dan"}),
            json!({"id": "2", "name": "Lee"}),
        ];
        let (controller, _) = record_controller(records).await;
        let query = r#"{ users { id name } user(name: "Lee") { id } }"#;

        let before = run(controller.registry(), query).await;
        let before_sdl = controller.registry().current().to_sdl();

        let outcome = controller.reload().await.unwrap();
        assert_eq!(outcome.generation, 2);

        assert_eq!(run(controller.registry(), query).await, before);
        assert_eq!(controller.registry().current().to_sdl(), before_sdl);
    }

    #[tokio::test]
    async fn test_pinned_executor_keeps_its_schema() {
        let (controller, source) = record_controller(vec![json!({"id": "1"})]).await;
        let pinned = controller.registry().executor();

        source.replace(vec![json!({"id": "1", "email": "dan@example.com"})]);
        controller.reload().await.unwrap();

        let old = pinned
            .run(r#"{ user(id: "1") { email } }"#, ContextData::new())
            .await;
        assert!(old.data.is_none());

        let new = run(controller.registry(), r#"{ user(id: "1") { email } }"#).await;
        assert_eq!(new, json!({"data": {"user": {"email": "dan@example.com"}}}));
    }
}
