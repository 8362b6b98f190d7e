//! HTTP server with a schema written in code
//!
//! Records are read once from `demos/data.json`; the `user(id:)` lookup is a
//! hand-written resolver. Try:
//!
//! ```text
//! curl 'http://127.0.0.1:8080/graphql?query=%7Buser(id:%221%22)%7Bname%7D%7D'
//! ```

use hotql::prelude::*;

fn user_type() -> ObjectType {
    ObjectType::new("User")
        .description("A person from data.json")
        .field(FieldDefinition::new("id", FieldType::non_null(FieldType::named("ID"))))
        .field(FieldDefinition::new("name", FieldType::named("String")))
        .field(FieldDefinition::new("email", FieldType::named("String")))
}

fn query_type(users: Arc<Vec<FieldValue>>) -> ObjectType {
    ObjectType::new("Query").field(
        FieldDefinition::new("user", FieldType::named("User"))
            .argument(ArgumentDefinition::new(
                "id",
                FieldType::non_null(FieldType::named("ID")),
            ))
            .resolver(resolver_fn(move |_, args, _| {
                let id = args.get_str("id").unwrap_or_default();
                Ok(users
                    .iter()
                    .find(|user| {
                        user.as_object()
                            .and_then(|fields| fields.get("id"))
                            .and_then(FieldValue::as_string)
                            == Some(id)
                    })
                    .cloned()
                    .unwrap_or(FieldValue::Null))
            })),
    )
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/demos/data.json");
    let records: Vec<Value> = serde_json::from_str(&tokio::fs::read_to_string(path).await?)?;
    let users = Arc::new(records.iter().map(FieldValue::from).collect::<Vec<_>>());

    let schema = Schema::builder()
        .query(query_type(users))
        .register_type(user_type())
        .build()?;

    println!("🚀 hotql static schema demo");
    println!("   GET  http://127.0.0.1:8080/graphql?query=...");
    println!("   POST http://127.0.0.1:8080/graphql");
    println!("   GET  http://127.0.0.1:8080/graphql/schema\n");

    ServerBuilder::new()
        .with_schema(schema)
        .serve("127.0.0.1:8080")
        .await
}
