//! Smallest possible schema: one root field resolving to a constant

use hotql::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let query = ObjectType::new("Query").field(
        FieldDefinition::new("hello", FieldType::named("String"))
            .resolver(resolver_fn(|_, _, _| Ok(FieldValue::string("world")))),
    );
    let schema = Arc::new(Schema::builder().query(query).build()?);

    let response = hotql::executor::run("{ hello }", schema, ContextData::new()).await;
    println!("{}", serde_json::to_string(&response)?);

    Ok(())
}
