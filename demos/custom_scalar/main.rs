//! Custom scalar carrying a native type through resolvers
//!
//! `CustomId` values are produced by resolvers as opaque custom values and
//! parsed from argument literals by the scalar's input function.

use hotql::prelude::*;

#[derive(Debug, Clone, PartialEq)]
struct CustomId(String);

fn custom_id_scalar() -> ScalarType {
    ScalarType::new(
        "CustomId",
        |value| match value.downcast_ref::<CustomId>() {
            Some(CustomId(id)) => Ok(json!(format!("custom:{}", id))),
            None => Err(ScalarError::serialize("CustomId", "not a CustomId")),
        },
        |input| match input.as_str().and_then(|s| s.strip_prefix("custom:")) {
            Some(id) => Ok(FieldValue::custom(CustomId(id.to_string()))),
            None => Err(ScalarError::parse("CustomId", "expected \"custom:<id>\"")),
        },
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

    let query = ObjectType::new("Query")
        .field(
            FieldDefinition::new("newId", FieldType::non_null(FieldType::named("CustomId")))
                .resolver(resolver_fn(|_, _, _| {
                    Ok(FieldValue::custom(CustomId("42".to_string())))
                })),
        )
        .field(
            FieldDefinition::new("echo", FieldType::named("CustomId"))
                .argument(ArgumentDefinition::new(
                    "id",
                    FieldType::non_null(FieldType::named("CustomId")),
                ))
                .resolver(resolver_fn(|_, args, _| {
                    Ok(args.get("id").cloned().unwrap_or(FieldValue::Null))
                })),
        );
    let schema = Arc::new(
        Schema::builder()
            .query(query)
            .register_scalar(custom_id_scalar())
            .build()?,
    );

    println!("{}\n", schema.to_sdl());

    let executor = Executor::new(schema);
    for query in [
        "{ newId }",
        r#"{ echo(id: "custom:7") }"#,
        r#"{ echo(id: "7") }"#,
    ] {
        let response = executor.run(query, ContextData::new()).await;
        println!("{}\n  → {}", query, serde_json::to_string(&response)?);
    }

    Ok(())
}
