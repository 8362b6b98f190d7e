//! Assembly of the application router

use super::exposure::{GraphQLExposure, RestExposure};
use super::host::ServerHost;
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Merge the GraphQL and REST exposures with any custom routes
///
/// Every route is traced; CORS is permissive so browser tools can reach the
/// GraphQL endpoint.
pub fn build_router(host: Arc<ServerHost>, custom_routes: Vec<Router>) -> Router {
    let mut app = GraphQLExposure::build_router(host.clone()).merge(RestExposure::build_router(host));
    for custom_router in custom_routes {
        app = app.merge(custom_router);
    }
    app.layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HotqlConfig;
    use crate::core::resolver::resolver_fn;
    use crate::core::schema::{FieldDefinition, FieldType, ObjectType, Schema};
    use crate::core::FieldValue;
    use crate::reload::SchemaRegistry;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use axum::routing::get;
    use tower::ServiceExt;

    fn host() -> Arc<ServerHost> {
        let query = ObjectType::new("Query").field(
            FieldDefinition::new("hello", FieldType::named("String"))
                .resolver(resolver_fn(|_, _, _| Ok(FieldValue::string("world")))),
        );
        let schema = Schema::builder().query(query).build().unwrap();
        Arc::new(ServerHost::new(
            HotqlConfig::default(),
            Arc::new(SchemaRegistry::new(schema)),
        ))
    }

    #[tokio::test]
    async fn test_graphql_and_health_are_merged() {
        let app = build_router(host(), Vec::new());

        let response = app
            .clone()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(
                Request::post("/graphql")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"query": "{ hello }"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], br#"{"data":{"hello":"world"}}"#);
    }

    #[tokio::test]
    async fn test_custom_routes_are_served() {
        let custom = Router::new().route("/version", get(|| async { "1" }));
        let app = build_router(host(), vec![custom]);

        let response = app
            .oneshot(Request::get("/version").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
