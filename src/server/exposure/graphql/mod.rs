//! GraphQL API exposure
//!
//! Routes, relative to the configured GraphQL path (default `/graphql`):
//! - `GET  {path}?query=...`: query in the URL
//! - `POST {path}` with `{"query": "...", "operationName": "..."}`
//! - `GET  {path}/schema`: SDL of the active schema
//!
//! Execution results are always returned with status 200, including syntax
//! and validation failures; the outcome is carried in the response body.
//! Malformed requests answer 200 with a `BAD_REQUEST` error in the same shape.

use crate::core::context::ContextData;
use crate::executor::{GraphQLError, Response};
use crate::server::host::ServerHost;
use axum::{
    Json, Router,
    extract::{
        Extension, Query,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{HeaderMap, header},
    response::IntoResponse,
    routing::get,
};
use serde::Deserialize;
use std::sync::Arc;

/// Query string of `GET {path}`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GraphQLQueryParams {
    query: Option<String>,
    operation_name: Option<String>,
}

/// Body of `POST {path}`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GraphQLRequestBody {
    query: Option<String>,
    operation_name: Option<String>,
}

pub struct GraphQLExposure;

impl GraphQLExposure {
    /// Build the GraphQL router from a host
    ///
    /// ```rust,ignore
    /// let host = Arc::new(builder.build_host().await?);
    /// let graphql_app = GraphQLExposure::build_router(host);
    /// ```
    pub fn build_router(host: Arc<ServerHost>) -> Router {
        let path = host.config.server.graphql_path.clone();
        Router::new()
            .route(&path, get(graphql_get).post(graphql_post))
            .route(&format!("{}/schema", path), get(graphql_schema))
            .layer(Extension(host))
    }
}

async fn graphql_get(
    Extension(host): Extension<Arc<ServerHost>>,
    headers: HeaderMap,
    params: Result<Query<GraphQLQueryParams>, QueryRejection>,
) -> Json<Response> {
    let params = match params {
        Ok(Query(params)) => params,
        Err(rejection) => return Json(bad_request(rejection.body_text())),
    };
    let Some(query) = params.query.filter(|q| !q.trim().is_empty()) else {
        return Json(bad_request("Must provide query string."));
    };
    Json(execute(&host, &query, params.operation_name.as_deref(), headers).await)
}

async fn graphql_post(
    Extension(host): Extension<Arc<ServerHost>>,
    headers: HeaderMap,
    request: Result<Json<GraphQLRequestBody>, JsonRejection>,
) -> Json<Response> {
    let request = match request {
        Ok(Json(request)) => request,
        Err(rejection) => {
            tracing::debug!(status = %rejection.status(), "rejected GraphQL request body");
            return Json(bad_request(rejection.body_text()));
        }
    };
    let Some(query) = request.query.filter(|q| !q.trim().is_empty()) else {
        return Json(bad_request("Must provide query string."));
    };
    Json(execute(&host, &query, request.operation_name.as_deref(), headers).await)
}

fn bad_request(message: impl Into<String>) -> Response {
    Response::from_errors(vec![GraphQLError::new(message).with_code("BAD_REQUEST")])
}

/// Run a request against the schema active when it arrived
///
/// Request headers are made available to resolvers as context data.
async fn execute(
    host: &ServerHost,
    query: &str,
    operation_name: Option<&str>,
    headers: HeaderMap,
) -> Response {
    let data = ContextData::new().insert(headers);
    host.executor().run_operation(query, operation_name, data).await
}

async fn graphql_schema(Extension(host): Extension<Arc<ServerHost>>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        host.registry.current().to_sdl(),
    )
}
