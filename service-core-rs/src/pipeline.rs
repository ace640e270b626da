//! Typed route pipeline.
//!
//! Routes are built once at startup with [`RouteBuilder`], collected into
//! an explicit list and registered under a base path with [`register`].
//! Dispatch per request: middleware chain (attached as axum layers, any of
//! which may respond without calling its continuation), then query
//! validation, then body validation, then the handler. Validation happens
//! strictly before the handler runs; a handler never observes
//! partially-validated input, and a raw internal error never reaches the
//! response -- failures are mapped centrally in [`crate::errors`].

use std::collections::HashMap;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Path, Request};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::MethodRouter;
use axum::{Json, Router};
use futures::future::BoxFuture;
use serde_json::{Map, Value};

use crate::context::CorrelationContext;
use crate::errors::CoreError;
use crate::schema::Schema;
use crate::summary::SummaryLog;
use crate::trace::DetailLog;
use crate::AppContext;

/// Maximum request payload size (10MB).
pub const MAX_PAYLOAD_SIZE: usize = 10 * 1024 * 1024;

/// HTTP methods the pipeline dispatches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

/// A request that passed every schema gate, as seen by a handler.
pub struct ValidatedRequest {
    /// Correlation identifiers extracted once for this request.
    pub context: CorrelationContext,
    /// Shared detail trace for this request (the auth gate may already
    /// have written to it).
    pub detail: DetailLog,
    /// Shared outcome summary for this request.
    pub summary: SummaryLog,
    /// Raw path parameters; not schema-gated.
    pub params: HashMap<String, String>,
    /// Validated query object, `None` when the route declares no query
    /// schema.
    pub query: Option<Value>,
    /// Validated body, `None` when the route declares no body schema.
    pub body: Option<Value>,
}

/// What a handler hands back on success: a status and a JSON body.
#[derive(Debug, Clone)]
pub struct HandlerReply {
    pub status: StatusCode,
    pub body: Value,
}

impl HandlerReply {
    pub fn ok(body: Value) -> Self {
        Self {
            status: StatusCode::OK,
            body,
        }
    }

    pub fn created(body: Value) -> Self {
        Self {
            status: StatusCode::CREATED,
            body,
        }
    }

    pub fn with_status(status: StatusCode, body: Value) -> Self {
        Self { status, body }
    }
}

type HandlerFn =
    dyn Fn(ValidatedRequest) -> BoxFuture<'static, Result<HandlerReply, CoreError>> + Send + Sync;

/// One method+path+schemas+handler tuple. Immutable for the process
/// lifetime once built.
pub struct RouteDefinition {
    method: RouteMethod,
    path: String,
    query_schema: Option<Arc<dyn Schema>>,
    body_schema: Option<Arc<dyn Schema>>,
    handler: Arc<HandlerFn>,
}

/// Fluent builder for [`RouteDefinition`]: `query` and `body` are each
/// optional and at most once; `handler` finalizes.
pub struct RouteBuilder {
    method: RouteMethod,
    path: String,
    query_schema: Option<Arc<dyn Schema>>,
    body_schema: Option<Arc<dyn Schema>>,
}

impl RouteBuilder {
    pub fn new(method: RouteMethod, path: &str) -> Self {
        Self {
            method,
            path: path.to_string(),
            query_schema: None,
            body_schema: None,
        }
    }

    pub fn get(path: &str) -> Self {
        Self::new(RouteMethod::Get, path)
    }

    pub fn post(path: &str) -> Self {
        Self::new(RouteMethod::Post, path)
    }

    pub fn put(path: &str) -> Self {
        Self::new(RouteMethod::Put, path)
    }

    pub fn patch(path: &str) -> Self {
        Self::new(RouteMethod::Patch, path)
    }

    pub fn delete(path: &str) -> Self {
        Self::new(RouteMethod::Delete, path)
    }

    pub fn query(mut self, schema: Arc<dyn Schema>) -> Self {
        self.query_schema = Some(schema);
        self
    }

    pub fn body(mut self, schema: Arc<dyn Schema>) -> Self {
        self.body_schema = Some(schema);
        self
    }

    pub fn handler<F, Fut>(self, handler: F) -> RouteDefinition
    where
        F: Fn(ValidatedRequest) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = Result<HandlerReply, CoreError>> + Send + 'static,
    {
        RouteDefinition {
            method: self.method,
            path: self.path,
            query_schema: self.query_schema,
            body_schema: self.body_schema,
            handler: Arc::new(
                move |request| -> BoxFuture<'static, Result<HandlerReply, CoreError>> {
                    Box::pin(handler(request))
                },
            ),
        }
    }
}

/// Mounts every definition under `base_path + definition.path`, in list
/// order. Middleware (e.g. the auth gate) attaches to the returned router
/// with axum layers and runs before validation.
pub fn register(base_path: &str, routes: Vec<RouteDefinition>, app: AppContext) -> Router {
    let mut router = Router::new();
    for definition in routes {
        let full_path = join_paths(base_path, &definition.path);
        let method = definition.method;
        let method_router = to_method_router(Arc::new(definition), app.clone());
        tracing::debug!(path = %full_path, method = ?method, "registering route");
        router = router.route(&full_path, method_router);
    }
    router
}

fn join_paths(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    if path.is_empty() {
        if base.is_empty() {
            "/".to_string()
        } else {
            base.to_string()
        }
    } else {
        format!("{}/{}", base, path)
    }
}

fn to_method_router(definition: Arc<RouteDefinition>, app: AppContext) -> MethodRouter {
    let method = definition.method;
    let handler = move |Path(params): Path<HashMap<String, String>>, request: Request| {
        let definition = Arc::clone(&definition);
        let app = app.clone();
        async move { dispatch(definition, app, params, request).await }
    };
    match method {
        RouteMethod::Get => axum::routing::get(handler),
        RouteMethod::Post => axum::routing::post(handler),
        RouteMethod::Put => axum::routing::put(handler),
        RouteMethod::Patch => axum::routing::patch(handler),
        RouteMethod::Delete => axum::routing::delete(handler),
    }
}

async fn dispatch(
    definition: Arc<RouteDefinition>,
    app: AppContext,
    params: HashMap<String, String>,
    request: Request,
) -> Response {
    let (parts, body) = request.into_parts();

    let context = parts
        .extensions
        .get::<CorrelationContext>()
        .cloned()
        .unwrap_or_else(|| CorrelationContext::from_headers(&parts.headers));
    let detail = parts
        .extensions
        .get::<DetailLog>()
        .cloned()
        .unwrap_or_else(|| DetailLog::open(&app.service_name, &context, Arc::clone(&app.sink)));
    let summary = parts
        .extensions
        .get::<SummaryLog>()
        .cloned()
        .unwrap_or_else(|| SummaryLog::open(&app.service_name, &context, Arc::clone(&app.sink)));

    let query = match &definition.query_schema {
        Some(schema) => {
            let raw = query_to_value(parts.uri.query().unwrap_or(""));
            match schema.parse(&raw) {
                Ok(value) => Some(value),
                Err(err) => return CoreError::Validation(err).into_response(),
            }
        }
        None => None,
    };

    let body = match &definition.body_schema {
        Some(schema) => match read_json_body(body).await {
            Ok(raw) => match schema.parse(&raw) {
                Ok(value) => Some(value),
                Err(err) => return CoreError::Validation(err).into_response(),
            },
            Err(err) => return CoreError::Validation(err).into_response(),
        },
        None => None,
    };

    let validated = ValidatedRequest {
        context,
        detail: detail.clone(),
        summary: summary.clone(),
        params,
        query,
        body,
    };

    match (definition.handler)(validated).await {
        Ok(reply) => {
            // Normal completion flushes both channels; both calls are
            // no-ops when a handler or service already closed them.
            summary.flush();
            detail.end();
            (reply.status, Json(reply.body)).into_response()
        }
        // Failure paths leave the recorders untouched: whether the trace
        // was flushed is the failing component's decision.
        Err(err) => err.into_response(),
    }
}

/// Raw query parameters as a JSON object of strings. Repeated keys keep
/// the last value.
fn query_to_value(raw_query: &str) -> Value {
    let mut map = Map::new();
    for (key, value) in url::form_urlencoded::parse(raw_query.as_bytes()) {
        map.insert(key.into_owned(), Value::String(value.into_owned()));
    }
    Value::Object(map)
}

async fn read_json_body(body: Body) -> Result<Value, crate::schema::ValidationError> {
    let bytes = axum::body::to_bytes(body, MAX_PAYLOAD_SIZE)
        .await
        .map_err(|err| {
            crate::schema::ValidationError::new(format!("failed to read request body: {}", err))
        })?;
    if bytes.is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_slice(&bytes).map_err(|err| {
        crate::schema::ValidationError::new(format!("request body is not valid JSON: {}", err))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_join_paths_handles_root_and_nested_routes() {
        assert_eq!(join_paths("/products", "/"), "/products");
        assert_eq!(join_paths("/products", "/:id"), "/products/:id");
        assert_eq!(join_paths("/products/", "/:id"), "/products/:id");
        assert_eq!(join_paths("", "/"), "/");
    }

    #[test]
    fn test_query_to_value_parses_pairs() {
        let value = query_to_value("name=shirt&limit=5");
        assert_eq!(value, json!({"name": "shirt", "limit": "5"}));
    }

    #[test]
    fn test_query_to_value_empty_query() {
        assert_eq!(query_to_value(""), json!({}));
    }

    #[test]
    fn test_query_to_value_decodes_percent_escapes() {
        let value = query_to_value("name=blue%20shirt");
        assert_eq!(value, json!({"name": "blue shirt"}));
    }
}
