//! Auth gate middleware.
//!
//! Verifies the inbound bearer token against a remote endpoint before the
//! request reaches validation or a handler. A failed verification
//! terminates the request at the gate:
//!
//! - the peer rejected the token (remote error): its status and body are
//!   relayed verbatim;
//! - the peer was unreachable (transport fault): a generic 500 is
//!   returned.
//!
//! On success the gate stores the correlation context and both recorders
//! in the request extensions so the pipeline and handler continue the
//! same records.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::context::CorrelationContext;
use crate::outbound::{CallOutcome, HttpCaller, RequestSpec, RetryPolicy};
use crate::summary::SummaryLog;
use crate::trace::DetailLog;
use crate::AppContext;

const COMPONENT: &str = "AuthService";
const OPERATION: &str = "verifyToken";

/// Per-process gate configuration.
#[derive(Debug, Clone, Default)]
pub struct AuthGateOptions {
    /// Per-call timeout for the verification request.
    pub timeout: Option<Duration>,
    /// Total attempts against the verification endpoint. `None` or `1`
    /// disables retry.
    pub retries: Option<u32>,
}

/// Token-verification gate, constructed once per process and layered onto
/// the router with `axum::middleware::from_fn_with_state`.
#[derive(Clone)]
pub struct AuthGate {
    endpoint: String,
    timeout: Option<Duration>,
    policy: Option<RetryPolicy>,
    caller: HttpCaller,
    app: AppContext,
}

impl AuthGate {
    pub fn new<S: Into<String>>(endpoint: S, options: AuthGateOptions, app: AppContext) -> Self {
        let policy = options
            .retries
            .filter(|retries| *retries > 1)
            .map(RetryPolicy::new);
        Self {
            endpoint: endpoint.into(),
            timeout: options.timeout,
            policy,
            caller: HttpCaller::new(),
            app,
        }
    }

    /// Replaces the retry policy built from the options, e.g. to shorten
    /// delays.
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = Some(policy);
        self
    }
}

/// Middleware entry point. Verifies the token and either runs the
/// continuation or terminates the request at the gate.
pub async fn verify_token(State(gate): State<AuthGate>, mut request: Request, next: Next) -> Response {
    let context = CorrelationContext::from_headers(request.headers());
    let detail = DetailLog::open(&gate.app.service_name, &context, Arc::clone(&gate.app.sink));
    let summary = SummaryLog::open(&gate.app.service_name, &context, Arc::clone(&gate.app.sink));

    detail.add_detail(COMPONENT, OPERATION, None);

    let spec = RequestSpec::post(&gate.endpoint)
        .header("Content-Type", "application/json")
        .header("Authorization", &context.authorization_value())
        .header("x-transaction-id", &context.transaction_id)
        .json(json!({ "access_token": context.bearer_token.clone() }))
        .timeout_opt(gate.timeout);

    match gate.caller.execute(&spec, gate.policy.as_ref(), &detail).await {
        CallOutcome::Success { body, .. } => {
            detail.add_response_body(COMPONENT, OPERATION, body);
            summary.add_success_block(COMPONENT, OPERATION, "200", "Success");

            request.extensions_mut().insert(context);
            request.extensions_mut().insert(detail);
            request.extensions_mut().insert(summary);
            next.run(request).await
        }
        CallOutcome::RemoteError { status, body } => {
            detail.add_response_error(
                COMPONENT,
                OPERATION,
                json!({ "status": status, "body": body.clone() }),
            );
            // Pass-through branch: the summary is intentionally not
            // flushed here. See DESIGN.md.
            (
                StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
                Json(body),
            )
                .into_response()
        }
        CallOutcome::TransportError { fault } => {
            detail.add_response_error(COMPONENT, OPERATION, json!({ "message": fault.to_string() }));
            summary.flush();
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "message": "Internal Server Error" })),
            )
                .into_response()
        }
    }
}
