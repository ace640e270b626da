//! Peer-call helper for service-to-service requests.
//!
//! Soft-fail policy: any response carrying a status and a body is returned
//! to the caller as ordinary data, 4xx/5xx included, so downstream error
//! payloads stay first-class and inspectable. Only a transport fault (no
//! response at all) propagates as an error.

use std::time::Duration;

use serde_json::Value;

use crate::context::CorrelationContext;
use crate::errors::CoreError;
use crate::outbound::{CallOutcome, HttpCaller, RequestSpec, RetryPolicy};
use crate::trace::DetailLog;

const COMPONENT: &str = "HttpService";

/// What a sibling service answered, whatever its status.
#[derive(Debug, Clone, PartialEq)]
pub struct PeerReply {
    pub status: u16,
    pub data: Value,
}

/// One peer call. When `headers` is `None` the default header set derived
/// from the inbound context is used; an explicit set fully replaces the
/// defaults, it is never merged with them.
#[derive(Debug, Clone)]
pub struct PeerRequest {
    pub endpoint: String,
    pub headers: Option<Vec<(String, String)>>,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    pub basic_auth: Option<(String, Option<String>)>,
    pub timeout: Option<Duration>,
    pub policy: Option<RetryPolicy>,
}

impl PeerRequest {
    pub fn new(endpoint: &str) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            headers: None,
            query: Vec::new(),
            body: None,
            basic_auth: None,
            timeout: None,
            policy: None,
        }
    }

    pub fn headers(mut self, headers: Vec<(String, String)>) -> Self {
        self.headers = Some(headers);
        self
    }

    pub fn query(mut self, query: Vec<(String, String)>) -> Self {
        self.query = query;
        self
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn basic_auth(mut self, username: &str, password: Option<&str>) -> Self {
        self.basic_auth = Some((username.to_string(), password.map(str::to_string)));
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = Some(policy);
        self
    }
}

/// Outbound client for sibling services.
#[derive(Debug, Clone, Default)]
pub struct PeerClient {
    caller: HttpCaller,
}

impl PeerClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_caller(caller: HttpCaller) -> Self {
        Self { caller }
    }

    pub async fn get(
        &self,
        request: PeerRequest,
        context: &CorrelationContext,
        detail: &DetailLog,
    ) -> Result<PeerReply, CoreError> {
        self.call(reqwest::Method::GET, request, context, detail)
            .await
    }

    pub async fn post(
        &self,
        request: PeerRequest,
        context: &CorrelationContext,
        detail: &DetailLog,
    ) -> Result<PeerReply, CoreError> {
        self.call(reqwest::Method::POST, request, context, detail)
            .await
    }

    async fn call(
        &self,
        method: reqwest::Method,
        request: PeerRequest,
        context: &CorrelationContext,
        detail: &DetailLog,
    ) -> Result<PeerReply, CoreError> {
        let operation = method.as_str().to_lowercase();
        detail.add_detail(COMPONENT, &operation, Some(&request.endpoint));

        let headers = effective_headers(request.headers.as_ref(), context);
        let spec = RequestSpec::new(method, &request.endpoint)
            .headers(headers)
            .query(request.query)
            .timeout_opt(request.timeout);
        let spec = match request.body {
            Some(body) => spec.json(body),
            None => spec,
        };
        let spec = match request.basic_auth {
            Some((username, password)) => spec.basic_auth(&username, password.as_deref()),
            None => spec,
        };

        match self
            .caller
            .execute(&spec, request.policy.as_ref(), detail)
            .await
        {
            CallOutcome::Success { status, body } | CallOutcome::RemoteError { status, body } => {
                Ok(PeerReply { status, data: body })
            }
            CallOutcome::TransportError { fault } => {
                detail.add_response_error(
                    COMPONENT,
                    &operation,
                    serde_json::json!({
                        "endpoint": request.endpoint,
                        "message": fault.to_string(),
                    }),
                );
                Err(CoreError::Transport(fault))
            }
        }
    }
}

/// Default headers propagate the inbound correlation id and credential;
/// an explicit set replaces them wholesale.
fn effective_headers(
    explicit: Option<&Vec<(String, String)>>,
    context: &CorrelationContext,
) -> Vec<(String, String)> {
    match explicit {
        Some(headers) => headers.clone(),
        None => vec![
            ("Content-Type".to_string(), "application/json".to_string()),
            ("Authorization".to_string(), context.authorization_value()),
            (
                "x-transaction-id".to_string(),
                context.transaction_id.clone(),
            ),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> CorrelationContext {
        CorrelationContext {
            transaction_id: "txn-7".to_string(),
            bearer_token: "secret".to_string(),
        }
    }

    #[test]
    fn test_default_headers_propagate_the_inbound_context() {
        let headers = effective_headers(None, &context());
        assert!(headers.contains(&("x-transaction-id".to_string(), "txn-7".to_string())));
        assert!(headers.contains(&("Authorization".to_string(), "Bearer secret".to_string())));
        assert!(headers.contains(&("Content-Type".to_string(), "application/json".to_string())));
    }

    #[test]
    fn test_explicit_headers_replace_the_defaults_entirely() {
        let explicit = vec![("x-api-key".to_string(), "k".to_string())];
        let headers = effective_headers(Some(&explicit), &context());
        assert_eq!(headers, explicit);
        assert!(!headers.iter().any(|(name, _)| name == "Authorization"));
        assert!(!headers.iter().any(|(name, _)| name == "x-transaction-id"));
    }
}
