//! Resilient outbound-call wrapper.
//!
//! Every outbound HTTP call goes through [`HttpCaller::execute`], which
//! classifies the result into a closed [`CallOutcome`] and optionally
//! retries transient failures under a caller-supplied [`RetryPolicy`].
//! Every attempt outcome and every retry decision is reported to the
//! detail trace before it is acted on.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use tokio::time::sleep;
use tracing::debug;

use crate::errors::TransportFault;
use crate::trace::DetailLog;

const COMPONENT: &str = "HttpCaller";

/// Classified result of one outbound call.
#[derive(Debug, Clone, PartialEq)]
pub enum CallOutcome {
    /// The peer responded with a 2xx status.
    Success { status: u16, body: Value },
    /// The peer responded with a non-2xx status and a well-formed body.
    RemoteError { status: u16, body: Value },
    /// No response was obtained at all.
    TransportError { fault: TransportFault },
}

impl CallOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, CallOutcome::Success { .. })
    }

    /// One-line description for trace diagnostics.
    pub fn describe(&self) -> String {
        match self {
            CallOutcome::Success { status, .. } => format!("success with status {}", status),
            CallOutcome::RemoteError { status, .. } => {
                format!("remote error with status {}", status)
            }
            CallOutcome::TransportError { fault } => fault.to_string(),
        }
    }
}

/// Declarative description of one outbound request.
#[derive(Debug, Clone)]
pub struct RequestSpec {
    pub method: reqwest::Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    pub basic_auth: Option<(String, Option<String>)>,
    pub timeout: Option<Duration>,
}

impl RequestSpec {
    pub fn new(method: reqwest::Method, url: &str) -> Self {
        Self {
            method,
            url: url.to_string(),
            headers: Vec::new(),
            query: Vec::new(),
            body: None,
            basic_auth: None,
            timeout: None,
        }
    }

    pub fn get(url: &str) -> Self {
        Self::new(reqwest::Method::GET, url)
    }

    pub fn post(url: &str) -> Self {
        Self::new(reqwest::Method::POST, url)
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    /// Replaces the full header set.
    pub fn headers(mut self, headers: Vec<(String, String)>) -> Self {
        self.headers = headers;
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

    pub fn timeout_opt(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

type DelayFn = dyn Fn(u32) -> Duration + Send + Sync;
type RetryPredicate = dyn Fn(&CallOutcome) -> bool + Send + Sync;

/// Bounded retry policy for one call site.
///
/// Immutable once built; each `execute` invocation owns its own attempt
/// counter, so policies can be shared freely across concurrent calls.
#[derive(Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    delay_fn: Arc<DelayFn>,
    predicate: Arc<RetryPredicate>,
}

impl RetryPolicy {
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

    /// Policy with the default delay (linear, `attempt x 1s` -- a
    /// deliberate simplification, not exponential backoff) and the default
    /// transient-failure predicate.
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay_fn: Arc::new(|attempt| Duration::from_millis(u64::from(attempt) * 1000)),
            predicate: Arc::new(Self::is_transient),
        }
    }

    pub fn with_delay_fn<F>(mut self, delay_fn: F) -> Self
    where
        F: Fn(u32) -> Duration + Send + Sync + 'static,
    {
        self.delay_fn = Arc::new(delay_fn);
        self
    }

    pub fn with_predicate<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&CallOutcome) -> bool + Send + Sync + 'static,
    {
        self.predicate = Arc::new(predicate);
        self
    }

    /// Linear delay with a unit other than one second; attempt `n` waits
    /// `n x unit`.
    pub fn with_delay_unit(self, unit: Duration) -> Self {
        self.with_delay_fn(move |attempt| unit * attempt)
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn delay_for(&self, attempt: u32) -> Duration {
        (self.delay_fn)(attempt)
    }

    pub fn should_retry(&self, outcome: &CallOutcome) -> bool {
        (self.predicate)(outcome)
    }

    /// Default predicate: throttling/unavailability statuses and the
    /// connection-level transport faults. Anything else stops immediately.
    pub fn is_transient(outcome: &CallOutcome) -> bool {
        match outcome {
            CallOutcome::Success { .. } => false,
            CallOutcome::RemoteError { status, .. } => matches!(status, 429 | 503),
            CallOutcome::TransportError { fault } => matches!(
                fault,
                TransportFault::Aborted | TransportFault::Refused | TransportFault::Reset
            ),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_ATTEMPTS)
    }
}

impl fmt::Debug for RetryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RetryPolicy(max_attempts={})", self.max_attempts)
    }
}

/// Outbound call executor shared by the auth gate and the peer-call
/// helper. Wraps one `reqwest::Client`; cloning shares the connection
/// pool.
#[derive(Debug, Clone, Default)]
pub struct HttpCaller {
    client: reqwest::Client,
}

impl HttpCaller {
    pub fn new() -> Self {
        Self::default()
    }

    /// Executes the request. Without a policy the call is attempted
    /// exactly once. With a policy, retry-eligible outcomes are retried
    /// after `delay_fn(attempt)` up to `max_attempts` total attempts; any
    /// other outcome stops immediately.
    pub async fn execute(
        &self,
        spec: &RequestSpec,
        policy: Option<&RetryPolicy>,
        detail: &DetailLog,
    ) -> CallOutcome {
        let max_attempts = policy.map(RetryPolicy::max_attempts).unwrap_or(1);
        let mut attempt = 1u32;

        loop {
            let outcome = self.attempt(spec).await;
            detail.add_detail(
                COMPONENT,
                "attempt",
                Some(&format!(
                    "{} {} attempt {}/{}: {}",
                    spec.method,
                    spec.url,
                    attempt,
                    max_attempts,
                    outcome.describe()
                )),
            );

            let retry = policy
                .map(|p| p.should_retry(&outcome))
                .unwrap_or(false)
                && attempt < max_attempts;

            if !retry {
                return outcome;
            }

            let delay = policy.map(|p| p.delay_for(attempt)).unwrap_or_default();
            detail.add_detail(
                COMPONENT,
                "retry",
                Some(&format!(
                    "retrying in {}ms after {}",
                    delay.as_millis(),
                    outcome.describe()
                )),
            );
            debug!(
                url = %spec.url,
                attempt = attempt,
                delay_ms = %delay.as_millis(),
                "retrying outbound call"
            );

            sleep(delay).await;
            attempt += 1;
        }
    }

    async fn attempt(&self, spec: &RequestSpec) -> CallOutcome {
        let mut request = self.client.request(spec.method.clone(), &spec.url);

        for (name, value) in &spec.headers {
            request = request.header(name.as_str(), value.as_str());
        }
        if !spec.query.is_empty() {
            request = request.query(&spec.query);
        }
        if let Some(body) = &spec.body {
            request = request.json(body);
        }
        if let Some((username, password)) = &spec.basic_auth {
            request = request.basic_auth(username, password.as_deref());
        }
        if let Some(timeout) = spec.timeout {
            request = request.timeout(timeout);
        }

        match request.send().await {
            Ok(response) => {
                let status = response.status().as_u16();
                let body = read_body(response).await;
                if (200..300).contains(&status) {
                    CallOutcome::Success { status, body }
                } else {
                    CallOutcome::RemoteError { status, body }
                }
            }
            Err(err) => CallOutcome::TransportError {
                fault: TransportFault::from_reqwest(&err),
            },
        }
    }
}

async fn read_body(response: reqwest::Response) -> Value {
    let bytes = match response.bytes().await {
        Ok(bytes) => bytes,
        Err(_) => return Value::Null,
    };
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| json!(String::from_utf8_lossy(&bytes).into_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_delay_is_linear_in_the_attempt_number() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(1), Duration::from_millis(1000));
        assert_eq!(policy.delay_for(2), Duration::from_millis(2000));
        assert_eq!(policy.delay_for(3), Duration::from_millis(3000));
    }

    #[test]
    fn test_delay_unit_scales_linearly() {
        let policy = RetryPolicy::new(3).with_delay_unit(Duration::from_millis(10));
        assert_eq!(policy.delay_for(1), Duration::from_millis(10));
        assert_eq!(policy.delay_for(2), Duration::from_millis(20));
    }

    #[test]
    fn test_max_attempts_is_at_least_one() {
        assert_eq!(RetryPolicy::new(0).max_attempts(), 1);
        assert_eq!(RetryPolicy::default().max_attempts(), 3);
    }

    #[test]
    fn test_transient_statuses_are_retryable() {
        for status in [429u16, 503] {
            let outcome = CallOutcome::RemoteError {
                status,
                body: Value::Null,
            };
            assert!(RetryPolicy::is_transient(&outcome), "status {}", status);
        }
    }

    #[test]
    fn test_other_statuses_are_not_retryable() {
        for status in [400u16, 401, 404, 500, 502] {
            let outcome = CallOutcome::RemoteError {
                status,
                body: Value::Null,
            };
            assert!(!RetryPolicy::is_transient(&outcome), "status {}", status);
        }
    }

    #[test]
    fn test_connection_faults_are_retryable_but_other_faults_are_not() {
        for fault in [
            TransportFault::Aborted,
            TransportFault::Refused,
            TransportFault::Reset,
        ] {
            let outcome = CallOutcome::TransportError { fault };
            assert!(RetryPolicy::is_transient(&outcome));
        }

        let outcome = CallOutcome::TransportError {
            fault: TransportFault::Other("dns failure".to_string()),
        };
        assert!(!RetryPolicy::is_transient(&outcome));
    }

    #[test]
    fn test_success_is_never_retried() {
        let outcome = CallOutcome::Success {
            status: 200,
            body: Value::Null,
        };
        assert!(!RetryPolicy::is_transient(&outcome));
    }
}
