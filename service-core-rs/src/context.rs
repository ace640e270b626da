//! Per-request correlation context.
//!
//! Extraction only: the transaction id and bearer credential are read from
//! the inbound headers once and carried by reference through the rest of
//! the request. Absence of either header is a valid context, not an error,
//! and a missing transaction id is never replaced with a generated one.

use axum::http::HeaderMap;

/// Header carrying the caller-supplied correlation identifier.
pub const TRANSACTION_ID_HEADER: &str = "x-transaction-id";

/// Header carrying the bearer credential.
pub const AUTHORIZATION_HEADER: &str = "authorization";

const BEARER_PREFIX: &str = "Bearer ";

/// Correlation identifiers for one inbound request.
///
/// Derived exactly once per request and immutable afterwards; every
/// recorder and outbound call for that request reads from the same value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrelationContext {
    /// Caller-supplied transaction id, empty string when absent.
    pub transaction_id: String,
    /// Bearer token with the `Bearer ` scheme prefix stripped, empty
    /// string when the authorization header is absent.
    pub bearer_token: String,
}

impl CorrelationContext {
    /// Builds a context from the inbound request headers. Pure extraction,
    /// no validation and no side effects.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let transaction_id = headers
            .get(TRANSACTION_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("")
            .to_string();

        let authorization = headers
            .get(AUTHORIZATION_HEADER)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("");

        let bearer_token = authorization
            .strip_prefix(BEARER_PREFIX)
            .unwrap_or(authorization)
            .to_string();

        Self {
            transaction_id,
            bearer_token,
        }
    }

    /// The value to forward as an `Authorization` header on outbound calls,
    /// reconstructing the scheme prefix. Empty when no credential was sent.
    pub fn authorization_value(&self) -> String {
        if self.bearer_token.is_empty() {
            String::new()
        } else {
            format!("{}{}", BEARER_PREFIX, self.bearer_token)
        }
    }
}
