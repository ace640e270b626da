//! Error taxonomy and the centralized response mapper.
//!
//! Failures are classified once, at the layer that observes them, into a
//! closed set of variants; everything downstream pattern-matches instead
//! of probing error identity. The mapping to HTTP responses lives here so
//! no handler can leak a raw internal error to a caller.

use std::error::Error as StdError;
use std::fmt;
use std::io;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};
use thiserror::Error;

use crate::schema::ValidationError;

/// Local transport fault: no response was obtained from the peer.
///
/// A timed-out attempt is classified as `Aborted`, matching the upstream
/// convention where a per-call timeout surfaces as a connection abort.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportFault {
    /// Connection aborted locally, including per-call timeouts.
    Aborted,
    /// Peer refused the connection.
    Refused,
    /// Connection reset by the peer mid-exchange.
    Reset,
    /// Any other local fault (DNS, TLS, malformed URL, ...).
    Other(String),
}

impl TransportFault {
    /// Classifies a reqwest error by walking its source chain for the
    /// underlying I/O error kind.
    pub fn from_reqwest(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            return TransportFault::Aborted;
        }

        let mut source = err.source();
        while let Some(cause) = source {
            if let Some(io_err) = cause.downcast_ref::<io::Error>() {
                return match io_err.kind() {
                    io::ErrorKind::ConnectionRefused => TransportFault::Refused,
                    io::ErrorKind::ConnectionReset => TransportFault::Reset,
                    io::ErrorKind::ConnectionAborted | io::ErrorKind::TimedOut => {
                        TransportFault::Aborted
                    }
                    _ => TransportFault::Other(io_err.to_string()),
                };
            }
            source = cause.source();
        }

        // Connect errors that hide their io cause are still refusals from
        // the caller's point of view.
        if err.is_connect() {
            return TransportFault::Refused;
        }

        TransportFault::Other(err.to_string())
    }
}

impl fmt::Display for TransportFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportFault::Aborted => write!(f, "connection aborted"),
            TransportFault::Refused => write!(f, "connection refused"),
            TransportFault::Reset => write!(f, "connection reset"),
            TransportFault::Other(cause) => write!(f, "transport failure: {}", cause),
        }
    }
}

/// The closed failure set observed at the pipeline boundary.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Query or body failed schema validation. Always client fault.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// The peer responded with a non-2xx status and a well-formed body.
    /// Status and body are relayed verbatim, never replaced by a generic
    /// failure.
    #[error("upstream returned status {status}")]
    Remote { status: u16, body: Value },

    /// No response was obtained from the peer.
    #[error("{0}")]
    Transport(TransportFault),

    /// An uncaught failure inside handler logic.
    #[error("{0}")]
    Handler(String),
}

impl CoreError {
    /// Structured diagnostics for the detail trace: name, message and any
    /// transport-level metadata such as the upstream status.
    pub fn diagnostics(&self) -> Value {
        match self {
            CoreError::Validation(err) => json!({
                "kind": "validation",
                "message": err.message,
                "details": err.details,
            }),
            CoreError::Remote { status, body } => json!({
                "kind": "remote",
                "status": status,
                "body": body,
            }),
            CoreError::Transport(fault) => json!({
                "kind": "transport",
                "message": fault.to_string(),
            }),
            CoreError::Handler(message) => json!({
                "kind": "handler",
                "message": message,
            }),
        }
    }
}

const GENERIC_MESSAGE: &str = "Internal Server Error";

impl IntoResponse for CoreError {
    fn into_response(self) -> Response {
        match self {
            // Validation errors are always client fault regardless of the
            // validator's own classification.
            CoreError::Validation(err) => (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "message": err.message,
                    "details": err.details,
                })),
            )
                .into_response(),
            // Pass-through: the peer's own status and body, untouched.
            CoreError::Remote { status, body } => (
                StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
                Json(body),
            )
                .into_response(),
            // No upstream payload to relay, so collapse to a generic 500.
            CoreError::Transport(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "message": GENERIC_MESSAGE })),
            )
                .into_response(),
            CoreError::Handler(message) => {
                let message = if message.is_empty() {
                    GENERIC_MESSAGE.to_string()
                } else {
                    message
                };
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "message": message })),
                )
                    .into_response()
            }
        }
    }
}
