//! # Service Core
//!
//! Shared request-processing infrastructure for the storefront services.
//! This library provides the cross-cutting pieces every route goes through:
//!
//! - Correlation context extraction (`x-transaction-id` / bearer credential)
//! - A typed route pipeline that gates handlers behind schema validation
//! - Dual-channel observability: a per-request detail trace and an
//!   independent per-request outcome summary
//! - A resilient outbound-call wrapper with bounded retry and pass-through
//!   error classification, used by the auth gate and by peer calls

pub mod auth;
pub mod config;
pub mod context;
pub mod errors;
pub mod logging;
pub mod outbound;
pub mod peer;
pub mod pipeline;
pub mod schema;
pub mod sink;
pub mod summary;
pub mod trace;

use std::sync::Arc;

pub use crate::auth::{AuthGate, AuthGateOptions};
pub use crate::config::ServiceConfig;
pub use crate::context::CorrelationContext;
pub use crate::errors::{CoreError, TransportFault};
pub use crate::logging::{init_logging, LoggingConfig};
pub use crate::outbound::{CallOutcome, HttpCaller, RequestSpec, RetryPolicy};
pub use crate::peer::{PeerClient, PeerReply, PeerRequest};
pub use crate::pipeline::{
    register, HandlerReply, RouteBuilder, RouteDefinition, RouteMethod, ValidatedRequest,
};
pub use crate::schema::{JsonSchema, Schema, ValidationError};
pub use crate::sink::{LogSink, MemorySink, StdoutSink};
pub use crate::summary::SummaryLog;
pub use crate::trace::DetailLog;

/// Process-wide collaborators handed to every component at construction
/// time. Nothing in this crate reaches for ambient global state; services
/// build one `AppContext` in `main` and pass it down.
#[derive(Clone)]
pub struct AppContext {
    /// Service name stamped onto every emitted record.
    pub service_name: String,
    /// Append-only structured log sink shared by all recorders.
    pub sink: Arc<dyn LogSink>,
}

impl AppContext {
    pub fn new<S: Into<String>>(service_name: S, sink: Arc<dyn LogSink>) -> Self {
        Self {
            service_name: service_name.into(),
            sink,
        }
    }
}
