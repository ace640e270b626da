//! Per-request outcome summary.
//!
//! A single aggregate record per request, deliberately decoupled from the
//! detail trace: the summary can flush before, after, or without the trace
//! ever being closed, so success/failure aggregates survive even when a
//! deep trace is incomplete. A flush with zero blocks is a no-op emission,
//! not an error.

use std::sync::{Arc, Mutex};

use serde::Serialize;
use serde_json::{json, Value};

use crate::context::CorrelationContext;
use crate::sink::LogSink;

/// Success or failure, as seen by the aggregate metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockOutcome {
    Success,
    Failure,
}

/// One outcome block: the result of one logical operation in the request.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryBlock {
    pub category: String,
    pub description: String,
    pub status_code: String,
    pub message: String,
    pub outcome: BlockOutcome,
}

struct SummaryInner {
    service: String,
    transaction_id: String,
    blocks: Vec<SummaryBlock>,
    closed: bool,
    sink: Arc<dyn LogSink>,
}

/// Per-request outcome recorder with a lifecycle independent of
/// [`DetailLog`](crate::trace::DetailLog). Cloneable; clones share the
/// same record.
#[derive(Clone)]
pub struct SummaryLog {
    inner: Arc<Mutex<SummaryInner>>,
}

impl SummaryLog {
    pub fn open(service: &str, context: &CorrelationContext, sink: Arc<dyn LogSink>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(SummaryInner {
                service: service.to_string(),
                transaction_id: context.transaction_id.clone(),
                blocks: Vec::new(),
                closed: false,
                sink,
            })),
        }
    }

    fn push(&self, block: SummaryBlock) {
        let mut inner = self.inner.lock().unwrap();
        if inner.closed {
            return;
        }
        inner.blocks.push(block);
    }

    pub fn add_success_block(
        &self,
        category: &str,
        description: &str,
        status_code: &str,
        message: &str,
    ) -> &Self {
        self.push(SummaryBlock {
            category: category.to_string(),
            description: description.to_string(),
            status_code: status_code.to_string(),
            message: message.to_string(),
            outcome: BlockOutcome::Success,
        });
        self
    }

    pub fn add_failure_block(
        &self,
        category: &str,
        description: &str,
        status_code: &str,
        message: &str,
    ) -> &Self {
        self.push(SummaryBlock {
            category: category.to_string(),
            description: description.to_string(),
            status_code: status_code.to_string(),
            message: message.to_string(),
            outcome: BlockOutcome::Failure,
        });
        self
    }

    /// Emits the accumulated blocks as one aggregate record and closes the
    /// recorder. With zero blocks nothing is emitted; the recorder is
    /// closed either way. A second call is a no-op.
    pub fn flush(&self) {
        let mut inner = self.inner.lock().unwrap();
        if inner.closed {
            return;
        }
        inner.closed = true;

        if inner.blocks.is_empty() {
            return;
        }

        let blocks = serde_json::to_value(&inner.blocks).unwrap_or(Value::Null);
        let record = json!({
            "type": "summary",
            "service": inner.service,
            "transaction_id": inner.transaction_id,
            "blocks": blocks,
        });
        inner.sink.write(record);
    }

    pub fn is_closed(&self) -> bool {
        self.inner.lock().unwrap().closed
    }
}
