//! Detail trace recorder.
//!
//! One append-only step log per request: opened when the request enters,
//! appended to by every component that touches the request, flushed as a
//! single structured record on `end()`. Entries preserve insertion order.
//!
//! Lifecycle: open -> append* -> end. `end()` flushes exactly once; after
//! that the record is closed and further appends are silently ignored, so
//! the at-most-one-flush guarantee holds structurally even for call sites
//! that end more than once.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};

use crate::context::CorrelationContext;
use crate::sink::LogSink;

/// One step taken while servicing a request.
#[derive(Debug, Clone, Serialize)]
pub struct TraceEntry {
    pub component: String,
    pub operation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
    pub timestamp: DateTime<Utc>,
}

struct DetailInner {
    service: String,
    transaction_id: String,
    entries: Vec<TraceEntry>,
    closed: bool,
    sink: Arc<dyn LogSink>,
}

/// Per-request detail trace, cheaply cloneable so the auth gate, the
/// pipeline and the handler all append to the same record. Methods return
/// `&Self` for fluent composition.
#[derive(Clone)]
pub struct DetailLog {
    inner: Arc<Mutex<DetailInner>>,
}

impl DetailLog {
    /// Opens a record scoped to one request.
    pub fn open(service: &str, context: &CorrelationContext, sink: Arc<dyn LogSink>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(DetailInner {
                service: service.to_string(),
                transaction_id: context.transaction_id.clone(),
                entries: Vec::new(),
                closed: false,
                sink,
            })),
        }
    }

    fn push(&self, entry: TraceEntry) {
        let mut inner = self.inner.lock().unwrap();
        if inner.closed {
            return;
        }
        inner.entries.push(entry);
    }

    /// Appends a plain step entry.
    pub fn add_detail(&self, component: &str, operation: &str, message: Option<&str>) -> &Self {
        self.push(TraceEntry {
            component: component.to_string(),
            operation: operation.to_string(),
            message: message.map(str::to_string),
            payload: None,
            timestamp: Utc::now(),
        });
        self
    }

    /// Appends an entry carrying an outgoing payload for audit.
    pub fn add_response_body(&self, component: &str, operation: &str, body: Value) -> &Self {
        self.push(TraceEntry {
            component: component.to_string(),
            operation: operation.to_string(),
            message: None,
            payload: Some(body),
            timestamp: Utc::now(),
        });
        self
    }

    /// Appends an entry carrying error diagnostics.
    pub fn add_response_error(&self, component: &str, label: &str, diagnostics: Value) -> &Self {
        self.push(TraceEntry {
            component: component.to_string(),
            operation: label.to_string(),
            message: None,
            payload: Some(diagnostics),
            timestamp: Utc::now(),
        });
        self
    }

    /// Finalizes the record: writes the full ordered entry sequence as one
    /// structured record keyed by transaction id, then closes it. A second
    /// call is a no-op.
    pub fn end(&self) {
        let mut inner = self.inner.lock().unwrap();
        if inner.closed {
            return;
        }
        inner.closed = true;

        let entries = serde_json::to_value(&inner.entries).unwrap_or(Value::Null);
        let record = json!({
            "type": "detail",
            "service": inner.service,
            "transaction_id": inner.transaction_id,
            "entries": entries,
        });
        inner.sink.write(record);
    }

    pub fn is_closed(&self) -> bool {
        self.inner.lock().unwrap().closed
    }

    /// Ordered `(component, operation)` pairs accumulated so far.
    pub fn steps(&self) -> Vec<(String, String)> {
        self.inner
            .lock()
            .unwrap()
            .entries
            .iter()
            .map(|entry| (entry.component.clone(), entry.operation.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::MemorySink;

    fn context() -> CorrelationContext {
        CorrelationContext {
            transaction_id: "txn-1".to_string(),
            bearer_token: String::new(),
        }
    }

    #[test]
    fn test_entries_preserve_call_order() {
        let sink = MemorySink::new();
        let detail = DetailLog::open("test-service", &context(), sink.clone());

        detail.add_detail("AuthService", "verifyToken", None);
        detail.add_response_body("ProductService", "insertProduct", json!({"id": 1}));
        detail.add_response_error("HttpCaller", "attempt", json!({"status": 503}));
        detail.end();

        let records = sink.records();
        assert_eq!(records.len(), 1);

        let record = &records[0];
        assert_eq!(record["type"], "detail");
        assert_eq!(record["transaction_id"], "txn-1");

        let entries = record["entries"].as_array().unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0]["component"], "AuthService");
        assert_eq!(entries[0]["operation"], "verifyToken");
        assert_eq!(entries[1]["component"], "ProductService");
        assert_eq!(entries[1]["payload"], json!({"id": 1}));
        assert_eq!(entries[2]["component"], "HttpCaller");
    }

    #[test]
    fn test_append_after_end_is_ignored() {
        let sink = MemorySink::new();
        let detail = DetailLog::open("test-service", &context(), sink.clone());

        detail.add_detail("A", "first", None);
        detail.end();
        detail.add_detail("B", "late", None);

        let records = sink.records();
        let entries = records[0]["entries"].as_array().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0]["operation"], "first");
    }

    #[test]
    fn test_end_flushes_exactly_once() {
        let sink = MemorySink::new();
        let detail = DetailLog::open("test-service", &context(), sink.clone());

        detail.add_detail("A", "step", None);
        detail.end();
        detail.end();

        assert_eq!(sink.records().len(), 1);
        assert!(detail.is_closed());
    }

    #[test]
    fn test_unended_record_is_never_flushed() {
        let sink = MemorySink::new();
        let detail = DetailLog::open("test-service", &context(), sink.clone());
        detail.add_detail("A", "step", None);

        assert!(sink.records().is_empty());
        assert!(!detail.is_closed());
    }

    #[test]
    fn test_clones_share_the_same_record() {
        let sink = MemorySink::new();
        let detail = DetailLog::open("test-service", &context(), sink.clone());
        let other = detail.clone();

        detail.add_detail("Gate", "verify", None);
        other.add_detail("Handler", "create", None);
        detail.end();

        let entries_len = sink.records()[0]["entries"].as_array().unwrap().len();
        assert_eq!(entries_len, 2);
    }
}
