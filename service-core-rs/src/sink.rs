//! Append-only structured log sink.
//!
//! Recorders flush one JSON object per record. The sink is the only
//! process-wide mutable collaborator in this crate, so implementations
//! must be safe to share across request tasks.

use std::sync::{Arc, Mutex};

use serde_json::Value;

/// Destination for flushed trace and summary records.
pub trait LogSink: Send + Sync {
    /// Appends one structured record. Implementations must not reorder
    /// records from a single caller.
    fn write(&self, record: Value);
}

/// Production sink: one JSON object per line on stdout, where the log
/// collector picks it up.
#[derive(Debug, Default)]
pub struct StdoutSink;

impl LogSink for StdoutSink {
    fn write(&self, record: Value) {
        println!("{}", record);
    }
}

/// In-memory sink used by tests to observe flushed records.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<Value>>,
}

impl MemorySink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Snapshot of everything written so far, in write order.
    pub fn records(&self) -> Vec<Value> {
        self.records.lock().unwrap().clone()
    }
}

impl LogSink for MemorySink {
    fn write(&self, record: Value) {
        self.records.lock().unwrap().push(record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_memory_sink_preserves_write_order() {
        let sink = MemorySink::new();
        sink.write(json!({"n": 1}));
        sink.write(json!({"n": 2}));

        let records = sink.records();
        assert_eq!(records, vec![json!({"n": 1}), json!({"n": 2})]);
    }
}
