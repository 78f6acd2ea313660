//! Per-call audit trail. Sinks are fire-and-forget: a failing sink is
//! logged and never affects the caller's envelope.

mod redact;

use std::sync::Arc;

use async_trait::async_trait;

use corrector_store::AuditStore;

pub use corrector_store::AuditRecord;
pub use redact::{redact_headers, secret_header_names, REDACTED};

#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn record(&self, record: AuditRecord);
}

pub struct NoopAuditSink;

#[async_trait]
impl AuditSink for NoopAuditSink {
    async fn record(&self, _record: AuditRecord) {}
}

/// Emits each record as a structured `tracing` event.
pub struct TracingAuditSink;

#[async_trait]
impl AuditSink for TracingAuditSink {
    async fn record(&self, r: AuditRecord) {
        tracing::info!(
            target: "corrector::audit",
            execution_id = %r.execution_id,
            mapping_key = %r.mapping_key,
            operation = r.operation.as_deref(),
            success = r.success,
            status = r.status_code,
            duration_ms = r.duration_ms,
            "correction handled"
        );
    }
}

pub struct StoreAuditSink {
    store: Arc<dyn AuditStore>,
}

impl StoreAuditSink {
    pub fn new(store: Arc<dyn AuditStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl AuditSink for StoreAuditSink {
    async fn record(&self, record: AuditRecord) {
        if let Err(e) = self.store.append(&record).await {
            tracing::warn!(execution_id = %record.execution_id, error = %e, "failed to persist audit record");
        }
    }
}

#[derive(Default)]
pub struct CompositeAuditSink {
    sinks: Vec<Arc<dyn AuditSink>>,
}

impl CompositeAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, sink: Arc<dyn AuditSink>) {
        self.sinks.push(sink);
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

#[async_trait]
impl AuditSink for CompositeAuditSink {
    async fn record(&self, record: AuditRecord) {
        for sink in &self.sinks {
            sink.record(record.clone()).await;
        }
    }
}
