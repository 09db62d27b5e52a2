//! Audit Store — durable home for audit records.
//!
//! The engine only sees the `AuditStore` trait; `save` must replace the
//! snapshot and comment log together or not at all. `MemoryAuditStore`
//! gets that atomicity for free by swapping whole records under one lock.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

use vigil_core::{VigilError, VigilResult};

use crate::types::{AuditRecord, DecisionSubject};

/// Storage contract for audit records, keyed by decision subject.
pub trait AuditStore: Send + Sync {
    /// Fetch the record for a subject, if one exists.
    fn get(&self, subject: &DecisionSubject) -> VigilResult<Option<AuditRecord>>;
    /// Persist a record atomically (snapshot + comments together) and
    /// return the stored form.
    fn save(&self, record: AuditRecord) -> VigilResult<AuditRecord>;
}

/// In-memory store: one record per subject key, bounded capacity.
pub struct MemoryAuditStore {
    records: RwLock<HashMap<String, AuditRecord>>,
    max_records: usize,
    total_reads: AtomicU64,
    total_writes: AtomicU64,
}

impl MemoryAuditStore {
    pub fn new(max_records: usize) -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            max_records,
            total_reads: AtomicU64::new(0),
            total_writes: AtomicU64::new(0),
        }
    }

    pub fn record_count(&self) -> usize {
        self.records.read().len()
    }

    pub fn total_reads(&self) -> u64 { self.total_reads.load(Ordering::Relaxed) }
    pub fn total_writes(&self) -> u64 { self.total_writes.load(Ordering::Relaxed) }
}

impl Default for MemoryAuditStore {
    fn default() -> Self {
        Self::new(100_000)
    }
}

impl AuditStore for MemoryAuditStore {
    fn get(&self, subject: &DecisionSubject) -> VigilResult<Option<AuditRecord>> {
        self.total_reads.fetch_add(1, Ordering::Relaxed);
        Ok(self.records.read().get(&subject.key()).cloned())
    }

    fn save(&self, record: AuditRecord) -> VigilResult<AuditRecord> {
        let key = record.subject.key();
        let mut records = self.records.write();
        if !records.contains_key(&key) && records.len() >= self.max_records {
            return Err(VigilError::StoreFailure(format!(
                "record capacity exhausted ({} records)",
                self.max_records
            )));
        }
        debug!(key = %key, comments = record.comments.len(), "Audit record saved");
        records.insert(key, record.clone());
        self.total_writes.fetch_add(1, Ordering::Relaxed);
        Ok(record)
    }
}
