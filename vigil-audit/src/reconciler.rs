//! Decision Reconciler — orchestrates store, differ, and narrator for one
//! decision request.
//!
//! Each invocation is a read-modify-write on a single subject, serialized
//! by a per-subject lock so concurrent requests cannot lose comments or
//! snapshot writes. A store failure propagates unchanged; either the full
//! persist lands or nothing does.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

use vigil_core::VigilResult;

use crate::differ::diff;
use crate::narrator::narrate;
use crate::store::AuditStore;
use crate::types::{Actor, AuditComment, AuditRecord, DecisionRequest, DecisionSubject};

/// Result of a reconciliation: the stored record and whether the primary
/// state actually changed (the notification gate).
#[derive(Debug, Clone)]
pub struct Reconciliation {
    pub record: AuditRecord,
    pub state_changed: bool,
}

pub struct DecisionReconciler {
    store: Arc<dyn AuditStore>,
    /// Per-subject mutual exclusion for the read-modify-write.
    subject_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
    /// Longest comment the trail will accept; oversized free text is
    /// truncated, never dropped.
    max_comment_chars: usize,
    total_reconciled: AtomicU64,
    total_noops: AtomicU64,
}

impl DecisionReconciler {
    pub fn new(store: Arc<dyn AuditStore>) -> Self {
        Self {
            store,
            subject_locks: Mutex::new(HashMap::new()),
            max_comment_chars: 16_384,
            total_reconciled: AtomicU64::new(0),
            total_noops: AtomicU64::new(0),
        }
    }

    pub fn with_max_comment_chars(mut self, max: usize) -> Self {
        self.max_comment_chars = max;
        self
    }

    /// Apply a decision request to a subject's audit record, creating the
    /// record on first contact. Appends one comment per narrated change
    /// plus the free-text comment, authored by `actor`.
    ///
    /// An identical request with no free-text comment is a no-op: zero
    /// comments appended, zero snapshot mutations, `state_changed = false`.
    pub fn reconcile(
        &self,
        subject: &DecisionSubject,
        request: &DecisionRequest,
        actor: &Actor,
    ) -> VigilResult<Reconciliation> {
        let lock = self.subject_lock(subject);
        let _guard = lock.lock();

        let previous = self.store.get(subject)?;
        let diff = diff(previous.as_ref().map(|r| &r.snapshot), request);
        let comment = request.trimmed_comment();
        let lines = narrate(subject.kind(), &diff, comment);
        let state_changed = diff.state_changed();

        if diff.is_empty() && comment.is_none() {
            self.total_noops.fetch_add(1, Ordering::Relaxed);
            debug!(subject = %subject.key(), "Reconcile no-op");
            let record = match previous {
                Some(record) => record,
                // First contact with an empty request still materializes the
                // record so the subject has an audit home from now on.
                None => self.store.save(AuditRecord::new(subject.clone()))?,
            };
            return Ok(Reconciliation { record, state_changed: false });
        }

        let mut record = previous.unwrap_or_else(|| AuditRecord::new(subject.clone()));
        record.snapshot = diff.effective.clone();

        let now = chrono::Utc::now().timestamp_millis();
        let author = actor.display_name().map(str::to_string);
        for line in &lines {
            record.comments.push(AuditComment {
                text: self.clamp(line),
                author: author.clone(),
                timestamp: now,
            });
        }

        let record = self.store.save(record)?;
        self.total_reconciled.fetch_add(1, Ordering::Relaxed);
        debug!(
            subject = %subject.key(),
            comments = lines.len(),
            state_changed = state_changed,
            "Decision reconciled"
        );

        Ok(Reconciliation { record, state_changed })
    }

    // ── Stats ────────────────────────────────────────────────────────────

    pub fn total_reconciled(&self) -> u64 { self.total_reconciled.load(Ordering::Relaxed) }
    pub fn total_noops(&self) -> u64 { self.total_noops.load(Ordering::Relaxed) }

    // ── Internal ─────────────────────────────────────────────────────────

    fn subject_lock(&self, subject: &DecisionSubject) -> Arc<Mutex<()>> {
        let mut locks = self.subject_locks.lock();
        locks.entry(subject.key()).or_default().clone()
    }

    fn clamp(&self, text: &str) -> String {
        if text.chars().count() <= self.max_comment_chars {
            text.to_string()
        } else {
            text.chars().take(self.max_comment_chars).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryAuditStore;
    use crate::types::{DecisionState, DecisionSnapshot, Justification, VendorResponse};

    fn reconciler() -> DecisionReconciler {
        DecisionReconciler::new(Arc::new(MemoryAuditStore::default()))
    }

    #[test]
    fn test_creation_with_empty_request_persists_defaults() {
        let reconciler = reconciler();
        let subject = DecisionSubject::finding("proj", "comp", "CVE-2024-1");
        let outcome = reconciler
            .reconcile(&subject, &DecisionRequest::default(), &Actor::api_key())
            .unwrap();

        assert!(!outcome.state_changed);
        assert_eq!(outcome.record.snapshot, DecisionSnapshot::default());
        assert!(outcome.record.comments.is_empty());
        assert_eq!(reconciler.total_noops(), 1);
    }

    #[test]
    fn test_first_decision_creates_and_narrates() {
        let reconciler = reconciler();
        let subject = DecisionSubject::finding("proj", "comp", "CVE-2024-1");
        let request = DecisionRequest {
            state: Some(DecisionState::NotAffected),
            justification: Some(Justification::CodeNotReachable),
            response: Some(VendorResponse::WillNotFix),
            details: Some("Analysis details here".into()),
            suppressed: Some(true),
            comment: Some("Analysis comment here".into()),
        };
        let outcome = reconciler
            .reconcile(&subject, &request, &Actor::user("jane"))
            .unwrap();

        assert!(outcome.state_changed);
        assert!(outcome.record.snapshot.suppressed);
        assert_eq!(outcome.record.comments.len(), 2);
        assert_eq!(outcome.record.comments[0].text, "Analysis: NOT_SET → NOT_AFFECTED");
        assert_eq!(outcome.record.comments[1].text, "Analysis comment here");
        assert_eq!(outcome.record.comments[0].author.as_deref(), Some("jane"));
        assert!(outcome.record.comments[0].timestamp > 0);
    }

    #[test]
    fn test_repeat_request_is_idempotent() {
        let reconciler = reconciler();
        let subject = DecisionSubject::finding("proj", "comp", "CVE-2024-1");
        let request = DecisionRequest {
            state: Some(DecisionState::NotAffected),
            justification: Some(Justification::CodeNotReachable),
            response: Some(VendorResponse::WillNotFix),
            details: Some("Analysis details here".into()),
            suppressed: Some(true),
            comment: None,
        };
        let first = reconciler.reconcile(&subject, &request, &Actor::user("jane")).unwrap();
        let second = reconciler.reconcile(&subject, &request, &Actor::user("jane")).unwrap();

        assert!(first.state_changed);
        assert!(!second.state_changed);
        assert_eq!(second.record.comments, first.record.comments);
        assert_eq!(second.record.snapshot, first.record.snapshot);
        assert_eq!(reconciler.total_noops(), 1);
    }

    #[test]
    fn test_api_key_comments_have_no_author() {
        let reconciler = reconciler();
        let subject = DecisionSubject::violation("proj", "comp", "pv-1");
        let request = DecisionRequest {
            state: Some(DecisionState::Approved),
            comment: Some("Some comment".into()),
            ..Default::default()
        };
        let outcome = reconciler.reconcile(&subject, &request, &Actor::api_key()).unwrap();
        assert_eq!(outcome.record.comments.len(), 2);
        assert!(outcome.record.comments.iter().all(|c| c.author.is_none()));
    }

    #[test]
    fn test_comment_only_request_appends_but_reports_no_state_change() {
        let reconciler = reconciler();
        let subject = DecisionSubject::finding("proj", "comp", "CVE-2024-2");
        reconciler
            .reconcile(
                &subject,
                &DecisionRequest {
                    state: Some(DecisionState::InTriage),
                    ..Default::default()
                },
                &Actor::user("jane"),
            )
            .unwrap();

        let outcome = reconciler
            .reconcile(
                &subject,
                &DecisionRequest { comment: Some("still looking".into()), ..Default::default() },
                &Actor::user("jane"),
            )
            .unwrap();
        assert!(!outcome.state_changed);
        assert_eq!(outcome.record.comments.last().unwrap().text, "still looking");
    }

    #[test]
    fn test_oversized_free_text_is_clamped() {
        let store = Arc::new(MemoryAuditStore::default());
        let reconciler = DecisionReconciler::new(store).with_max_comment_chars(10);
        let subject = DecisionSubject::finding("proj", "comp", "CVE-2024-3");
        let outcome = reconciler
            .reconcile(
                &subject,
                &DecisionRequest {
                    comment: Some("0123456789 overflowing".into()),
                    ..Default::default()
                },
                &Actor::api_key(),
            )
            .unwrap();
        assert_eq!(outcome.record.comments.len(), 1);
        assert_eq!(outcome.record.comments[0].text.chars().count(), 10);
    }

    #[test]
    fn test_store_failure_leaves_record_unchanged() {
        let store = Arc::new(MemoryAuditStore::new(1));
        let reconciler = DecisionReconciler::new(store.clone());
        let first = DecisionSubject::finding("proj", "comp-1", "CVE-2024-1");
        reconciler
            .reconcile(
                &first,
                &DecisionRequest {
                    state: Some(DecisionState::Exploitable),
                    ..Default::default()
                },
                &Actor::api_key(),
            )
            .unwrap();

        // Second subject overflows the store; the error surfaces and no
        // record is left behind.
        let second = DecisionSubject::finding("proj", "comp-2", "CVE-2024-1");
        let err = reconciler.reconcile(
            &second,
            &DecisionRequest { state: Some(DecisionState::Exploitable), ..Default::default() },
            &Actor::api_key(),
        );
        assert!(err.is_err());
        assert!(store.get(&second).unwrap().is_none());
    }
}
