//! Audit Manager — the facade resource handlers call.
//!
//! Wraps the reconciler and owns the notification gate: exactly one
//! audit-change notification goes out per reconciliation whose primary
//! state actually changed, titled by the new state. Suppression-only,
//! details-only, and comment-only requests stay silent.

use std::sync::Arc;
use tracing::info;

use vigil_core::notify::{
    Notification, NotificationBus, NotificationGroup, NotificationLevel, NotificationScope,
};
use vigil_core::{VigilConfig, VigilResult};

use crate::reconciler::{DecisionReconciler, Reconciliation};
use crate::store::{AuditStore, MemoryAuditStore};
use crate::types::{Actor, DecisionRequest, DecisionState, DecisionSubject, SubjectKind};

pub const FINDING_AUDIT_BODY: &str =
    "An analysis decision was made to a finding affecting a project";
// Wording preserved as emitted historically; consumers match on it.
pub const VIOLATION_AUDIT_BODY: &str =
    "An violation analysis decision was made to a policy violation affecting a project";

/// Title for an audit-change notification, keyed by the new primary state.
pub fn audit_change_title(kind: SubjectKind, state: DecisionState) -> String {
    let prefix = match kind {
        SubjectKind::Finding => "Analysis Decision",
        SubjectKind::Violation => "Violation Analysis Decision",
    };
    let state = match state {
        DecisionState::NotSet => "Not Set",
        DecisionState::InTriage => "In Triage",
        DecisionState::Exploitable => "Exploitable",
        DecisionState::NotAffected => "Not Affected",
        DecisionState::FalsePositive => "False Positive",
        DecisionState::Resolved => "Resolved",
        DecisionState::Approved => "Approved",
        DecisionState::Rejected => "Rejected",
    };
    format!("{}: {}", prefix, state)
}

pub struct AuditManager {
    reconciler: DecisionReconciler,
    bus: Arc<NotificationBus>,
    notifications_enabled: bool,
}

impl AuditManager {
    pub fn new(
        config: &VigilConfig,
        store: Arc<dyn AuditStore>,
        bus: Arc<NotificationBus>,
    ) -> Self {
        Self {
            reconciler: DecisionReconciler::new(store)
                .with_max_comment_chars(config.audit.max_comment_chars),
            bus,
            notifications_enabled: config.audit.notifications_enabled,
        }
    }

    /// Convenience: back the manager with an in-memory store sized from
    /// config.
    pub fn in_memory(config: &VigilConfig, bus: Arc<NotificationBus>) -> Self {
        Self::new(
            config,
            Arc::new(MemoryAuditStore::new(config.audit.max_records)),
            bus,
        )
    }

    /// Record a decision: reconcile, then publish one notification iff the
    /// primary state changed.
    pub fn record_decision(
        &self,
        subject: &DecisionSubject,
        request: &DecisionRequest,
        actor: &Actor,
    ) -> VigilResult<Reconciliation> {
        let outcome = self.reconciler.reconcile(subject, request, actor)?;

        if outcome.state_changed && self.notifications_enabled {
            let state = outcome.record.snapshot.state;
            let project = subject.project();
            let title = if project.is_empty() {
                audit_change_title(subject.kind(), state)
            } else {
                format!(
                    "{} on Project: {}",
                    audit_change_title(subject.kind(), state),
                    project
                )
            };
            let content = match subject.kind() {
                SubjectKind::Finding => FINDING_AUDIT_BODY,
                SubjectKind::Violation => VIOLATION_AUDIT_BODY,
            };
            let group = if project.is_empty() {
                NotificationGroup::GlobalAuditChange
            } else {
                NotificationGroup::ProjectAuditChange
            };
            self.bus.publish(Notification {
                id: 0,
                timestamp_ms: 0,
                scope: NotificationScope::Portfolio,
                group,
                level: NotificationLevel::Informational,
                title,
                content: content.into(),
                project: (!project.is_empty()).then(|| project.to_string()),
            });
            info!(subject = %subject.key(), state = %state, "Audit decision notification published");
        }

        Ok(outcome)
    }

    pub fn reconciler(&self) -> &DecisionReconciler {
        &self.reconciler
    }
}
