//! # Vigil Audit — decision audit engine
//!
//! Records, diffs, and narrates the state transitions of analysis
//! decisions on findings (component + vulnerability) and policy violations
//! (component + policy violation):
//! - **types**: decision subjects, snapshots, partial requests, the
//!   append-only comment log
//! - **differ**: field-level diff with sticky unspecified fields and a
//!   fixed change ordering
//! - **narrator**: byte-exact comment rendering per subject kind
//! - **store**: the audit record storage contract + in-memory store
//! - **reconciler**: per-subject read-modify-write orchestration
//! - **manager**: facade adding gated audit-change notifications

pub mod differ;
pub mod manager;
pub mod narrator;
pub mod reconciler;
pub mod store;
pub mod types;

pub use differ::{diff, Change, Diff};
pub use manager::{audit_change_title, AuditManager};
pub use narrator::narrate;
pub use reconciler::{DecisionReconciler, Reconciliation};
pub use store::{AuditStore, MemoryAuditStore};
pub use types::{
    Actor, AuditComment, AuditRecord, DecisionRequest, DecisionSnapshot, DecisionState,
    DecisionSubject, Justification, SubjectKind, VendorResponse,
};
