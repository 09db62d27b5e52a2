//! Shared types for the decision audit engine.
//!
//! The stored snapshot always carries concrete enum values (with a
//! `NOT_SET` sentinel), while requests are partial: an unspecified field
//! means "no change requested", never "set to NOT_SET". Comment text is a
//! contract other systems parse, so all enums render their symbolic names.

use std::fmt;

/// The central verdict on a decision subject. Finding subjects use the
/// triage states; violation subjects use `Approved`/`Rejected`. Nothing
/// enforces the split — any state may follow any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DecisionState {
    NotSet,
    InTriage,
    Exploitable,
    NotAffected,
    FalsePositive,
    Resolved,
    Approved,
    Rejected,
}

impl fmt::Display for DecisionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NotSet => "NOT_SET",
            Self::InTriage => "IN_TRIAGE",
            Self::Exploitable => "EXPLOITABLE",
            Self::NotAffected => "NOT_AFFECTED",
            Self::FalsePositive => "FALSE_POSITIVE",
            Self::Resolved => "RESOLVED",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
        };
        f.write_str(name)
    }
}

/// Why a finding is judged not exploitable. Meaningful for finding
/// subjects only; violations stay at `NotSet`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Justification {
    NotSet,
    CodeNotPresent,
    CodeNotReachable,
    RequiresConfiguration,
    RequiresDependency,
    RequiresEnvironment,
    ProtectedByCompiler,
    ProtectedAtRuntime,
    ProtectedAtPerimeter,
    ProtectedByMitigatingControl,
}

impl fmt::Display for Justification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NotSet => "NOT_SET",
            Self::CodeNotPresent => "CODE_NOT_PRESENT",
            Self::CodeNotReachable => "CODE_NOT_REACHABLE",
            Self::RequiresConfiguration => "REQUIRES_CONFIGURATION",
            Self::RequiresDependency => "REQUIRES_DEPENDENCY",
            Self::RequiresEnvironment => "REQUIRES_ENVIRONMENT",
            Self::ProtectedByCompiler => "PROTECTED_BY_COMPILER",
            Self::ProtectedAtRuntime => "PROTECTED_AT_RUNTIME",
            Self::ProtectedAtPerimeter => "PROTECTED_AT_PERIMETER",
            Self::ProtectedByMitigatingControl => "PROTECTED_BY_MITIGATING_CONTROL",
        };
        f.write_str(name)
    }
}

/// What the upstream vendor said about a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VendorResponse {
    NotSet,
    CanNotFix,
    WillNotFix,
    Update,
    Rollback,
    WorkaroundAvailable,
}

impl fmt::Display for VendorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NotSet => "NOT_SET",
            Self::CanNotFix => "CAN_NOT_FIX",
            Self::WillNotFix => "WILL_NOT_FIX",
            Self::Update => "UPDATE",
            Self::Rollback => "ROLLBACK",
            Self::WorkaroundAvailable => "WORKAROUND_AVAILABLE",
        };
        f.write_str(name)
    }
}

/// Which family a subject belongs to — selects the narration profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum SubjectKind {
    Finding,
    Violation,
}

/// What is being judged: a (component, vulnerability) finding or a
/// (component, policy-violation) pair. Immutable once the audit record
/// exists. Identifiers are opaque strings resolved by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum DecisionSubject {
    Finding {
        project: String,
        component: String,
        vulnerability: String,
    },
    Violation {
        project: String,
        component: String,
        violation: String,
    },
}

impl DecisionSubject {
    pub fn finding(
        project: impl Into<String>,
        component: impl Into<String>,
        vulnerability: impl Into<String>,
    ) -> Self {
        Self::Finding {
            project: project.into(),
            component: component.into(),
            vulnerability: vulnerability.into(),
        }
    }

    pub fn violation(
        project: impl Into<String>,
        component: impl Into<String>,
        violation: impl Into<String>,
    ) -> Self {
        Self::Violation {
            project: project.into(),
            component: component.into(),
            violation: violation.into(),
        }
    }

    pub fn kind(&self) -> SubjectKind {
        match self {
            Self::Finding { .. } => SubjectKind::Finding,
            Self::Violation { .. } => SubjectKind::Violation,
        }
    }

    pub fn project(&self) -> &str {
        match self {
            Self::Finding { project, .. } | Self::Violation { project, .. } => project,
        }
    }

    /// Stable store key. One audit record exists per key.
    pub fn key(&self) -> String {
        match self {
            Self::Finding { component, vulnerability, .. } => {
                format!("finding:{}:{}", component, vulnerability)
            }
            Self::Violation { component, violation, .. } => {
                format!("violation:{}:{}", component, violation)
            }
        }
    }
}

/// The current judgment on a subject. Every field is always populated;
/// `NOT_SET`/`false` are the creation defaults.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DecisionSnapshot {
    pub state: DecisionState,
    pub justification: Justification,
    pub response: VendorResponse,
    pub details: Option<String>,
    pub suppressed: bool,
}

impl Default for DecisionSnapshot {
    fn default() -> Self {
        Self {
            state: DecisionState::NotSet,
            justification: Justification::NotSet,
            response: VendorResponse::NotSet,
            details: None,
            suppressed: false,
        }
    }
}

/// A partial decision request. `None` means "leave unchanged"; the
/// free-text `comment` is appended to the audit trail but never diffed.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct DecisionRequest {
    pub state: Option<DecisionState>,
    pub justification: Option<Justification>,
    pub response: Option<VendorResponse>,
    pub details: Option<String>,
    pub suppressed: Option<bool>,
    pub comment: Option<String>,
}

impl DecisionRequest {
    /// The free-text comment with whitespace collapsed: empty or
    /// whitespace-only comments count as absent.
    pub fn trimmed_comment(&self) -> Option<&str> {
        self.comment
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }
}

/// One append-only audit trail entry. `author` is absent when the acting
/// principal authenticated with a machine credential.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AuditComment {
    pub text: String,
    pub author: Option<String>,
    /// Epoch millis.
    pub timestamp: i64,
}

/// The durable snapshot + ordered comment log for one subject. Created
/// lazily on the first decision request; comments are never edited or
/// reordered after append.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct AuditRecord {
    pub subject: DecisionSubject,
    pub snapshot: DecisionSnapshot,
    pub comments: Vec<AuditComment>,
}

impl AuditRecord {
    pub fn new(subject: DecisionSubject) -> Self {
        Self {
            subject,
            snapshot: DecisionSnapshot::default(),
            comments: Vec::new(),
        }
    }
}

/// The acting principal, reduced to what comment authorship needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    display_name: Option<String>,
}

impl Actor {
    /// An interactively authenticated user; their display name is recorded
    /// on every comment they cause.
    pub fn user(display_name: impl Into<String>) -> Self {
        Self { display_name: Some(display_name.into()) }
    }

    /// A machine credential (api-key); comments carry no author.
    pub fn api_key() -> Self {
        Self { display_name: None }
    }

    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }
}
