//! Audit Narrator — renders detected changes into fixed-format comment
//! strings.
//!
//! The rendered text is part of the audit trail contract: downstream
//! systems parse it, so every format here is byte-exact. Violation
//! subjects use a simplified state-transition form with no `"Analysis: "`
//! prefix; every other rule is identical across subject kinds.

use crate::differ::{Change, Diff};
use crate::types::SubjectKind;

/// Render the changes of a diff, plus an optional free-text comment, into
/// the ordered list of comment strings to append.
///
/// On a freshly created record only the primary-state transition is
/// narrated; justification, response, and details set at creation are
/// stored silently. A creation request whose only change is
/// `suppressed = true` yields a single `"Suppressed"` comment. The
/// free-text comment always comes last, verbatim.
pub fn narrate(kind: SubjectKind, diff: &Diff, comment: Option<&str>) -> Vec<String> {
    let mut lines = Vec::new();

    if diff.created {
        narrate_creation(kind, diff, &mut lines);
    } else {
        for change in &diff.changes {
            lines.push(render_change(kind, change));
        }
    }

    if let Some(comment) = comment {
        lines.push(comment.to_string());
    }

    lines
}

fn narrate_creation(kind: SubjectKind, diff: &Diff, lines: &mut Vec<String>) {
    let state_change = diff.changes.iter().find(|c| matches!(c, Change::State { .. }));
    if let Some(change) = state_change {
        lines.push(render_change(kind, change));
        return;
    }
    // No state transition to announce; a suppressed-at-birth record still
    // gets its toggle on the trail.
    if diff
        .changes
        .iter()
        .any(|c| matches!(c, Change::Suppression { unsuppressed: false }))
    {
        lines.push("Suppressed".to_string());
    }
}

fn render_change(kind: SubjectKind, change: &Change) -> String {
    match change {
        Change::State { from, to } => match kind {
            SubjectKind::Finding => format!("Analysis: {} → {}", from, to),
            SubjectKind::Violation => format!("{} → {}", from, to),
        },
        Change::Justification { from, to } => format!("Justification: {} → {}", from, to),
        Change::Response { from, to } => format!("Vendor Response: {} → {}", from, to),
        Change::Details { to } => format!("Details: {}", to.trim()),
        Change::Suppression { unsuppressed: true } => "Unsuppressed".to_string(),
        Change::Suppression { unsuppressed: false } => "Suppressed".to_string(),
    }
}
