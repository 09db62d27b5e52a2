//! Decision Differ — pure field-level diff of a decision snapshot against
//! a partial request.
//!
//! An unspecified request field is sticky: the effective value is the
//! previous one and no change is recorded. Changes always come out in the
//! fixed order state, justification, response, details, suppression — the
//! narration ordering downstream consumers rely on.

use crate::types::{DecisionRequest, DecisionSnapshot, DecisionState, Justification, VendorResponse};

/// A single detected change. The suppression toggle is kept distinct from
/// the four semantic fields because it renders without endpoints.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Change {
    State { from: DecisionState, to: DecisionState },
    Justification { from: Justification, to: Justification },
    Response { from: VendorResponse, to: VendorResponse },
    /// Only the new value is narrated, never a from/to pair.
    Details { to: String },
    /// `unsuppressed` is true on the suppressed → not-suppressed edge.
    Suppression { unsuppressed: bool },
}

/// Outcome of diffing: the snapshot to persist plus the ordered changes.
#[derive(Debug, Clone)]
pub struct Diff {
    pub effective: DecisionSnapshot,
    pub changes: Vec<Change>,
    /// True when there was no previous record for the subject.
    pub created: bool,
}

impl Diff {
    /// Whether the primary state changed — the one signal that gates
    /// notification emission.
    pub fn state_changed(&self) -> bool {
        self.changes.iter().any(|c| matches!(c, Change::State { .. }))
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

/// Compare a previous snapshot (absent = all defaults) against a request.
pub fn diff(previous: Option<&DecisionSnapshot>, request: &DecisionRequest) -> Diff {
    let created = previous.is_none();
    let baseline = DecisionSnapshot::default();
    let previous = previous.unwrap_or(&baseline);

    let mut effective = previous.clone();
    let mut changes = Vec::new();

    if let Some(state) = request.state {
        if state != previous.state {
            changes.push(Change::State { from: previous.state, to: state });
            effective.state = state;
        }
    }

    if let Some(justification) = request.justification {
        if justification != previous.justification {
            changes.push(Change::Justification {
                from: previous.justification,
                to: justification,
            });
            effective.justification = justification;
        }
    }

    if let Some(response) = request.response {
        if response != previous.response {
            changes.push(Change::Response { from: previous.response, to: response });
            effective.response = response;
        }
    }

    if let Some(details) = request.details.as_deref() {
        if previous.details.as_deref() != Some(details) {
            changes.push(Change::Details { to: details.to_string() });
            effective.details = Some(details.to_string());
        }
    }

    if let Some(suppressed) = request.suppressed {
        if suppressed != previous.suppressed {
            changes.push(Change::Suppression { unsuppressed: !suppressed });
            effective.suppressed = suppressed;
        }
    }

    Diff { effective, changes, created }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_request() -> DecisionRequest {
        DecisionRequest {
            state: Some(DecisionState::NotAffected),
            justification: Some(Justification::CodeNotReachable),
            response: Some(VendorResponse::WillNotFix),
            details: Some("Analysis details here".into()),
            suppressed: Some(true),
            comment: Some("Analysis comment here".into()),
        }
    }

    #[test]
    fn test_absent_previous_diffs_against_defaults() {
        let diff = diff(None, &full_request());
        assert!(diff.created);
        assert_eq!(diff.changes.len(), 5);
        assert!(diff.state_changed());
        assert_eq!(diff.effective.state, DecisionState::NotAffected);
        assert!(diff.effective.suppressed);
    }

    #[test]
    fn test_unspecified_fields_are_sticky() {
        let previous = DecisionSnapshot {
            state: DecisionState::NotAffected,
            justification: Justification::CodeNotReachable,
            response: VendorResponse::WillNotFix,
            details: Some("Analysis details here".into()),
            suppressed: true,
        };
        let request = DecisionRequest {
            state: Some(DecisionState::Exploitable),
            ..Default::default()
        };
        let diff = diff(Some(&previous), &request);
        assert_eq!(diff.changes.len(), 1);
        assert_eq!(
            diff.changes[0],
            Change::State { from: DecisionState::NotAffected, to: DecisionState::Exploitable }
        );
        // Everything unspecified keeps its previous value
        assert_eq!(diff.effective.justification, Justification::CodeNotReachable);
        assert_eq!(diff.effective.response, VendorResponse::WillNotFix);
        assert_eq!(diff.effective.details.as_deref(), Some("Analysis details here"));
        assert!(diff.effective.suppressed);
    }

    #[test]
    fn test_identical_request_produces_no_changes() {
        let previous = DecisionSnapshot {
            state: DecisionState::NotAffected,
            justification: Justification::CodeNotReachable,
            response: VendorResponse::WillNotFix,
            details: Some("Analysis details here".into()),
            suppressed: true,
        };
        let diff = diff(Some(&previous), &full_request());
        assert!(diff.is_empty());
        assert!(!diff.state_changed());
        assert_eq!(diff.effective, previous);
    }

    #[test]
    fn test_change_order_is_fixed() {
        let previous = DecisionSnapshot {
            state: DecisionState::NotAffected,
            justification: Justification::CodeNotReachable,
            response: VendorResponse::WillNotFix,
            details: Some("Analysis details here".into()),
            suppressed: true,
        };
        let request = DecisionRequest {
            // Declared "out of order" on purpose; struct fields carry no
            // request ordering anyway.
            suppressed: Some(false),
            details: Some("New analysis details here".into()),
            response: Some(VendorResponse::Update),
            justification: Some(Justification::NotSet),
            state: Some(DecisionState::Exploitable),
            comment: None,
        };
        let diff = diff(Some(&previous), &request);
        assert_eq!(diff.changes.len(), 5);
        assert!(matches!(diff.changes[0], Change::State { .. }));
        assert!(matches!(diff.changes[1], Change::Justification { .. }));
        assert!(matches!(diff.changes[2], Change::Response { .. }));
        assert!(matches!(diff.changes[3], Change::Details { .. }));
        assert_eq!(diff.changes[4], Change::Suppression { unsuppressed: true });
    }

    #[test]
    fn test_suppression_edge_direction() {
        let previous = DecisionSnapshot { suppressed: false, ..Default::default() };
        let request = DecisionRequest { suppressed: Some(true), ..Default::default() };
        let diff_on = diff(Some(&previous), &request);
        assert_eq!(diff_on.changes, vec![Change::Suppression { unsuppressed: false }]);

        let previous = DecisionSnapshot { suppressed: true, ..Default::default() };
        let request = DecisionRequest { suppressed: Some(false), ..Default::default() };
        let diff_off = diff(Some(&previous), &request);
        assert_eq!(diff_off.changes, vec![Change::Suppression { unsuppressed: true }]);
        assert!(!diff_off.state_changed());
    }

    #[test]
    fn test_details_only_change_is_not_a_state_change() {
        let previous = DecisionSnapshot {
            details: Some("old".into()),
            ..Default::default()
        };
        let request = DecisionRequest { details: Some("new".into()), ..Default::default() };
        let diff = diff(Some(&previous), &request);
        assert_eq!(diff.changes, vec![Change::Details { to: "new".into() }]);
        assert!(!diff.state_changed());
    }

    #[test]
    fn test_not_set_is_a_real_value_not_absence() {
        let previous = DecisionSnapshot {
            justification: Justification::CodeNotReachable,
            ..Default::default()
        };
        // Explicitly clearing back to NOT_SET is a change...
        let request = DecisionRequest {
            justification: Some(Justification::NotSet),
            ..Default::default()
        };
        let diff_clear = diff(Some(&previous), &request);
        assert_eq!(
            diff_clear.changes,
            vec![Change::Justification {
                from: Justification::CodeNotReachable,
                to: Justification::NotSet,
            }]
        );
        // ...while omitting the field entirely is not.
        let diff_omit = diff(Some(&previous), &DecisionRequest::default());
        assert!(diff_omit.is_empty());
    }
}
