use serde::Serialize;

use crate::domain::{Issue, Status};
use crate::error::AppError;

/// A validated status change, ready to apply.
///
/// Every state can move to every other state, including Resolved back to Pending when the
/// submitted proof turns out to be wrong. Only the Resolved arm carries data, so a
/// `StatusChange` that exists is always applicable.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "status")]
pub enum StatusChange {
    Pending,
    #[serde(rename = "In Progress")]
    InProgress,
    Resolved {
        #[serde(rename = "proofPhoto")]
        proof_photo: String,
    },
}

impl StatusChange {
    /// Validate a raw `(status, proof)` request for `issue_id`.
    ///
    /// A proof that is empty after trimming counts as absent. A proof sent with a non-Resolved
    /// status is ignored.
    pub fn new(
        issue_id: i64,
        status: Status,
        proof_photo: Option<&str>,
    ) -> Result<Self, AppError> {
        match status {
            Status::Pending => Ok(StatusChange::Pending),
            Status::InProgress => Ok(StatusChange::InProgress),
            Status::Resolved => {
                let proof = proof_photo.map(str::trim).filter(|p| !p.is_empty());
                match proof {
                    Some(p) => Ok(StatusChange::Resolved {
                        proof_photo: p.to_string(),
                    }),
                    None => Err(AppError::proof_required(issue_id)),
                }
            }
        }
    }

    pub fn status(&self) -> Status {
        match self {
            StatusChange::Pending => Status::Pending,
            StatusChange::InProgress => Status::InProgress,
            StatusChange::Resolved { .. } => Status::Resolved,
        }
    }

    /// Copy of `issue` in the new state. Leaving Resolved clears the proof.
    pub fn apply(&self, issue: &Issue) -> Issue {
        let mut next = issue.clone();
        next.status = self.status();
        next.proof_photo = match self {
            StatusChange::Resolved { proof_photo } => Some(proof_photo.clone()),
            _ => None,
        };
        next
    }
}

/// Return `issue` moved to `new_status`, or a `LIFECYCLE_PROOF_REQUIRED` error when resolving
/// without proof.
///
/// The input is never modified; merging the result back into a collection is the caller's job.
pub fn update_status(
    issue: &Issue,
    new_status: Status,
    proof_photo: Option<&str>,
) -> Result<Issue, AppError> {
    let change = StatusChange::new(issue.id, new_status, proof_photo)?;
    Ok(change.apply(issue))
}

/// Replace the issue with `updated.id` in `issues`, returning a new collection.
///
/// Returns `None` when no issue has that ID.
pub fn replace_issue(issues: &[Issue], updated: Issue) -> Option<Vec<Issue>> {
    let idx = issues.iter().position(|i| i.id == updated.id)?;
    let mut next = issues.to_vec();
    next[idx] = updated;
    Some(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LIFECYCLE_PROOF_REQUIRED;

    #[test]
    fn whitespace_proof_is_rejected() {
        let err = StatusChange::new(4, Status::Resolved, Some("   ")).unwrap_err();
        assert!(err.is(LIFECYCLE_PROOF_REQUIRED));
        assert!(err.retryable);
        assert_eq!(err.details.as_deref(), Some("issue_id=4"));
    }

    #[test]
    fn proof_is_trimmed_and_ignored_off_resolved() {
        assert_eq!(
            StatusChange::new(1, Status::Resolved, Some(" proof://x ")),
            Ok(StatusChange::Resolved {
                proof_photo: "proof://x".to_string()
            })
        );
        assert_eq!(
            StatusChange::new(1, Status::InProgress, Some("proof://x")),
            Ok(StatusChange::InProgress)
        );
    }

    #[test]
    fn change_serializes_as_tagged_request() {
        let json = serde_json::to_value(StatusChange::Resolved {
            proof_photo: "proof://abc".to_string(),
        })
        .expect("serialize");
        assert_eq!(json["status"], "Resolved");
        assert_eq!(json["proofPhoto"], "proof://abc");

        let json = serde_json::to_value(StatusChange::InProgress).expect("serialize");
        assert_eq!(json, serde_json::json!({ "status": "In Progress" }));
    }
}
