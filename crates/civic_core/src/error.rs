use serde::{Deserialize, Serialize};
use std::fmt;

pub const LIFECYCLE_PROOF_REQUIRED: &str = "LIFECYCLE_PROOF_REQUIRED";
pub const ISSUE_NOT_FOUND: &str = "ISSUE_NOT_FOUND";
pub const CONFIG_READ_FAILED: &str = "CONFIG_READ_FAILED";
pub const CONFIG_PARSE_FAILED: &str = "CONFIG_PARSE_FAILED";
pub const CONFIG_INVALID: &str = "CONFIG_INVALID";

/// Single structured error shape used by every engine layer and the CLI boundary.
///
/// `code` is stable and machine-matchable; `message` is for operators. `retryable` marks
/// failures the caller can fix by resubmitting corrected input (e.g. a missing proof).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppError {
    pub code: String,
    pub message: String,
    pub details: Option<String>,
    pub retryable: bool,
}

impl AppError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
            retryable: false,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_retryable(mut self, retryable: bool) -> Self {
        self.retryable = retryable;
        self
    }

    /// Rejection raised when a Resolved transition arrives without a proof reference.
    pub fn proof_required(issue_id: i64) -> Self {
        Self::new(
            LIFECYCLE_PROOF_REQUIRED,
            "A proof photo reference is required to mark an issue as Resolved",
        )
        .with_details(format!("issue_id={issue_id}"))
        .with_retryable(true)
    }

    pub fn issue_not_found(issue_id: i64) -> Self {
        Self::new(ISSUE_NOT_FOUND, "Issue not found in the current corpus")
            .with_details(format!("issue_id={issue_id}"))
    }

    pub fn is(&self, code: &str) -> bool {
        self.code == code
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(details) = &self.details {
            write!(f, " ({details})")?;
        }
        Ok(())
    }
}

impl std::error::Error for AppError {}
