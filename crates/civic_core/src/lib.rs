pub mod cache;
pub mod catalog;
pub mod config;
pub mod domain;
pub mod error;
pub mod generate;
pub mod lifecycle;
pub mod report;
pub mod stats;
pub mod store;
pub mod validate;
pub mod view;

#[cfg(test)]
mod tests {
    use super::error::{AppError, LIFECYCLE_PROOF_REQUIRED};

    #[test]
    fn app_error_is_structured() {
        let err = AppError::new("CONFIG_TEST", "config failed").with_retryable(false);
        assert_eq!(err.code, "CONFIG_TEST");
        assert_eq!(err.message, "config failed");
        assert!(!err.retryable);
        assert_eq!(err.to_string(), "[CONFIG_TEST] config failed");
    }

    #[test]
    fn proof_rejection_is_retryable_and_names_the_issue() {
        let err = AppError::proof_required(12);
        assert!(err.is(LIFECYCLE_PROOF_REQUIRED));
        assert!(err.retryable);
        assert!(err.to_string().ends_with("(issue_id=12)"));
    }
}
