//! Typed error hierarchy for the task board.
//!
//! `BoardError` is what the mutation service returns. The HTTP layer maps each
//! variant onto one status code; the client has its own `ClientError` in
//! `client::transport`.

use thiserror::Error;

/// Errors from the task mutation service.
#[derive(Debug, Error)]
pub enum BoardError {
    /// Input failed one or more field rules. Carries every violation.
    #[error("Invalid input: {}", .0.join(" "))]
    Validation(Vec<String>),

    #[error("Task {id} not found")]
    NotFound { id: String },

    #[error("Unauthorized")]
    Unauthorized,

    /// Storage or other unexpected failure. Never shown verbatim to callers.
    #[error("Storage error: {0}")]
    Storage(#[source] anyhow::Error),
}

impl BoardError {
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    pub fn validation(errors: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self::Validation(errors.into_iter().map(Into::into).collect())
    }
}

impl From<anyhow::Error> for BoardError {
    fn from(err: anyhow::Error) -> Self {
        Self::Storage(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_carries_id() {
        let err = BoardError::not_found("abc-123");
        match &err {
            BoardError::NotFound { id } => assert_eq!(id, "abc-123"),
            _ => panic!("Expected NotFound"),
        }
        assert!(err.to_string().contains("abc-123"));
    }

    #[test]
    fn validation_lists_every_message() {
        let err = BoardError::validation(["Title is required.", "Invalid status."]);
        match &err {
            BoardError::Validation(errors) => assert_eq!(errors.len(), 2),
            _ => panic!("Expected Validation"),
        }
        let text = err.to_string();
        assert!(text.contains("Title is required."));
        assert!(text.contains("Invalid status."));
    }

    #[test]
    fn anyhow_converts_to_storage() {
        let err: BoardError = anyhow::anyhow!("disk full").into();
        assert!(matches!(err, BoardError::Storage(_)));
        assert!(err.to_string().contains("disk full"));
    }

    #[test]
    fn implements_std_error() {
        fn assert_std_error<E: std::error::Error>(_: &E) {}
        assert_std_error(&BoardError::Unauthorized);
    }
}
