//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("No models configured for the council")]
    EmptyCouncil,

    #[error("Model listed more than once in the council: {0}")]
    DuplicateModel(String),

    #[error("Invalid model identifier: {0:?}")]
    InvalidModel(String),

    #[error("Invalid question: {0}")]
    InvalidQuestion(String),

    #[error("Invalid pipeline transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Operation cancelled")]
    Cancelled,
}

impl DomainError {
    /// Check if this error represents a cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, DomainError::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_model_display() {
        let error = DomainError::DuplicateModel("gpt-4.1".to_string());
        assert_eq!(
            error.to_string(),
            "Model listed more than once in the council: gpt-4.1"
        );
    }

    #[test]
    fn test_is_cancelled_check() {
        assert!(DomainError::Cancelled.is_cancelled());
        assert!(!DomainError::EmptyCouncil.is_cancelled());
        assert!(!DomainError::InvalidQuestion("test".to_string()).is_cancelled());
    }
}
