//! Service Error Types

use std::fmt;
use storage::StorageError;
use thiserror::Error;

/// A single violated validation rule
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Message is empty
    #[error("message is required")]
    EmptyMessage,

    /// Message exceeds the configured length
    #[error("message must be at most {max} characters (got {len})")]
    MessageTooLong { len: usize, max: usize },

    /// Value is NaN or infinite
    #[error("value must be a finite number")]
    NonFiniteValue,
}

/// Every rule a record violated, in check order
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationErrors(pub Vec<ValidationError>);

impl ValidationErrors {
    pub fn errors(&self) -> &[ValidationError] {
        &self.0
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Operation a storage failure happened in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Read,
    Update,
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self {
            Operation::Create => "creating",
            Operation::Read => "reading",
            Operation::Update => "updating",
            Operation::Delete => "deleting",
        };
        f.write_str(verb)
    }
}

/// Errors returned by a [`crate::DataService`].
///
/// The display text is safe to show to clients; storage detail is only
/// reachable through `source()`.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Invalid data: {0}")]
    Invalid(#[source] ValidationErrors),

    #[error("Error {op} data.")]
    Storage {
        op: Operation,
        #[source]
        source: StorageError,
    },
}

impl ServiceError {
    pub fn storage(op: Operation, source: StorageError) -> Self {
        Self::Storage { op, source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_validation_errors_joined() {
        let errors = ValidationErrors(vec![
            ValidationError::EmptyMessage,
            ValidationError::NonFiniteValue,
        ]);
        assert_eq!(
            errors.to_string(),
            "message is required; value must be a finite number"
        );
    }

    #[test]
    fn test_storage_error_hides_detail() {
        let err = ServiceError::storage(Operation::Create, StorageError::Closed);
        assert_eq!(err.to_string(), "Error creating data.");
        assert_eq!(err.source().unwrap().to_string(), "Repository is closed");
    }

    #[test]
    fn test_invalid_display() {
        let err = ServiceError::Invalid(ValidationErrors(vec![ValidationError::MessageTooLong {
            len: 300,
            max: 255,
        }]));
        assert_eq!(
            err.to_string(),
            "Invalid data: message must be at most 255 characters (got 300)"
        );
    }
}
