//! Data Validator

use crate::error::{ValidationError, ValidationErrors};
use serde::{Deserialize, Serialize};
use storage::Data;

/// Validation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Maximum message length in characters (column is VARCHAR(255))
    pub max_message_len: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            max_message_len: 255,
        }
    }
}

/// Validator for data records written by clients
#[derive(Debug, Clone)]
pub struct Validator {
    config: ValidationConfig,
}

impl Validator {
    /// Create a new validator with given config
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Check the message rules
    pub fn validate_message(&self, message: &str) -> Result<(), ValidationError> {
        let len = message.chars().count();
        if len == 0 {
            Err(ValidationError::EmptyMessage)
        } else if len > self.config.max_message_len {
            Err(ValidationError::MessageTooLong {
                len,
                max: self.config.max_message_len,
            })
        } else {
            Ok(())
        }
    }

    /// Check an optional numeric reading
    pub fn validate_value(&self, value: Option<f64>) -> Result<(), ValidationError> {
        match value {
            Some(v) if !v.is_finite() => Err(ValidationError::NonFiniteValue),
            _ => Ok(()),
        }
    }

    /// Run every rule, collecting all violations
    pub fn validate(&self, data: &Data) -> Result<(), ValidationErrors> {
        let errors: Vec<ValidationError> = [
            self.validate_message(&data.message),
            self.validate_value(data.value),
        ]
        .into_iter()
        .filter_map(Result::err)
        .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors(errors))
        }
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(ValidationConfig::default())
    }
}
