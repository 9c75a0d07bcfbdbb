//! Data Service
//!
//! Validation and business rules between the HTTP layer and storage.

mod error;
#[cfg(any(test, feature = "test-util"))]
pub mod mock;
mod service;
mod validator;

pub use error::{Operation, ServiceError, ValidationError, ValidationErrors};
pub use service::{DataService, SqliteDataService};
pub use validator::{ValidationConfig, Validator};
