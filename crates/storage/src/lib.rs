//! Storage Layer
//!
//! Provides SQLite persistence for [`Data`] records with repository pattern.

mod data;
mod database;
mod repository;

pub use data::Data;
pub use database::{Database, DatabaseConfig};
pub use repository::{DataRepository, SqliteDataRepository};

use thiserror::Error;

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Repository is closed")]
    Closed,
}
