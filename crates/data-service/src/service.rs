//! Data Service Implementation

use crate::error::{Operation, ServiceError};
use crate::validator::Validator;
use async_trait::async_trait;
use storage::{Data, DataRepository, SqliteDataRepository};
use tracing::{debug, warn};

/// Business operations on data records.
///
/// Absent records are `Ok(None)` and unmatched updates or deletes report
/// zero rows; choosing what that means to a client is left to the caller.
#[async_trait]
pub trait DataService: Send + Sync {
    /// Validate and persist a new record, filling in its id
    async fn create(&self, data: &mut Data) -> Result<(), ServiceError>;

    /// Fetch a record by id
    async fn read_one(&self, id: i64) -> Result<Option<Data>, ServiceError>;

    /// Fetch a page of records, or all of them when `page < 1`
    async fn read_many(&self, page: i64, rows_per_page: u32) -> Result<Vec<Data>, ServiceError>;

    /// Validate and overwrite a record, returning affected rows
    async fn update(&self, data: &Data) -> Result<u64, ServiceError>;

    /// Remove a record, returning affected rows
    async fn delete(&self, data: &Data) -> Result<u64, ServiceError>;
}

/// [`DataService`] backed by a [`DataRepository`]
pub struct SqliteDataService<R = SqliteDataRepository> {
    repo: R,
    validator: Validator,
}

impl<R: DataRepository> SqliteDataService<R> {
    /// Create a service with the default validation rules
    pub fn new(repo: R) -> Self {
        Self::with_validator(repo, Validator::default())
    }

    pub fn with_validator(repo: R, validator: Validator) -> Self {
        Self { repo, validator }
    }

    fn validate(&self, data: &Data) -> Result<(), ServiceError> {
        self.validator.validate(data).map_err(|errors| {
            debug!("Rejected data: {}", errors);
            ServiceError::Invalid(errors)
        })
    }
}

#[async_trait]
impl<R: DataRepository> DataService for SqliteDataService<R> {
    async fn create(&self, data: &mut Data) -> Result<(), ServiceError> {
        self.validate(data)?;
        self.repo.create(data).await.map_err(|e| {
            warn!("Create failed: {}", e);
            ServiceError::storage(Operation::Create, e)
        })
    }

    async fn read_one(&self, id: i64) -> Result<Option<Data>, ServiceError> {
        self.repo
            .read_one(id)
            .await
            .map_err(|e| ServiceError::storage(Operation::Read, e))
    }

    async fn read_many(&self, page: i64, rows_per_page: u32) -> Result<Vec<Data>, ServiceError> {
        self.repo
            .read_many(page, rows_per_page)
            .await
            .map_err(|e| ServiceError::storage(Operation::Read, e))
    }

    async fn update(&self, data: &Data) -> Result<u64, ServiceError> {
        self.validate(data)?;
        self.repo.update(data).await.map_err(|e| {
            warn!("Update of {} failed: {}", data.id, e);
            ServiceError::storage(Operation::Update, e)
        })
    }

    async fn delete(&self, data: &Data) -> Result<u64, ServiceError> {
        self.repo.delete(data).await.map_err(|e| {
            warn!("Delete of {} failed: {}", data.id, e);
            ServiceError::storage(Operation::Delete, e)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use storage::{Database, StorageError};
    use tokio_util::sync::CancellationToken;

    /// Counts calls and always fails, to prove which paths reach storage
    #[derive(Default)]
    struct CountingRepository {
        calls: AtomicUsize,
    }

    impl CountingRepository {
        fn hit<T>(&self) -> Result<T, StorageError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(StorageError::Closed)
        }
    }

    #[async_trait]
    impl DataRepository for CountingRepository {
        async fn create(&self, _data: &mut Data) -> Result<(), StorageError> {
            self.hit()
        }
        async fn read_one(&self, _id: i64) -> Result<Option<Data>, StorageError> {
            self.hit()
        }
        async fn read_many(&self, _page: i64, _rows: u32) -> Result<Vec<Data>, StorageError> {
            self.hit()
        }
        async fn read_all(&self) -> Result<Vec<Data>, StorageError> {
            self.hit()
        }
        async fn update(&self, _data: &Data) -> Result<u64, StorageError> {
            self.hit()
        }
        async fn delete(&self, _data: &Data) -> Result<u64, StorageError> {
            self.hit()
        }
    }

    async fn sqlite_service() -> SqliteDataService {
        let db = Database::in_memory().await.unwrap();
        let repo = SqliteDataRepository::new(db, CancellationToken::new())
            .await
            .unwrap();
        SqliteDataService::new(repo)
    }

    #[tokio::test]
    async fn test_invalid_create_never_reaches_repository() {
        let service = SqliteDataService::new(CountingRepository::default());

        let mut data = Data::new("");
        let err = service.create(&mut data).await.unwrap_err();

        assert!(matches!(err, ServiceError::Invalid(_)));
        assert_eq!(err.to_string(), "Invalid data: message is required");
        assert_eq!(data.id, 0);
        assert_eq!(service.repo.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_invalid_update_carries_detail() {
        let service = SqliteDataService::new(CountingRepository::default());

        let data = Data {
            id: 3,
            ..Data::new("x".repeat(256))
        };
        match service.update(&data).await {
            Err(ServiceError::Invalid(errors)) => assert_eq!(
                errors.errors(),
                &[ValidationError::MessageTooLong { len: 256, max: 255 }]
            ),
            other => panic!("expected validation error, got {:?}", other),
        }
        assert_eq!(service.repo.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_delete_skips_validation() {
        let service = SqliteDataService::new(CountingRepository::default());

        let err = service.delete(&Data::new("")).await.unwrap_err();
        assert_eq!(err.to_string(), "Error deleting data.");
        assert_eq!(service.repo.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_storage_errors_are_tagged() {
        let service = SqliteDataService::new(CountingRepository::default());

        let err = service.create(&mut Data::new("ok")).await.unwrap_err();
        assert_eq!(err.to_string(), "Error creating data.");
        assert!(matches!(
            err,
            ServiceError::Storage {
                op: Operation::Create,
                source: StorageError::Closed
            }
        ));

        let err = service.read_one(1).await.unwrap_err();
        assert_eq!(err.to_string(), "Error reading data.");
    }

    #[tokio::test]
    async fn test_crud_through_sqlite() {
        let service = sqlite_service().await;

        let mut data = Data::new("Test message");
        service.create(&mut data).await.unwrap();
        assert!(data.id > 0);

        assert_eq!(service.read_one(data.id).await.unwrap(), Some(data.clone()));
        assert_eq!(service.read_one(data.id + 1).await.unwrap(), None);

        data.message = "Edited".to_string();
        assert_eq!(service.update(&data).await.unwrap(), 1);
        assert_eq!(service.read_many(0, 10).await.unwrap(), vec![data.clone()]);

        assert_eq!(service.delete(&data).await.unwrap(), 1);
        assert_eq!(service.delete(&data).await.unwrap(), 0);
        assert!(service.read_many(1, 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_missing_is_zero_rows() {
        let service = sqlite_service().await;
        let data = Data {
            id: 77,
            ..Data::new("valid")
        };
        assert_eq!(service.update(&data).await.unwrap(), 0);
    }
}
