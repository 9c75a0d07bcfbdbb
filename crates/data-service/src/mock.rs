//! Test doubles for [`DataService`](crate::DataService) consumers

use crate::error::{Operation, ServiceError};
use crate::DataService;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use storage::{Data, StorageError};

/// Succeeds on every call and echoes its input
#[derive(Debug, Default)]
pub struct MockDataServiceSuccessful {
    calls: AtomicUsize,
}

impl MockDataServiceSuccessful {
    /// Number of service calls so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DataService for MockDataServiceSuccessful {
    async fn create(&self, _data: &mut Data) -> Result<(), ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn read_one(&self, id: i64) -> Result<Option<Data>, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Some(Data {
            id,
            ..Data::new("Test message")
        }))
    }

    async fn read_many(&self, _page: i64, _rows_per_page: u32) -> Result<Vec<Data>, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Vec::new())
    }

    async fn update(&self, _data: &Data) -> Result<u64, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(1)
    }

    async fn delete(&self, _data: &Data) -> Result<u64, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(1)
    }
}

/// Fails every call with a storage error for the matching operation
#[derive(Debug, Default)]
pub struct MockDataServiceError {
    calls: AtomicUsize,
}

impl MockDataServiceError {
    /// Number of service calls so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn fail<T>(&self, op: Operation) -> Result<T, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(ServiceError::storage(op, StorageError::Closed))
    }
}

#[async_trait]
impl DataService for MockDataServiceError {
    async fn create(&self, _data: &mut Data) -> Result<(), ServiceError> {
        self.fail(Operation::Create)
    }

    async fn read_one(&self, _id: i64) -> Result<Option<Data>, ServiceError> {
        self.fail(Operation::Read)
    }

    async fn read_many(&self, _page: i64, _rows_per_page: u32) -> Result<Vec<Data>, ServiceError> {
        self.fail(Operation::Read)
    }

    async fn update(&self, _data: &Data) -> Result<u64, ServiceError> {
        self.fail(Operation::Update)
    }

    async fn delete(&self, _data: &Data) -> Result<u64, ServiceError> {
        self.fail(Operation::Delete)
    }
}
