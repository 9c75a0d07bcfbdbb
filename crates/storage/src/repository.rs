//! Repository Implementation

use crate::{Data, Database, StorageError};
use async_trait::async_trait;
use sqlx::sqlite::{SqlitePool, SqliteRow, SqliteStatement};
use sqlx::{Executor, Row, Statement};
use std::sync::Arc;
use tokio::sync::{RwLock, RwLockReadGuard};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS data (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    message VARCHAR(255) NOT NULL,
    device_id TEXT,
    device_name TEXT,
    value REAL,
    data_type TEXT,
    date_time DATETIME,
    description TEXT
)";

const INSERT: &str = "INSERT INTO data \
    (message, device_id, device_name, value, data_type, date_time, description) \
    VALUES (?, ?, ?, ?, ?, ?, ?)";

const SELECT_ONE: &str = "SELECT id, message, device_id, device_name, value, data_type, \
    date_time, description FROM data WHERE id = ?";

const SELECT_PAGE: &str = "SELECT id, message, device_id, device_name, value, data_type, \
    date_time, description FROM data ORDER BY id LIMIT ? OFFSET ?";

const SELECT_ALL: &str = "SELECT id, message, device_id, device_name, value, data_type, \
    date_time, description FROM data ORDER BY id";

const UPDATE: &str = "UPDATE data SET message = ?, device_id = ?, device_name = ?, value = ?, \
    data_type = ?, date_time = ?, description = ? WHERE id = ?";

const DELETE: &str = "DELETE FROM data WHERE id = ?";

/// Persistence operations for [`Data`] records.
///
/// A missing row is never an error: `read_one` answers `Ok(None)` and
/// `update`/`delete` report zero affected rows. Store failures are returned
/// unchanged and never retried.
#[async_trait]
pub trait DataRepository: Send + Sync {
    /// Insert a record and write the generated id back into it
    async fn create(&self, data: &mut Data) -> Result<(), StorageError>;

    /// Fetch a record by id
    async fn read_one(&self, id: i64) -> Result<Option<Data>, StorageError>;

    /// Fetch one page of records, or every record when `page < 1`
    async fn read_many(&self, page: i64, rows_per_page: u32) -> Result<Vec<Data>, StorageError>;

    /// Fetch every record
    async fn read_all(&self) -> Result<Vec<Data>, StorageError>;

    /// Overwrite the record with `data.id`, returning affected rows
    async fn update(&self, data: &Data) -> Result<u64, StorageError>;

    /// Remove the record with `data.id`, returning affected rows
    async fn delete(&self, data: &Data) -> Result<u64, StorageError>;
}

/// One prepared statement per operation
struct Statements {
    create: SqliteStatement<'static>,
    read_one: SqliteStatement<'static>,
    read_many: SqliteStatement<'static>,
    read_all: SqliteStatement<'static>,
    update: SqliteStatement<'static>,
    delete: SqliteStatement<'static>,
}

impl Statements {
    async fn prepare(pool: &SqlitePool) -> Result<Self, sqlx::Error> {
        Ok(Self {
            create: pool.prepare(INSERT).await?,
            read_one: pool.prepare(SELECT_ONE).await?,
            read_many: pool.prepare(SELECT_PAGE).await?,
            read_all: pool.prepare(SELECT_ALL).await?,
            update: pool.prepare(UPDATE).await?,
            delete: pool.prepare(DELETE).await?,
        })
    }

    fn release(self) {
        let Self {
            create,
            read_one,
            read_many,
            read_all,
            update,
            delete,
        } = self;
        drop(create);
        drop(read_one);
        drop(read_many);
        drop(read_all);
        drop(update);
        drop(delete);
    }
}

struct Inner {
    db: Database,
    /// `None` once torn down. Queries hold the read half for their whole
    /// duration so teardown cannot overlap them.
    statements: RwLock<Option<Statements>>,
}

/// SQLite-backed [`DataRepository`]
#[derive(Clone)]
pub struct SqliteDataRepository {
    inner: Arc<Inner>,
}

impl SqliteDataRepository {
    /// Create the table if needed, prepare all statements and register
    /// teardown on `shutdown`.
    ///
    /// On failure the database is closed before the error is returned.
    pub async fn new(db: Database, shutdown: CancellationToken) -> Result<Self, StorageError> {
        if let Err(e) = sqlx::query(CREATE_TABLE).execute(db.pool()).await {
            db.close().await;
            return Err(e.into());
        }
        info!("Data table ready");

        let statements = match Statements::prepare(db.pool()).await {
            Ok(statements) => statements,
            Err(e) => {
                db.close().await;
                return Err(e.into());
            }
        };
        debug!("Prepared data statements");

        let repo = Self {
            inner: Arc::new(Inner {
                db,
                statements: RwLock::new(Some(statements)),
            }),
        };

        let weak = Arc::downgrade(&repo.inner);
        tokio::spawn(async move {
            shutdown.cancelled().await;
            if let Some(inner) = weak.upgrade() {
                SqliteDataRepository { inner }.close().await;
            }
        });

        Ok(repo)
    }

    /// Wait for in-flight queries, release the statements, then close the
    /// database. Later calls are no-ops.
    pub async fn close(&self) {
        let mut guard = self.inner.statements.write().await;
        if let Some(statements) = guard.take() {
            statements.release();
            self.inner.db.close().await;
            info!("Data repository closed");
        }
    }

    /// Whether teardown has run
    pub fn is_closed(&self) -> bool {
        self.inner.db.is_closed()
    }

    async fn statements(&self) -> Result<RwLockReadGuard<'_, Statements>, StorageError> {
        let guard = self.inner.statements.read().await;
        RwLockReadGuard::try_map(guard, |s| s.as_ref()).map_err(|_| StorageError::Closed)
    }

    fn pool(&self) -> &SqlitePool {
        self.inner.db.pool()
    }
}

fn data_from_row(row: &SqliteRow) -> Result<Data, sqlx::Error> {
    Ok(Data {
        id: row.try_get("id")?,
        message: row.try_get("message")?,
        device_id: row.try_get("device_id")?,
        device_name: row.try_get("device_name")?,
        value: row.try_get("value")?,
        data_type: row.try_get("data_type")?,
        date_time: row.try_get("date_time")?,
        description: row.try_get("description")?,
    })
}

#[async_trait]
impl DataRepository for SqliteDataRepository {
    async fn create(&self, data: &mut Data) -> Result<(), StorageError> {
        let statements = self.statements().await?;
        let result = statements
            .create
            .query()
            .bind(data.message.clone())
            .bind(data.device_id.clone())
            .bind(data.device_name.clone())
            .bind(data.value)
            .bind(data.data_type.clone())
            .bind(data.date_time)
            .bind(data.description.clone())
            .execute(self.pool())
            .await?;

        data.id = result.last_insert_rowid();
        debug!("Inserted data with ID {}", data.id);
        Ok(())
    }

    async fn read_one(&self, id: i64) -> Result<Option<Data>, StorageError> {
        let statements = self.statements().await?;
        let row = statements
            .read_one
            .query()
            .bind(id)
            .fetch_optional(self.pool())
            .await?;

        match row {
            Some(row) => Ok(Some(data_from_row(&row)?)),
            None => {
                debug!("No data with ID {}", id);
                Ok(None)
            }
        }
    }

    async fn read_many(&self, page: i64, rows_per_page: u32) -> Result<Vec<Data>, StorageError> {
        if page < 1 {
            return self.read_all().await;
        }

        let limit = i64::from(rows_per_page);
        let offset = limit.saturating_mul(page - 1);
        let statements = self.statements().await?;
        let rows = statements
            .read_many
            .query()
            .bind(limit)
            .bind(offset)
            .fetch_all(self.pool())
            .await?;

        let data = rows
            .iter()
            .map(data_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        debug!("Read page {} ({} rows)", page, data.len());
        Ok(data)
    }

    async fn read_all(&self) -> Result<Vec<Data>, StorageError> {
        let statements = self.statements().await?;
        let rows = statements.read_all.query().fetch_all(self.pool()).await?;

        Ok(rows
            .iter()
            .map(data_from_row)
            .collect::<Result<Vec<_>, _>>()?)
    }

    async fn update(&self, data: &Data) -> Result<u64, StorageError> {
        let statements = self.statements().await?;
        let result = statements
            .update
            .query()
            .bind(data.message.clone())
            .bind(data.device_id.clone())
            .bind(data.device_name.clone())
            .bind(data.value)
            .bind(data.data_type.clone())
            .bind(data.date_time)
            .bind(data.description.clone())
            .bind(data.id)
            .execute(self.pool())
            .await?;

        debug!("Updated data with ID {} ({} rows)", data.id, result.rows_affected());
        Ok(result.rows_affected())
    }

    async fn delete(&self, data: &Data) -> Result<u64, StorageError> {
        let statements = self.statements().await?;
        let result = statements
            .delete
            .query()
            .bind(data.id)
            .execute(self.pool())
            .await?;

        debug!("Deleted data with ID {} ({} rows)", data.id, result.rows_affected());
        Ok(result.rows_affected())
    }
}
