//! `SQLite` query backend, the production default.
//!
//! Wraps an `sqlx` connection pool behind the [`VendorQuerier`] trait. The
//! schema is created on open, including a partial unique index that keeps
//! live vendor names unique at the database level.

use std::str::FromStr;

use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::row::{insert_error, VendorRow, SELECT_COLUMNS};
use crate::{CreateVendorParams, StorageError, UpdateVendorParams, VendorQuerier, VendorRecord};

const SCHEMA: [&str; 2] = [
    "CREATE TABLE IF NOT EXISTS vendor_data (\
        id          INTEGER PRIMARY KEY AUTOINCREMENT, \
        name        TEXT NOT NULL, \
        description TEXT, \
        data        BLOB, \
        created_at  TEXT, \
        updated_at  TEXT, \
        deleted_at  TEXT\
    )",
    "CREATE UNIQUE INDEX IF NOT EXISTS idx_vendor_data_live_name \
     ON vendor_data (name) WHERE deleted_at IS NULL",
];

/// A query backend backed by `SQLite`.
///
/// # Examples
///
/// ```no_run
/// # use imds_storage::SqliteQuerier;
/// # #[tokio::main]
/// # async fn main() {
/// let querier = SqliteQuerier::open("metadata.db").await.unwrap();
/// # }
/// ```
#[derive(Clone)]
pub struct SqliteQuerier {
    pool: SqlitePool,
}

impl std::fmt::Debug for SqliteQuerier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteQuerier")
            .field("pool", &"[SqlitePool]")
            .finish_non_exhaustive()
    }
}

impl SqliteQuerier {
    /// Open (creating if missing) the database file at `source` and run the
    /// schema migration. `:memory:` opens a private in-memory database held
    /// by a single pooled connection.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Open`] if the database cannot be opened or
    /// migrated.
    pub async fn open(source: &str) -> Result<Self, StorageError> {
        let open_err = |reason: String| StorageError::Open {
            source_name: source.to_owned(),
            reason,
        };

        let pool = if source == ":memory:" || source == "sqlite::memory:" {
            let options = SqliteConnectOptions::from_str("sqlite::memory:")
                .map_err(|e| open_err(e.to_string()))?;
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await
        } else {
            let options = SqliteConnectOptions::new()
                .filename(source)
                .create_if_missing(true)
                .journal_mode(SqliteJournalMode::Wal);
            SqlitePoolOptions::new()
                .max_connections(10)
                .connect_with(options)
                .await
        }
        .map_err(|e| open_err(e.to_string()))?;

        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&pool)
                .await
                .map_err(|e| open_err(format!("migration failed: {e}")))?;
        }

        tracing::debug!(source, "sqlite schema ready");
        Ok(Self { pool })
    }
}

#[async_trait::async_trait]
impl VendorQuerier for SqliteQuerier {
    async fn get_vendor_data(&self, name: &str) -> Result<VendorRecord, StorageError> {
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM vendor_data WHERE name = ?1 AND deleted_at IS NULL"
        );
        sqlx::query_as::<_, VendorRow>(&sql)
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StorageError::Read {
                name: name.to_owned(),
                reason: e.to_string(),
            })?
            .map(VendorRecord::from)
            .ok_or_else(|| StorageError::NotFound {
                name: name.to_owned(),
            })
    }

    async fn create_vendor_data(
        &self,
        params: CreateVendorParams,
    ) -> Result<VendorRecord, StorageError> {
        let sql = format!(
            "INSERT INTO vendor_data (name, description, data, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?4) RETURNING {SELECT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, VendorRow>(&sql)
            .bind(&params.name)
            .bind(&params.description)
            .bind(&params.data)
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| insert_error(&params.name, &e))?;

        Ok(row.into())
    }

    async fn update_vendor_data(
        &self,
        params: UpdateVendorParams,
    ) -> Result<VendorRecord, StorageError> {
        let sql = format!(
            "UPDATE vendor_data SET data = ?1, updated_at = ?2 \
             WHERE id = ?3 AND deleted_at IS NULL RETURNING {SELECT_COLUMNS}"
        );
        let label = format!("#{}", params.id);
        sqlx::query_as::<_, VendorRow>(&sql)
            .bind(&params.data)
            .bind(Utc::now())
            .bind(params.id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StorageError::Write {
                name: label.clone(),
                reason: e.to_string(),
            })?
            .map(VendorRecord::from)
            .ok_or(StorageError::NotFound { name: label })
    }

    async fn delete_vendor_data(&self, id: i64) -> Result<(), StorageError> {
        sqlx::query("UPDATE vendor_data SET deleted_at = ?1 WHERE id = ?2 AND deleted_at IS NULL")
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::Delete {
                id,
                reason: e.to_string(),
            })?;

        Ok(())
    }

    async fn ping(&self) -> Result<(), StorageError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::Unreachable {
                reason: e.to_string(),
            })?;

        Ok(())
    }
}
