//! Storage layer for the IMDS vendor document table.
//!
//! This crate defines the [`VendorQuerier`] trait, the abstract query
//! interface over the `vendor_data` table. It knows nothing about JSON,
//! HTTP, or content negotiation: document bodies are opaque byte arrays,
//! serialized and validated by the vendor store in `imds-core`.
//!
//! Three implementations are provided:
//!
//! - [`SqliteQuerier`]: production default, backed by `SQLite` (feature `sqlite-backend`)
//! - [`PostgresQuerier`]: backed by `PostgreSQL` (feature `postgres-backend`)
//! - [`MemoryQuerier`]: in-memory, for development and tests

mod error;
mod memory;
#[cfg(feature = "postgres-backend")]
mod postgres_backend;
#[cfg(any(feature = "sqlite-backend", feature = "postgres-backend"))]
mod row;
#[cfg(feature = "sqlite-backend")]
mod sqlite_backend;

use chrono::{DateTime, Utc};

pub use error::StorageError;
pub use memory::MemoryQuerier;
#[cfg(feature = "postgres-backend")]
pub use postgres_backend::PostgresQuerier;
#[cfg(feature = "sqlite-backend")]
pub use sqlite_backend::SqliteQuerier;

/// A row of the `vendor_data` table.
///
/// `data` is `None` when the column is SQL `NULL` and may be an empty
/// vector; both mean "no document body yet".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendorRecord {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub data: Option<Vec<u8>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Parameters for inserting a new vendor row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateVendorParams {
    pub name: String,
    pub description: Option<String>,
    pub data: Vec<u8>,
}

/// Parameters for replacing the body of an existing vendor row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateVendorParams {
    pub id: i64,
    pub data: Vec<u8>,
}

/// The query interface over the `vendor_data` table.
///
/// Every lookup ignores soft-deleted rows. Implementations must be safe to
/// share across async tasks (`Send + Sync`) and must enforce name uniqueness
/// among live rows atomically: two concurrent inserts of the same name can
/// never both succeed.
#[async_trait::async_trait]
pub trait VendorQuerier: Send + Sync + 'static {
    /// Fetch the live row with the given name.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotFound`] if no live row has that name, or
    /// [`StorageError::Read`] if the backend fails.
    async fn get_vendor_data(&self, name: &str) -> Result<VendorRecord, StorageError>;

    /// Insert a new row and return it with its assigned id and timestamps.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Conflict`] if a live row with the same name
    /// exists, or [`StorageError::Write`] if the backend fails.
    async fn create_vendor_data(
        &self,
        params: CreateVendorParams,
    ) -> Result<VendorRecord, StorageError>;

    /// Replace the `data` column of the live row with the given id.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotFound`] if the row is gone, or
    /// [`StorageError::Write`] if the backend fails.
    async fn update_vendor_data(
        &self,
        params: UpdateVendorParams,
    ) -> Result<VendorRecord, StorageError>;

    /// Soft-delete the row with the given id by stamping `deleted_at`.
    ///
    /// Idempotent: deleting a missing or already deleted row is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Delete`] if the backend fails.
    async fn delete_vendor_data(&self, id: i64) -> Result<(), StorageError>;

    /// Check that the backend answers.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Unreachable`] if it does not.
    async fn ping(&self) -> Result<(), StorageError>;
}
