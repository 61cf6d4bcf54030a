//! In-memory query backend.
//!
//! Rows live in a `BTreeMap` keyed by id behind a single `RwLock`. Nothing
//! is persisted. Use it for development (`DB_DRIVER=memory`) and for tests
//! that need a real backend without touching disk.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;

use crate::{CreateVendorParams, StorageError, UpdateVendorParams, VendorQuerier, VendorRecord};

#[derive(Debug, Default)]
struct Table {
    next_id: i64,
    rows: BTreeMap<i64, VendorRecord>,
}

impl Table {
    fn live_by_name(&self, name: &str) -> Option<&VendorRecord> {
        self.rows
            .values()
            .find(|row| row.deleted_at.is_none() && row.name == name)
    }
}

/// An in-memory `vendor_data` table.
///
/// Cloning shares the underlying table. The uniqueness check and the insert
/// happen under one write lock, so concurrent creates of the same name
/// cannot both succeed.
///
/// # Examples
///
/// ```
/// # use imds_storage::{CreateVendorParams, MemoryQuerier, VendorQuerier};
/// # #[tokio::main]
/// # async fn main() {
/// let querier = MemoryQuerier::new();
/// let row = querier
///     .create_vendor_data(CreateVendorParams {
///         name: "acme".to_owned(),
///         description: None,
///         data: b"{}".to_vec(),
///     })
///     .await
///     .unwrap();
/// assert_eq!(querier.get_vendor_data("acme").await.unwrap().id, row.id);
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryQuerier {
    table: Arc<RwLock<Table>>,
}

impl MemoryQuerier {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl VendorQuerier for MemoryQuerier {
    async fn get_vendor_data(&self, name: &str) -> Result<VendorRecord, StorageError> {
        let table = self.table.read().await;
        table
            .live_by_name(name)
            .cloned()
            .ok_or_else(|| StorageError::NotFound {
                name: name.to_owned(),
            })
    }

    async fn create_vendor_data(
        &self,
        params: CreateVendorParams,
    ) -> Result<VendorRecord, StorageError> {
        let mut table = self.table.write().await;
        if table.live_by_name(&params.name).is_some() {
            return Err(StorageError::Conflict { name: params.name });
        }

        table.next_id = table.next_id.saturating_add(1);
        let now = Utc::now();
        let row = VendorRecord {
            id: table.next_id,
            name: params.name,
            description: params.description,
            data: Some(params.data),
            created_at: Some(now),
            updated_at: Some(now),
            deleted_at: None,
        };
        table.rows.insert(row.id, row.clone());
        Ok(row)
    }

    async fn update_vendor_data(
        &self,
        params: UpdateVendorParams,
    ) -> Result<VendorRecord, StorageError> {
        let mut table = self.table.write().await;
        match table.rows.get_mut(&params.id) {
            Some(row) if row.deleted_at.is_none() => {
                row.data = Some(params.data);
                row.updated_at = Some(Utc::now());
                Ok(row.clone())
            }
            _ => Err(StorageError::NotFound {
                name: format!("#{}", params.id),
            }),
        }
    }

    async fn delete_vendor_data(&self, id: i64) -> Result<(), StorageError> {
        let mut table = self.table.write().await;
        if let Some(row) = table.rows.get_mut(&id) {
            if row.deleted_at.is_none() {
                row.deleted_at = Some(Utc::now());
            }
        }
        Ok(())
    }

    async fn ping(&self) -> Result<(), StorageError> {
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn params(name: &str, data: &[u8]) -> CreateVendorParams {
        CreateVendorParams {
            name: name.to_owned(),
            description: None,
            data: data.to_vec(),
        }
    }

    #[tokio::test]
    async fn get_missing_returns_not_found() {
        let querier = MemoryQuerier::new();
        let err = querier.get_vendor_data("nope").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn create_assigns_increasing_ids() {
        let querier = MemoryQuerier::new();
        let a = querier.create_vendor_data(params("a", b"1")).await.unwrap();
        let b = querier.create_vendor_data(params("b", b"2")).await.unwrap();
        assert!(b.id > a.id);
        assert!(a.created_at.is_some());
        assert_eq!(a.deleted_at, None);
    }

    #[tokio::test]
    async fn create_duplicate_name_conflicts() {
        let querier = MemoryQuerier::new();
        querier.create_vendor_data(params("acme", b"{}")).await.unwrap();
        let err = querier
            .create_vendor_data(params("acme", b"{}"))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Conflict { ref name } if name == "acme"));
    }

    #[tokio::test]
    async fn update_replaces_data() {
        let querier = MemoryQuerier::new();
        let row = querier.create_vendor_data(params("acme", b"{\"a\":1}")).await.unwrap();
        querier
            .update_vendor_data(UpdateVendorParams {
                id: row.id,
                data: b"{\"b\":2}".to_vec(),
            })
            .await
            .unwrap();
        let fetched = querier.get_vendor_data("acme").await.unwrap();
        assert_eq!(fetched.data, Some(b"{\"b\":2}".to_vec()));
    }

    #[tokio::test]
    async fn update_unknown_id_is_not_found() {
        let querier = MemoryQuerier::new();
        let err = querier
            .update_vendor_data(UpdateVendorParams { id: 42, data: Vec::new() })
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn soft_delete_hides_row_and_frees_name() {
        let querier = MemoryQuerier::new();
        let row = querier.create_vendor_data(params("acme", b"1")).await.unwrap();
        querier.delete_vendor_data(row.id).await.unwrap();

        assert!(querier.get_vendor_data("acme").await.unwrap_err().is_not_found());

        let again = querier.create_vendor_data(params("acme", b"2")).await.unwrap();
        assert_ne!(again.id, row.id);
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let querier = MemoryQuerier::new();
        querier.delete_vendor_data(7).await.unwrap();
        let row = querier.create_vendor_data(params("acme", b"1")).await.unwrap();
        querier.delete_vendor_data(row.id).await.unwrap();
        querier.delete_vendor_data(row.id).await.unwrap();
    }

    #[tokio::test]
    async fn clone_shares_state() {
        let querier = MemoryQuerier::new();
        let clone = querier.clone();
        querier.create_vendor_data(params("acme", b"1")).await.unwrap();
        assert!(clone.get_vendor_data("acme").await.is_ok());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_creates_admit_one_winner() {
        let querier = MemoryQuerier::new();
        let handles: Vec<_> = (0..8u8)
            .map(|i| {
                let querier = querier.clone();
                tokio::spawn(async move { querier.create_vendor_data(params("race", &[i])).await })
            })
            .collect();

        let mut winners = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => winners += 1,
                Err(err) => assert!(matches!(err, StorageError::Conflict { name } if name == "race")),
            }
        }
        assert_eq!(winners, 1);
        assert_eq!(querier.table.read().await.rows.len(), 1);
    }
}
