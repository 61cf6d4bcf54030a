//! Row mapping shared by the SQL backends.

use chrono::{DateTime, Utc};

use crate::{StorageError, VendorRecord};

pub(crate) const SELECT_COLUMNS: &str =
    "id, name, description, data, created_at, updated_at, deleted_at";

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct VendorRow {
    id: i64,
    name: String,
    description: Option<String>,
    data: Option<Vec<u8>>,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
    deleted_at: Option<DateTime<Utc>>,
}

impl From<VendorRow> for VendorRecord {
    fn from(row: VendorRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            data: row.data,
            created_at: row.created_at,
            updated_at: row.updated_at,
            deleted_at: row.deleted_at,
        }
    }
}

/// Classify an insert failure: unique-index violations become `Conflict`.
pub(crate) fn insert_error(name: &str, err: &sqlx::Error) -> StorageError {
    if let sqlx::Error::Database(db_err) = err {
        if db_err.is_unique_violation() {
            return StorageError::Conflict {
                name: name.to_owned(),
            };
        }
    }
    StorageError::Write {
        name: name.to_owned(),
        reason: err.to_string(),
    }
}
