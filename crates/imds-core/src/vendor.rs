//! Vendor document store.
//!
//! Create, read, and replace named JSON documents on top of a
//! [`VendorQuerier`]. Bodies are encoded with [`crate::codec`] before they
//! reach the querier, so every row written here is either empty or valid
//! JSON. The store keeps no cache: every call goes to the backend.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use imds_storage::{CreateVendorParams, StorageError, UpdateVendorParams, VendorQuerier, VendorRecord};
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::codec;
use crate::context::RequestContext;
use crate::error::VendorError;

/// Input for [`VendorStore::create`].
#[derive(Debug, Clone, PartialEq)]
pub struct NewVendorDocument {
    /// Unique vendor name.
    pub name: String,
    /// Free-form description, fixed at creation.
    pub description: Option<String>,
    /// Document body; `None` is stored as JSON `null`.
    pub data: Option<Value>,
}

/// A vendor document as returned to callers.
#[derive(Debug, Clone, PartialEq)]
pub struct VendorDocument {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    /// The decoded body. An empty column and a stored `null` both read as
    /// `None`.
    pub data: Option<Value>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Result of an existence lookup shared by reads and updates.
enum Lookup {
    Found(VendorRecord),
    Missing,
}

/// Named JSON document store backed by a [`VendorQuerier`].
#[derive(Clone)]
pub struct VendorStore {
    querier: Arc<dyn VendorQuerier>,
}

impl std::fmt::Debug for VendorStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VendorStore").finish_non_exhaustive()
    }
}

impl VendorStore {
    #[must_use]
    pub fn new(querier: Arc<dyn VendorQuerier>) -> Self {
        Self { querier }
    }

    /// Create a new document.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` if the name is empty.
    /// - `AlreadyExists` if a live document has the name, including when a
    ///   concurrent create wins the race.
    /// - `Encoding` if the body cannot be serialized.
    /// - `StoreUnavailable` if the backend fails, times out, or is cancelled.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        doc: NewVendorDocument,
    ) -> Result<VendorDocument, VendorError> {
        require_name(&doc.name)?;

        if let Lookup::Found(_) = self.lookup(ctx, &doc.name, "create").await? {
            warn!(
                request_id = %ctx.request_id(),
                vendor = %doc.name,
                "vendor data already exists"
            );
            return Err(VendorError::AlreadyExists { name: doc.name });
        }

        let data = codec::encode(&doc.data.unwrap_or(Value::Null)).map_err(VendorError::Encoding)?;
        let params = CreateVendorParams {
            name: doc.name.clone(),
            description: doc.description,
            data,
        };

        let record = match ctx
            .run("create", self.querier.create_vendor_data(params))
            .await
        {
            Ok(record) => record,
            Err(StorageError::Conflict { .. }) => {
                warn!(
                    request_id = %ctx.request_id(),
                    vendor = %doc.name,
                    "vendor data created concurrently"
                );
                return Err(VendorError::AlreadyExists { name: doc.name });
            }
            Err(source) => return Err(unavailable(ctx, "create", source)),
        };

        info!(
            request_id = %ctx.request_id(),
            vendor = %record.name,
            id = record.id,
            "vendor data created"
        );
        to_document(record)
    }

    /// Fetch a document by name.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` if the name is empty.
    /// - `NotFound` if no live document has the name.
    /// - `StoreUnavailable` if the backend fails.
    /// - `CorruptDocument` if the stored bytes are not valid JSON.
    pub async fn get(&self, ctx: &RequestContext, name: &str) -> Result<VendorDocument, VendorError> {
        require_name(name)?;

        match self.lookup(ctx, name, "get").await? {
            Lookup::Found(record) => {
                debug!(
                    request_id = %ctx.request_id(),
                    vendor = %name,
                    id = record.id,
                    "vendor data read"
                );
                to_document(record)
            }
            Lookup::Missing => Err(VendorError::NotFound {
                name: name.to_owned(),
            }),
        }
    }

    /// Fetch a document for instances: a missing document reads as an empty
    /// body instead of an error.
    ///
    /// # Errors
    ///
    /// Same as [`VendorStore::get`], minus `NotFound`.
    pub async fn get_or_empty(
        &self,
        ctx: &RequestContext,
        name: &str,
    ) -> Result<Option<Value>, VendorError> {
        match self.get(ctx, name).await {
            Ok(doc) => Ok(doc.data),
            Err(VendorError::NotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Replace the body of an existing document.
    ///
    /// A missing document is reported as `StoreUnavailable`, not `NotFound`:
    /// control-plane callers are expected to create before they update, so a
    /// missing row here means the store lost it.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` if the name is empty or `data` is absent or `null`.
    /// - `StoreUnavailable` if the document is missing or the backend fails.
    /// - `Encoding` if the body cannot be serialized.
    /// - `CorruptDocument` if the written bytes fail to read back.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        name: &str,
        data: Option<Value>,
    ) -> Result<VendorDocument, VendorError> {
        require_name(name)?;
        let data = match data {
            None | Some(Value::Null) => {
                return Err(VendorError::InvalidInput {
                    reason: "data is required".to_owned(),
                });
            }
            Some(value) => value,
        };

        let existing = match self.lookup(ctx, name, "update").await? {
            Lookup::Found(record) => record,
            Lookup::Missing => {
                return Err(unavailable(
                    ctx,
                    "update",
                    StorageError::NotFound {
                        name: name.to_owned(),
                    },
                ));
            }
        };

        let params = UpdateVendorParams {
            id: existing.id,
            data: codec::encode(&data).map_err(VendorError::Encoding)?,
        };
        let record = ctx
            .run("update", self.querier.update_vendor_data(params))
            .await
            .map_err(|source| unavailable(ctx, "update", source))?;

        info!(
            request_id = %ctx.request_id(),
            vendor = %name,
            id = record.id,
            "vendor data updated"
        );
        to_document(record)
    }

    /// Tri-state existence check: found, missing, or the backend error.
    async fn lookup(
        &self,
        ctx: &RequestContext,
        name: &str,
        operation: &'static str,
    ) -> Result<Lookup, VendorError> {
        match ctx.run(operation, self.querier.get_vendor_data(name)).await {
            Ok(record) => Ok(Lookup::Found(record)),
            Err(e) if e.is_not_found() => Ok(Lookup::Missing),
            Err(source) => Err(unavailable(ctx, operation, source)),
        }
    }
}

fn require_name(name: &str) -> Result<(), VendorError> {
    if name.is_empty() {
        return Err(VendorError::InvalidInput {
            reason: "vendor name is required".to_owned(),
        });
    }
    Ok(())
}

fn unavailable(ctx: &RequestContext, operation: &'static str, source: StorageError) -> VendorError {
    error!(
        request_id = %ctx.request_id(),
        operation,
        error = %source,
        "vendor store call failed"
    );
    VendorError::StoreUnavailable { operation, source }
}

fn to_document(record: VendorRecord) -> Result<VendorDocument, VendorError> {
    let data = codec::decode::<Value>(record.data.as_deref())
        .map_err(|source| VendorError::CorruptDocument {
            name: record.name.clone(),
            source,
        })?
        .filter(|value| !value.is_null());

    Ok(VendorDocument {
        id: record.id,
        name: record.name,
        description: record.description,
        data,
        created_at: record.created_at,
        updated_at: record.updated_at,
    })
}
