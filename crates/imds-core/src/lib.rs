//! Core library for IMDS.
//!
//! Contains the vendor document store, the serialization helpers it stores
//! bodies with, the `Accept`-header format negotiator, the cloud-init wire
//! schema types, and the renderer that turns them into response bytes. This
//! crate depends on `imds-storage` for the query interface and knows nothing
//! about HTTP.

pub mod codec;
pub mod context;
pub mod defaults;
pub mod error;
pub mod negotiate;
pub mod render;
pub mod schema;
pub mod vendor;
