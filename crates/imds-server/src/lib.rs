//! IMDS HTTP server.
//!
//! Wires the core library and a storage backend into an Axum router. Serves
//! cloud-init documents to instances at the root and the vendor-data control
//! plane under `/internal`.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;
