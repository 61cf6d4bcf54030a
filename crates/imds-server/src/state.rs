//! Shared application state for the IMDS server.
//!
//! A single [`AppState`] is constructed at startup and shared across all
//! Axum handlers via `Arc`.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use imds_core::context::RequestContext;
use imds_core::negotiate::{AllowListNegotiator, FormatNegotiator};
use imds_core::vendor::VendorStore;
use imds_storage::VendorQuerier;

/// Shared application state passed to all HTTP handlers.
pub struct AppState {
    /// Vendor document store.
    pub vendor_store: VendorStore,
    /// The query interface, for health probes.
    pub querier: Arc<dyn VendorQuerier>,
    /// `Accept`-header matcher for served documents.
    pub negotiator: Arc<dyn FormatNegotiator>,
    /// Deadline for store calls made on behalf of one request.
    pub request_timeout: Duration,
    /// Vendor whose document is served at `/vendor-data`.
    pub default_vendor: String,
    /// Flips to `true` when the server starts shutting down.
    pub shutdown: watch::Receiver<bool>,
}

impl AppState {
    /// State over `querier` with the literal allow-list negotiator.
    #[must_use]
    pub fn new(
        querier: Arc<dyn VendorQuerier>,
        request_timeout: Duration,
        default_vendor: String,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            vendor_store: VendorStore::new(Arc::clone(&querier)),
            querier,
            negotiator: Arc::new(AllowListNegotiator),
            request_timeout,
            default_vendor,
            shutdown,
        }
    }

    /// A fresh context for one request: the configured deadline plus the
    /// server's shutdown signal.
    #[must_use]
    pub fn request_context(&self) -> RequestContext {
        RequestContext::new(self.request_timeout, self.shutdown.clone())
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("request_timeout", &self.request_timeout)
            .field("default_vendor", &self.default_vendor)
            .finish_non_exhaustive()
    }
}
