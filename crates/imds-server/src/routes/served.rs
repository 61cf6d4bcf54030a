//! Documents served to instances: `/meta-data`, `/user-data`,
//! `/vendor-data`, `/network-config`.
//!
//! Every handler gates on the raw `Accept` header before doing any work and
//! answers in the format the negotiator picks.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{header, HeaderMap};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use serde::Serialize;
use serde_json::Value;

use imds_core::defaults;
use imds_core::error::RenderError;
use imds_core::negotiate::{FormatGroup, WireFormat};
use imds_core::render::{render, Rendered, ServedDocument};

use crate::error::AppError;
use crate::state::AppState;

const METADATA_FORMATS: &[FormatGroup] = &[FormatGroup::Json, FormatGroup::Yaml];
const USER_DATA_FORMATS: &[FormatGroup] = &[FormatGroup::Script, FormatGroup::Yaml];
const VENDOR_DATA_FORMATS: &[FormatGroup] = &[FormatGroup::Json, FormatGroup::Yaml];
const NETWORK_CONFIG_FORMATS: &[FormatGroup] = &[FormatGroup::Yaml];

/// Build the router for instance-facing documents.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/meta-data", get(meta_data))
        .route("/meta-data/{key}", get(meta_data_key))
        .route("/user-data", get(user_data))
        .route("/vendor-data", get(vendor_data))
        .route("/network-config", get(network_config))
}

/// A single top-level metadata field.
#[derive(Debug, Serialize)]
pub struct MetadataEntry {
    pub key: String,
    /// The field's value, or `null` for an unknown key.
    pub data: Value,
}

impl ServedDocument for MetadataEntry {
    const KIND: &'static str = "meta-data entry";
}

// ── Handlers ─────────────────────────────────────────────────────────

/// `GET /meta-data`: full instance metadata.
async fn meta_data(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let format = negotiate(&state, &headers, METADATA_FORMATS)?;
    respond(&defaults::metadata(), format)
}

/// `GET /meta-data/{key}`: one top-level metadata field by wire name.
async fn meta_data_key(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let format = negotiate(&state, &headers, METADATA_FORMATS)?;

    let metadata = serde_json::to_value(defaults::metadata()).map_err(RenderError::from)?;
    let data = metadata.get(&key).cloned().unwrap_or(Value::Null);

    respond(&MetadataEntry { key, data }, format)
}

/// `GET /user-data`: cloud-config user data, as YAML or a shell script.
async fn user_data(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let format = negotiate(&state, &headers, USER_DATA_FORMATS)?;
    respond(&defaults::user_data(), format)
}

/// `GET /vendor-data`: the default vendor's document, `{}` when there is
/// none.
async fn vendor_data(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let format = negotiate(&state, &headers, VENDOR_DATA_FORMATS)?;

    let ctx = state.request_context();
    let document = state
        .vendor_store
        .get_or_empty(&ctx, &state.default_vendor)
        .await?
        .unwrap_or_else(|| Value::Object(serde_json::Map::new()));

    respond(&document, format)
}

/// `GET /network-config`: version 2 network configuration, YAML only.
async fn network_config(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let format = negotiate(&state, &headers, NETWORK_CONFIG_FORMATS)?;
    respond(&defaults::network_config(), format)
}

// ── Helpers ──────────────────────────────────────────────────────────

/// Match the raw `Accept` header against `allowed`. A missing header is the
/// empty string.
fn negotiate(
    state: &AppState,
    headers: &HeaderMap,
    allowed: &[FormatGroup],
) -> Result<WireFormat, AppError> {
    let declared = headers
        .get(header::ACCEPT)
        .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
        .unwrap_or_default();

    state
        .negotiator
        .negotiate(&declared, allowed)
        .map_err(AppError::from)
}

fn respond<D: ServedDocument>(document: &D, format: WireFormat) -> Result<Response, AppError> {
    let Rendered { content_type, body } = render(document, format)?;
    Ok(([(header::CONTENT_TYPE, content_type)], body).into_response())
}
