//! Vendor-data control plane: `/internal/vendor/*`
//!
//! Create, read, and replace vendor documents. JSON in, JSON out; no
//! format negotiation.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use imds_core::vendor::NewVendorDocument;

use crate::error::AppError;
use crate::state::AppState;

/// Build the `/internal` router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/vendor", post(create_vendor))
        .route(
            "/vendor/{vendor_name}/data",
            get(get_vendor_data).put(update_vendor_data),
        )
}

// ── Request / Response types ─────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateVendorRequest {
    pub vendor_name: String,
    pub description: Option<String>,
    pub data: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateVendorRequest {
    pub data: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct VendorDataResponse {
    pub data: Option<Value>,
}

// ── Handlers ─────────────────────────────────────────────────────────

/// `POST /internal/vendor`: create a vendor document.
async fn create_vendor(
    State(state): State<Arc<AppState>>,
    body: Result<Json<CreateVendorRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    let Json(body) = body?;
    let ctx = state.request_context();

    state
        .vendor_store
        .create(
            &ctx,
            NewVendorDocument {
                name: body.vendor_name,
                description: body.description,
                data: body.data,
            },
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "Vendor data created successfully",
        }),
    ))
}

/// `GET /internal/vendor/{vendor_name}/data`: read a vendor document body.
async fn get_vendor_data(
    State(state): State<Arc<AppState>>,
    Path(vendor_name): Path<String>,
) -> Result<Json<VendorDataResponse>, AppError> {
    let ctx = state.request_context();
    let document = state.vendor_store.get(&ctx, &vendor_name).await?;

    Ok(Json(VendorDataResponse {
        data: document.data,
    }))
}

/// `PUT /internal/vendor/{vendor_name}/data`: replace a vendor document body.
async fn update_vendor_data(
    State(state): State<Arc<AppState>>,
    Path(vendor_name): Path<String>,
    body: Result<Json<UpdateVendorRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let Json(body) = body?;
    let ctx = state.request_context();

    state
        .vendor_store
        .update(&ctx, &vendor_name, body.data)
        .await?;

    Ok(Json(MessageResponse {
        message: "Vendor data updated successfully",
    }))
}
