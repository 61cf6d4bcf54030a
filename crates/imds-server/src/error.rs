//! HTTP error types for the IMDS server.
//!
//! Maps domain errors from `imds-core` into HTTP responses. Every variant
//! produces a JSON body with a machine-readable `error` field and a
//! human-readable `message`. Internal failures are logged with their cause
//! and answered with a generic message.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use imds_core::error::{RenderError, VendorError};
use imds_core::negotiate::UnsupportedFormat;

/// Application-level error returned from HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    /// Client sent invalid input.
    BadRequest(String),
    /// Requested resource not found.
    NotFound(String),
    /// The `Accept` value is outside the endpoint's allow-list.
    UnsupportedFormat(UnsupportedFormat),
    /// The backing store did not answer a health probe.
    Unavailable(String),
    /// Internal server error. The string is logged, never sent.
    Internal(String),
}

/// JSON error response body.
#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

/// JSON body for a rejected negotiation.
#[derive(Serialize)]
struct UnsupportedFormatBody {
    error: &'static str,
    message: String,
    #[serde(flatten)]
    detail: UnsupportedFormat,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg),
            Self::UnsupportedFormat(detail) => {
                let body = UnsupportedFormatBody {
                    error: "unsupported_content_type",
                    message: format!(
                        "The requested content type is not supported. Please use one of the following: {}",
                        detail.allowed_content_types.join(", ")
                    ),
                    detail,
                };
                return (StatusCode::NOT_ACCEPTABLE, axum::Json(body)).into_response();
            }
            Self::Unavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, "unavailable", msg),
            Self::Internal(msg) => {
                tracing::error!(error = %msg, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "internal server error".to_owned(),
                )
            }
        };

        let body = ErrorBody {
            error: error_type,
            message,
        };

        (status, axum::Json(body)).into_response()
    }
}

impl From<VendorError> for AppError {
    fn from(err: VendorError) -> Self {
        match err {
            VendorError::InvalidInput { .. }
            | VendorError::AlreadyExists { .. }
            | VendorError::Encoding(_) => Self::BadRequest(err.to_string()),

            VendorError::NotFound { .. } => Self::NotFound(err.to_string()),

            VendorError::StoreUnavailable { .. } | VendorError::CorruptDocument { .. } => {
                Self::Internal(err.to_string())
            }
        }
    }
}

impl From<UnsupportedFormat> for AppError {
    fn from(err: UnsupportedFormat) -> Self {
        Self::UnsupportedFormat(err)
    }
}

impl From<RenderError> for AppError {
    fn from(err: RenderError) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(err: JsonRejection) -> Self {
        tracing::debug!(error = %err, "rejected request body");
        Self::BadRequest("Invalid request payload".to_owned())
    }
}
