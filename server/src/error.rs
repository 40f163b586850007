//! HTTP error mapping.
//!
//! Every failure leaves the service as `(status, {"detail": message})`,
//! including request bodies the JSON extractor refuses (see `JsonBody`).
//! Store faults other than a missing id become a 500 with a fixed message;
//! the underlying cause is only written to the log.

use axum::extract::rejection::JsonRejection;
use axum::extract::FromRequest;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::model::InvalidPriority;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid priority level")]
    InvalidPriority,

    /// An import batch was rejected because of the named item.
    #[error("Invalid priority level for item: {title}")]
    InvalidImportItem { title: String },

    #[error("Item not found")]
    NotFound,

    /// The body could not be read as the expected JSON shape.
    #[error("{message}")]
    InvalidBody { status: StatusCode, message: String },

    #[error("Internal server error")]
    Store(#[source] StoreError),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    detail: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidPriority | ApiError::InvalidImportItem { .. } => {
                StatusCode::BAD_REQUEST
            }
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::InvalidBody { status, .. } => *status,
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<InvalidPriority> for ApiError {
    fn from(_: InvalidPriority) -> Self {
        ApiError::InvalidPriority
    }
}

/// Unparseable or mistyped JSON is a 422; other rejections (missing
/// content type, unreadable body) keep the extractor's status.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        let status = match &rejection {
            JsonRejection::JsonSyntaxError(_) | JsonRejection::JsonDataError(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            other => other.status(),
        };
        ApiError::InvalidBody {
            status,
            message: rejection.body_text(),
        }
    }
}

/// `Json` extractor whose rejections go through `ApiError`.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);

impl From<StoreError> for ApiError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotFound(_) => ApiError::NotFound,
            other => ApiError::Store(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Store(cause) = &self {
            tracing::error!(error = %cause, "store operation failed");
        }
        let body = ErrorBody {
            detail: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}
