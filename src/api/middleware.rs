use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Application error types
#[derive(Debug, Error)]
pub enum AppError {
    /// Raised by the query composer when a series names no pool.
    /// The orchestrator turns it into `PoolRequired` after pool discovery.
    #[error("No pool specified")]
    MissingPool,

    #[error("{}", pool_required_message(.available))]
    PoolRequired { available: Vec<String> },

    #[error("No data in the selected time range")]
    NoDataInRange,

    #[error(
        "Query returned {shapes} differently shaped records; a single record shape is required. \
         Narrow the query or normalize the records (e.g. with `fuse`)"
    )]
    HeterogeneousShape { shapes: u64 },

    #[error("Request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("Request to {url} returned HTTP {status}: {body}")]
    HttpStatus { url: String, status: u16, body: String },

    #[error("Invalid response from lake: {0}")]
    InvalidResponse(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

fn pool_required_message(available: &[String]) -> String {
    if available.is_empty() {
        "A pool must be specified. No pools exist in the lake".to_string()
    } else {
        format!(
            "A pool must be specified. Available pools: {}",
            available.join(", ")
        )
    }
}

impl AppError {
    /// Stable machine-readable code for this error
    pub fn code(&self) -> &'static str {
        match self {
            AppError::MissingPool | AppError::PoolRequired { .. } => "POOL_REQUIRED",
            AppError::NoDataInRange => "NO_DATA",
            AppError::HeterogeneousShape { .. } => "HETEROGENEOUS_SHAPE",
            AppError::Transport { .. } | AppError::HttpStatus { .. } => "TRANSPORT_ERROR",
            AppError::InvalidResponse(_) => "INVALID_RESPONSE",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::MissingPool | AppError::PoolRequired { .. } | AppError::Validation(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::NoDataInRange => StatusCode::NOT_FOUND,
            AppError::HeterogeneousShape { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Transport { .. }
            | AppError::HttpStatus { .. }
            | AppError::InvalidResponse(_) => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Diagnostic carried by a failed series
    pub fn to_detail(&self) -> ErrorDetail {
        let detail = ErrorDetail::new(self.code(), self.to_string());
        match self {
            AppError::HttpStatus { status, .. } => detail.with_details(format!("HTTP {}", status)),
            AppError::Transport { url, .. } => detail.with_details(url.clone()),
            _ => detail,
        }
    }
}

/// Error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorDetail {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(ErrorResponse {
            error: self.to_detail(),
        });

        (status, body).into_response()
    }
}
