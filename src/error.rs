//! Error handling module
//!
//! Provides unified error types and handling for the entire application.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

/// Failures raised by the data-access layer
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] tokio_postgres::Error),

    #[error("Pool error: {0}")]
    Pool(#[from] deadpool_postgres::PoolError),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Whether the failure happened before a connection could be obtained
    fn is_unavailable(&self) -> bool {
        matches!(self, StoreError::Pool(_) | StoreError::Unavailable(_))
    }
}

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Listing failed; reported with the generic fetch message
    #[error("Failed to fetch cars: {0}")]
    FetchFailed(StoreError),

    #[error("{0}")]
    Store(#[from] StoreError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("No route for {0}")]
    NoRoute(String),

    #[error("Method not allowed: {0}")]
    MethodNotAllowed(String),
}

/// `{ "error": ... }` body used for client-facing failures
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// `{ "success": false, "message": ..., "data": null }` body used for store failures
#[derive(Serialize)]
pub struct FailureEnvelope {
    pub success: bool,
    pub message: String,
    pub data: Option<()>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::FetchFailed(e) => {
                error!("Failed to fetch cars: {:?}", e);
                error_body(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch cars")
            }
            AppError::Store(e) => {
                let (status, message) = if e.is_unavailable() {
                    error!("Store unavailable: {:?}", e);
                    (
                        StatusCode::SERVICE_UNAVAILABLE,
                        "Database connection unavailable",
                    )
                } else {
                    error!("Database error: {:?}", e);
                    (StatusCode::INTERNAL_SERVER_ERROR, "A database error occurred")
                };

                let body = Json(FailureEnvelope {
                    success: false,
                    message: message.to_string(),
                    data: None,
                });
                (status, body).into_response()
            }
            AppError::Validation(msg) => error_body(StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => error_body(StatusCode::BAD_REQUEST, msg),
            AppError::BadRequest(msg) => {
                warn!("Rejected request body: {}", msg);
                error_body(StatusCode::BAD_REQUEST, msg)
            }
            AppError::NoRoute(route) => {
                warn!("No route for {}", route);
                error_body(StatusCode::NOT_FOUND, "Not found")
            }
            AppError::MethodNotAllowed(route) => {
                warn!("Method not allowed: {}", route);
                error_body(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
            }
        }
    }
}

fn error_body(status: StatusCode, message: impl Into<String>) -> Response {
    let body = Json(ErrorResponse {
        error: message.into(),
    });
    (status, body).into_response()
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

/// Result type alias for API handlers
pub type ApiResult<T> = Result<T, AppError>;

/// Helper function to create a validation error
pub fn validation_error(msg: impl Into<String>) -> AppError {
    AppError::Validation(msg.into())
}

/// Helper function to create a not found error
pub fn not_found_error(msg: impl Into<String>) -> AppError {
    AppError::NotFound(msg.into())
}
