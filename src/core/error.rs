//! Typed error handling for invoice-desk
//!
//! Mutation handlers never let an error escape: they fold failures into a
//! `FormState`. The types here cover everything else that talks HTTP, such
//! as page loads, the session gate and body extraction.
//!
//! # Error Categories
//!
//! - [`StorageError`]: Errors raised by a storage backend
//! - [`RequestError`]: Malformed or unauthorized requests
//! - [`ConfigError`]: Configuration parsing and validation
//!
//! # Example
//!
//! ```rust,ignore
//! async fn load(service: &dyn InvoiceService, id: &str) -> Result<Invoice, AppError> {
//!     service
//!         .fetch_invoice_by_id(id)
//!         .await
//!         .map_err(AppError::from_service)?
//!         .ok_or_else(|| AppError::NotFound {
//!             resource: "invoice".to_string(),
//!             id: id.to_string(),
//!         })
//! }
//! ```

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

/// The main error type for the HTTP surface
#[derive(Debug, Error)]
pub enum AppError {
    /// A record addressed by id does not exist
    #[error("{resource} with id '{id}' not found")]
    NotFound { resource: String, id: String },

    /// Storage backend errors
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// HTTP/Request errors
    #[error(transparent)]
    Request(#[from] RequestError),

    /// Configuration errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Anything a service reported that is not one of the above
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response structure for HTTP responses
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
}

impl AppError {
    /// Recover a typed error from a service's `anyhow::Error`
    pub fn from_service(err: anyhow::Error) -> Self {
        match err.downcast::<StorageError>() {
            Ok(storage) => AppError::Storage(storage),
            Err(other) => AppError::Internal(other.to_string()),
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Storage(e) => e.status_code(),
            AppError::Request(e) => e.status_code(),
            AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::NotFound { .. } => "NOT_FOUND",
            AppError::Storage(e) => e.error_code(),
            AppError::Request(e) => e.error_code(),
            AppError::Config(_) => "CONFIG_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Convert to an error response
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.error_code().to_string(),
            message: self.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.error_code(), error = %self, "request failed");
        }
        let body = Json(self.to_response());
        (status, body).into_response()
    }
}

// =============================================================================
// Storage Errors
// =============================================================================

/// Errors related to storage backends
#[derive(Debug, Error)]
pub enum StorageError {
    /// Connection error
    #[error("Failed to connect to {backend}: {message}")]
    Connection { backend: String, message: String },

    /// Statement execution error
    #[error("Database Error: {message}")]
    Query { backend: String, message: String },

    /// A row would break a reference or constraint
    #[error("Database Error: {message}")]
    Integrity { message: String },

    /// Backend not available
    #[error("Storage backend '{backend}' is unavailable")]
    Unavailable { backend: String },
}

impl StorageError {
    pub fn query(backend: &str, err: impl std::fmt::Display) -> Self {
        StorageError::Query {
            backend: backend.to_string(),
            message: err.to_string(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            StorageError::Unavailable { .. } | StorageError::Connection { .. } => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            StorageError::Query { .. } | StorageError::Integrity { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            StorageError::Connection { .. } => "STORAGE_CONNECTION_ERROR",
            StorageError::Query { .. } => "STORAGE_QUERY_ERROR",
            StorageError::Integrity { .. } => "STORAGE_INTEGRITY_ERROR",
            StorageError::Unavailable { .. } => "STORAGE_UNAVAILABLE",
        }
    }
}

// =============================================================================
// Request Errors
// =============================================================================

/// Errors related to HTTP requests
#[derive(Debug, Error)]
pub enum RequestError {
    /// Invalid request body
    #[error("Invalid request body: {message}")]
    InvalidBody { message: String },

    /// Query string that does not fit the page's parameters
    #[error("Invalid query string: {message}")]
    InvalidQuery { message: String },

    /// Unsupported content type for a form submission
    #[error("Unsupported content type: {content_type}")]
    UnsupportedMediaType { content_type: String },

    /// Missing or unknown session
    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },
}

impl RequestError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RequestError::InvalidBody { .. } | RequestError::InvalidQuery { .. } => {
                StatusCode::BAD_REQUEST
            }
            RequestError::UnsupportedMediaType { .. } => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            RequestError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            RequestError::InvalidBody { .. } => "INVALID_BODY",
            RequestError::InvalidQuery { .. } => "INVALID_QUERY",
            RequestError::UnsupportedMediaType { .. } => "UNSUPPORTED_MEDIA_TYPE",
            RequestError::Unauthorized { .. } => "UNAUTHORIZED",
        }
    }
}

// =============================================================================
// Config Errors
// =============================================================================

/// Errors related to configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to parse configuration file
    #[error(
        "Failed to parse config{}: {}",
        .file.as_ref().map(|f| format!(" file '{}'", f)).unwrap_or_default(),
        .message
    )]
    ParseError {
        file: Option<String>,
        message: String,
    },

    /// Missing required field in configuration
    #[error("Missing required field '{field}' in {context}")]
    MissingField { field: String, context: String },

    /// Invalid value in configuration
    #[error("Invalid value '{value}' for field '{field}': {message}")]
    InvalidValue {
        field: String,
        value: String,
        message: String,
    },

    /// IO error while reading configuration
    #[error("IO error: {message}")]
    IoError { message: String },
}
