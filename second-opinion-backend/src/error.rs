//! Error types for the note store, the generation client and the opinion relay.
//!
//! Each enum maps onto an HTTP status through `ResponseError`, so controllers
//! can return them directly with `?`.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use second_opinion_types::ErrorResponse;
use thiserror::Error;

/// Failures of the note store
#[derive(Error, Debug)]
pub enum StoreError {
    /// Required input missing or empty
    #[error("{0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("Failed to prepare database location: {0}")]
    Io(#[from] std::io::Error),

    /// The blocking task running the query was cancelled or panicked
    #[error("Database task failed: {0}")]
    Task(String),
}

/// Failures of the external text-generation capability
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("Request to inference endpoint failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Inference endpoint returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed stream chunk: {0}")]
    Malformed(String),

    #[error("Inference stream interrupted: {0}")]
    Body(String),
}

/// Terminal failure of an opinion stream
#[derive(Error, Debug)]
pub enum RelayError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error("Generation cancelled")]
    Cancelled,
}

impl ResponseError for StoreError {
    fn status_code(&self) -> StatusCode {
        match self {
            StoreError::Validation(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse::new(self.to_string()))
    }
}

impl ResponseError for RelayError {
    fn status_code(&self) -> StatusCode {
        match self {
            RelayError::Store(e) => e.status_code(),
            RelayError::Generation(_) => StatusCode::BAD_GATEWAY,
            RelayError::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse::new(self.to_string()))
    }
}
