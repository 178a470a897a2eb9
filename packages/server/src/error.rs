//! Mapping of domain failures to HTTP responses.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use locofinder_database::DbError;
use locofinder_server_models::{ApiErrorBody, ValidationError};

/// An error returned from a handler.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request was malformed or out of range.
    #[error("{0}")]
    BadRequest(String),

    /// The requested location does not exist.
    #[error("Location not found: {0}")]
    NotFound(String),

    /// The record source failed.
    #[error("Failed to query locations")]
    Store(#[from] DbError),
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        Self::BadRequest(e.to_string())
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let Self::Store(e) = self {
            log::error!("Record source failure: {e}");
        }
        HttpResponse::build(self.status_code()).json(ApiErrorBody {
            error: self.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn status_codes() {
        assert_eq!(
            ApiError::BadRequest("x".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::NotFound("LOC-1".to_string()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(DbError::Timeout {
                after: Duration::from_secs(1)
            })
            .status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn store_errors_do_not_leak_details() {
        let err = ApiError::from(DbError::PoolPoisoned);
        assert_eq!(err.to_string(), "Failed to query locations");
    }
}
