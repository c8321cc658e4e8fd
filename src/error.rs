use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::infra::{ResolutionError, StoreError};

/// Failures a handler converts into an error response.
#[derive(Error, Debug)]
pub enum AppError {
    /// Lookup target is not a well-formed domain.
    #[error("Not Found")]
    NotFound,

    /// History is empty.
    #[error("No Records Found")]
    NoRecords,

    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound | AppError::NoRecords => StatusCode::NOT_FOUND,
            AppError::MalformedRequest(_)
            | AppError::Resolution(_)
            | AppError::Store(_)
            | AppError::Serialization(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Message placed in the response envelope. Internal details are logged,
    /// never returned.
    pub fn public_message(&self) -> &'static str {
        match self {
            AppError::NotFound => "Not Found",
            AppError::NoRecords => "No Records Found",
            AppError::MalformedRequest(_)
            | AppError::Resolution(_)
            | AppError::Store(_)
            | AppError::Serialization(_) => "Bad Request",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            AppError::NotFound | AppError::NoRecords => {
                tracing::debug!(error = %self, "Responding not found");
            }
            _ => tracing::warn!(error = %self, "Request failed"),
        }

        let body = Json(json!({ "message": self.public_message() }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(AppError::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::NoRecords.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::MalformedRequest("missing domain".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::from(ResolutionError::Timeout("example.com".into())).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::from(StoreError::Config("bad url".into())).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_internal_details_are_not_exposed() {
        let err = AppError::from(ResolutionError::Lookup("nameserver 10.0.0.2 refused".into()));
        assert_eq!(err.public_message(), "Bad Request");
    }
}
