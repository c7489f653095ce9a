//! Service-level error taxonomy.
//!
//! Every module has its own `thiserror` enum; at the HTTP boundary they are
//! folded into [`ServiceError`], which decides the status code.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use crate::birth::BirthDataError;

/// Errors surfaced to HTTP callers.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Malformed or missing request fields.
    #[error("{0}")]
    Validation(String),

    /// A provider was unreachable and no fallback could stand in for it.
    /// The message is returned to the caller verbatim.
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// Anything unexpected. The message is logged, never returned.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// HTTP status code for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::UpstreamUnavailable(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<BirthDataError> for ServiceError {
    fn from(err: BirthDataError) -> Self {
        Self::Validation(format!("Data parsing error: {}", err))
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            Self::Validation(message) => serde_json::json!({ "error": message }),
            Self::UpstreamUnavailable(message) => {
                log::warn!("{}", self);
                serde_json::json!({ "error": message })
            }
            Self::Internal(_) => {
                log::error!("{}", self);
                serde_json::json!({ "error": "Internal server error" })
            }
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::birth::BirthField;

    #[test]
    fn test_validation_maps_to_bad_request() {
        let err = ServiceError::Validation("Message is required".to_string());
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_birth_error_keeps_field_name() {
        let err: ServiceError = BirthDataError::MissingField(BirthField::Place).into();
        assert!(matches!(&err, ServiceError::Validation(msg) if msg.contains("Birth place is required")));
    }

    #[test]
    fn test_internal_hides_detail() {
        let err = ServiceError::Internal("token=abc".to_string());
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
