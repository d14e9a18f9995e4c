//! Request error types
//!
//! Every failure on the query path maps to one HTTP status code.

use hyper::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("Content-Type must be application/json, got '{0}'")]
    UnsupportedMediaType(String),
    #[error("Request body is empty")]
    EmptyBody,
    #[error("Failed to decode JSON body: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("Request body exceeds {limit} bytes")]
    PayloadTooLarge { limit: u64 },
    #[error("Failed to read request body: {0}")]
    BodyRead(String),
    #[allow(dead_code)]
    #[error("Processing failed: {0}")]
    Processing(String),
}

impl QueryError {
    /// HTTP status returned to the client for this error
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::EmptyBody | Self::InvalidJson(_) | Self::BodyRead(_) => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Processing(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            QueryError::UnsupportedMediaType("text/plain".to_string()).status(),
            StatusCode::UNSUPPORTED_MEDIA_TYPE
        );
        assert_eq!(QueryError::EmptyBody.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            QueryError::PayloadTooLarge { limit: 16 }.status(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            QueryError::Processing("boom".to_string()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_invalid_json_is_client_error() {
        let err: QueryError = serde_json::from_str::<serde_json::Value>("{not json")
            .unwrap_err()
            .into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(err.to_string().starts_with("Failed to decode JSON body"));
    }
}
