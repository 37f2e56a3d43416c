//! API error type and HTTP response mapping.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use clientdesk_core::Error;

/// Errors surfaced at the HTTP boundary.
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Unauthorized(String),
    Internal(Error),
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            // Uniform not-found: never reveal whether the id was
            // malformed or the record truly absent.
            Error::ClientNotFound(_) | Error::NotFound(_) => {
                ApiError::NotFound("Client not found".to_string())
            }
            Error::InvalidInput(msg) => ApiError::BadRequest(msg),
            Error::Unauthorized(msg) => ApiError::Unauthorized(msg),
            other => ApiError::Internal(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Internal(err) => {
                tracing::error!(
                    subsystem = "api",
                    error = %err,
                    "Request failed with internal error"
                );
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(serde_json::json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_not_found_is_uniform() {
        let from_missing: ApiError = Error::ClientNotFound(Uuid::new_v4()).into();
        let from_named: ApiError = Error::NotFound("secret detail".to_string()).into();

        match (&from_missing, &from_named) {
            (ApiError::NotFound(a), ApiError::NotFound(b)) => assert_eq!(a, b),
            _ => panic!("both should map to NotFound"),
        }
    }

    #[test]
    fn test_invalid_input_maps_to_bad_request() {
        let err: ApiError = Error::InvalidInput("missing owner".to_string()).into();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[test]
    fn test_database_errors_are_internal() {
        let err: ApiError = Error::Internal("boom".to_string()).into();
        assert!(matches!(err, ApiError::Internal(_)));
    }
}
