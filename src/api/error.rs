//! HTTP error responses

use crate::error::ServiceError;
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

#[derive(Debug)]
pub enum ApiError {
    /// Body parsed as JSON but a field is missing or has the wrong type
    Validation(String),

    /// Any other rejected request body (bad syntax, wrong content type)
    Rejected(StatusCode, String),

    InternalError(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            ApiError::Validation(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg.as_str()),
            ApiError::Rejected(status, msg) => (*status, msg.as_str()),
            ApiError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        let body = Json(json!({
            "error": error_message,
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::JsonDataError(err) => ApiError::Validation(err.body_text()),
            other => ApiError::Rejected(other.status(), other.body_text()),
        }
    }
}

/// Request bodies are validated during extraction, so a scoring error is
/// always a server-side failure
impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        ApiError::InternalError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_maps_to_422() {
        let response = ApiError::Validation("delinq_2yrs: expected a whole number".to_string())
            .into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_inference_failure_maps_to_500() {
        let response =
            ApiError::from(ServiceError::Inference("boom".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
