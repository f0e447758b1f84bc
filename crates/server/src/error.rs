use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Json as ResponseJson, Response},
};
use thiserror::Error;
use utils::response::ApiResponse;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    InvalidBody(#[from] JsonRejection),
    #[error(transparent)]
    InvalidQuery(#[from] QueryRejection),
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::InvalidBody(rejection) => (rejection.status(), rejection.body_text()),
            ApiError::InvalidQuery(rejection) => (rejection.status(), rejection.body_text()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
        };

        tracing::debug!(status = %status, "Rejected request: {}", message);
        (status, ResponseJson(ApiResponse::<()>::error(message))).into_response()
    }
}
