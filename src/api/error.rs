use axum::{
    response::{IntoResponse, Response},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Pipeline error: {0}")]
    Pipeline(String),
    #[error("Bad request: {0}")]
    BadRequest(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    tokens: Vec<()>,
    error: String,
    message: &'static str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Pipeline(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Failed to load tokens"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "Unsupported request"),
        };

        let body = Json(ErrorResponse {
            success: false,
            tokens: Vec::new(),
            error: self.to_string(),
            message,
        });

        (status, body).into_response()
    }
}
