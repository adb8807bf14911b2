use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

/// Error body shared by every endpoint.
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiError {
    /// Human-readable message, safe to show to the user
    pub error: String,
}

pub fn error_response(status: StatusCode, msg: &str) -> Response {
    (
        status,
        Json(ApiError {
            error: msg.to_string(),
        }),
    )
        .into_response()
}

pub fn json_response<T>(status: StatusCode, data: T) -> Response
where
    T: Serialize,
{
    (status, Json(data)).into_response()
}
