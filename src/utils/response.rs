use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Body of a successful create: the new resource's identity plus a message.
#[derive(Serialize)]
pub struct CreatedResponse<T>
where
    T: Serialize,
{
    #[serde(flatten)]
    pub created: T,
    pub message: String,
}

#[derive(Serialize)]
pub struct ApiErrorResponse {
    pub error: String,
    pub code: String,
}

pub fn success<T>(data: T) -> impl IntoResponse
where
    T: Serialize,
{
    (StatusCode::OK, Json(data))
}

pub fn created<T>(created: T, message: impl Into<String>) -> impl IntoResponse
where
    T: Serialize,
{
    let body = CreatedResponse {
        created,
        message: message.into(),
    };
    (StatusCode::OK, Json(body))
}

pub fn message(message: impl Into<String>) -> impl IntoResponse {
    let body = MessageResponse {
        message: message.into(),
    };
    (StatusCode::OK, Json(body))
}

pub fn error(code: &str, message: impl Into<String>, status: StatusCode) -> Response {
    let body = ApiErrorResponse {
        error: message.into(),
        code: code.to_string(),
    };

    (status, Json(body)).into_response()
}
