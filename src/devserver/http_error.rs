use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Error bodies carry `message`, which is what the client surfaces.
fn error(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(serde_json::json!({"status": "error", "message": message})),
    )
        .into_response()
}

pub(super) fn unauthorized(message: &str) -> Response {
    error(StatusCode::UNAUTHORIZED, message)
}

pub(super) fn bad_request(message: &str) -> Response {
    error(StatusCode::BAD_REQUEST, message)
}

pub(super) fn not_found(what: &str) -> Response {
    error(StatusCode::NOT_FOUND, &format!("{} not found", what))
}

pub(super) fn conflict(message: &str) -> Response {
    error(StatusCode::CONFLICT, message)
}

pub(super) fn internal_error(err: anyhow::Error) -> Response {
    error(StatusCode::INTERNAL_SERVER_ERROR, &format!("{:#}", err))
}
