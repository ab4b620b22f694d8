use axum::{http::StatusCode, Json};
use serde::Serialize;

use super::envelope::ApiEnvelope;

pub type Envelope<T> = (StatusCode, Json<ApiEnvelope<T>>);

/// 200 + `{success: true, data}`
pub fn ok<T: Serialize>(data: T) -> Envelope<T> {
    (StatusCode::OK, Json(ApiEnvelope::ok(data)))
}

/// 201 + `{success: true, data, message}`
pub fn created<T: Serialize>(data: T, message: impl Into<String>) -> Envelope<T> {
    (
        StatusCode::CREATED,
        Json(ApiEnvelope::ok(data).with_message(message)),
    )
}

/// 200 + `{success: true, data, message}`
pub fn ok_with_message<T: Serialize>(data: T, message: impl Into<String>) -> Envelope<T> {
    (StatusCode::OK, Json(ApiEnvelope::ok(data).with_message(message)))
}

/// 200 + `{success: true, message}`
pub fn message(message: impl Into<String>) -> Envelope<()> {
    (StatusCode::OK, Json(ApiEnvelope::message(message)))
}
