use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use super::envelope::ApiEnvelope;

/// Error taxonomy of the HTTP boundary.
///
/// Each module maps its domain errors into this type; handlers return
/// `ApiResult<_>` and use `?`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Unauthenticated(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    BadGateway(String),
    #[error("{0}")]
    Unavailable(String),
    /// Details are logged, never sent to the client.
    #[error("internal error")]
    Internal(#[source] anyhow::Error),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn unauthenticated() -> Self {
        Self::Unauthenticated("Authentication required".into())
    }

    pub fn forbidden(capability: impl std::fmt::Display) -> Self {
        Self::Forbidden(format!("Insufficient permissions: '{capability}' required"))
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn internal(err: impl Into<anyhow::Error>) -> Self {
        Self::Internal(err.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::BadGateway(_) => StatusCode::BAD_GATEWAY,
            Self::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Text placed in the envelope's `error` field.
    pub fn public_message(&self) -> String {
        match self {
            Self::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            Self::Internal(err) => tracing::error!(error = ?err, "request failed"),
            e if status.is_server_error() => {
                tracing::error!(status = status.as_u16(), error = %e, "request failed")
            }
            e => tracing::warn!(status = status.as_u16(), error = %e, "request rejected"),
        }
        (status, Json(ApiEnvelope::failure(self.public_message()))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_taxonomy() {
        let cases = [
            (ApiError::unauthenticated(), 401),
            (ApiError::forbidden("news"), 403),
            (ApiError::validation("title is required"), 400),
            (ApiError::not_found("Event not found"), 404),
            (ApiError::conflict("email already in use"), 409),
            (ApiError::BadGateway("backend unreachable".into()), 502),
            (ApiError::Unavailable("probe timed out".into()), 503),
            (ApiError::internal(anyhow::anyhow!("disk on fire")), 500),
        ];
        for (err, code) in cases {
            assert_eq!(err.status().as_u16(), code, "{err:?}");
        }
    }

    #[test]
    fn internal_details_stay_private() {
        let err = ApiError::internal(anyhow::anyhow!("password=hunter2"));
        assert_eq!(err.public_message(), "Internal server error");
        assert!(ApiError::forbidden("users").public_message().contains("'users'"));
    }
}
