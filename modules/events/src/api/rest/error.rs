use modkit::ApiError;

use crate::domain::error::DomainError;

impl From<DomainError> for ApiError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::NotFound { .. } => ApiError::not_found("Event not found"),
            DomainError::Validation { message, .. } => ApiError::Validation(message),
            DomainError::Storage(err) => ApiError::Internal(err),
        }
    }
}
