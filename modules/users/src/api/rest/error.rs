use modkit::ApiError;

use crate::domain::error::DomainError;

impl From<DomainError> for ApiError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::UserNotFound { .. } => ApiError::not_found("User not found"),
            DomainError::EmailAlreadyExists { .. } => ApiError::conflict(e.to_string()),
            DomainError::InvalidEmail { .. }
            | DomainError::EmptyName
            | DomainError::NameTooLong { .. }
            | DomainError::EmptyPassword
            | DomainError::UnknownRole { .. }
            | DomainError::SelfAction(_) => ApiError::Validation(e.to_string()),
            DomainError::ProbeTimeout(_) => ApiError::Unavailable(e.to_string()),
            DomainError::Storage(err) => ApiError::Internal(err),
        }
    }
}
