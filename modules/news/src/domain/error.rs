use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Article not found: {id}")]
    NotFound { id: Uuid },

    #[error("{message}")]
    Validation { field: &'static str, message: String },

    #[error("Storage error: {0}")]
    Storage(#[source] anyhow::Error),
}

impl DomainError {
    pub fn not_found(id: Uuid) -> Self {
        Self::NotFound { id }
    }

    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }
}

impl From<anyhow::Error> for DomainError {
    fn from(e: anyhow::Error) -> Self {
        Self::Storage(e)
    }
}
