use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Event not found: {id}")]
    NotFound { id: String },

    #[error("{message}")]
    Validation { field: &'static str, message: String },

    #[error("Storage error: {0}")]
    Storage(#[source] anyhow::Error),
}

impl DomainError {
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
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
