use modkit::ApiError;

use crate::contract::error::AuthError;

/// A failing auth backend is our failure, not the caller's.
impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        ApiError::internal(e)
    }
}
