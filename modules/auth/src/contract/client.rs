use async_trait::async_trait;

use crate::contract::{
    error::AuthError,
    model::{Identity, Session},
};

/// Published to the `ClientHub` as `dyn AuthGate`.
#[async_trait]
pub trait AuthGate: Send + Sync {
    /// `None` for unknown, expired or revoked tokens and for inactive accounts.
    async fn verify(&self, token: &str) -> Result<Option<Identity>, AuthError>;

    /// `None` when the credentials are rejected.
    async fn login(&self, email: &str, password: &str) -> Result<Option<Session>, AuthError>;

    async fn logout(&self, token: &str) -> Result<(), AuthError>;
}
