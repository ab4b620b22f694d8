use async_trait::async_trait;
use uuid::Uuid;

use crate::contract::model::User;

/// Persistence port of the user directory.
#[async_trait]
pub trait UsersRepository: Send + Sync {
    async fn list(&self) -> anyhow::Result<Vec<User>>;
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>>;
    /// Case-insensitive; `except` skips one user (the one being updated).
    async fn email_exists(&self, email: &str, except: Option<Uuid>) -> anyhow::Result<bool>;
    async fn insert(&self, user: User, password: Option<String>) -> anyhow::Result<()>;
    /// `password: None` keeps the current one.
    async fn update(&self, user: User, password: Option<String>) -> anyhow::Result<bool>;
    async fn delete(&self, id: Uuid) -> anyhow::Result<bool>;
    /// Cheap round trip used by the connectivity probe; returns the user count.
    async fn ping(&self) -> anyhow::Result<usize>;
}
