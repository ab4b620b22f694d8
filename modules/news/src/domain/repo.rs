use async_trait::async_trait;
use uuid::Uuid;

use crate::contract::model::NewsArticle;

#[async_trait]
pub trait NewsRepository: Send + Sync {
    async fn list(&self) -> anyhow::Result<Vec<NewsArticle>>;
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<NewsArticle>>;
    async fn insert(&self, article: NewsArticle) -> anyhow::Result<()>;
    /// Replace by `article.id`; `false` when it no longer exists.
    async fn update(&self, article: NewsArticle) -> anyhow::Result<bool>;
    async fn delete(&self, id: Uuid) -> anyhow::Result<bool>;
}
