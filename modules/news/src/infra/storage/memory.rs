use async_trait::async_trait;
use dashmap::DashMap;
use uuid::Uuid;

use crate::contract::model::NewsArticle;
use crate::domain::repo::NewsRepository;

/// Process-local article store; contents reset on restart.
#[derive(Default)]
pub struct InMemoryNewsRepository {
    articles: DashMap<Uuid, NewsArticle>,
}

impl InMemoryNewsRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NewsRepository for InMemoryNewsRepository {
    async fn list(&self) -> anyhow::Result<Vec<NewsArticle>> {
        Ok(self.articles.iter().map(|a| a.value().clone()).collect())
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<NewsArticle>> {
        Ok(self.articles.get(&id).map(|a| a.clone()))
    }

    async fn insert(&self, article: NewsArticle) -> anyhow::Result<()> {
        self.articles.insert(article.id, article);
        Ok(())
    }

    async fn update(&self, article: NewsArticle) -> anyhow::Result<bool> {
        Ok(match self.articles.get_mut(&article.id) {
            Some(mut slot) => {
                *slot = article;
                true
            }
            None => false,
        })
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        Ok(self.articles.remove(&id).is_some())
    }
}
