use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::contract::model::{ArticlePatch, ArticleStatus, NewArticle, NewsArticle};
use crate::domain::error::DomainError;
use crate::domain::repo::NewsRepository;

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub max_title_length: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            max_title_length: 200,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ArticleFilter {
    pub status: Option<String>,
    pub category: Option<String>,
}

/// Who is reading: the public sees published articles only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    Public,
    Editor,
}

#[derive(Clone)]
pub struct Service {
    repo: Arc<dyn NewsRepository>,
    config: ServiceConfig,
}

impl Service {
    pub fn new(repo: Arc<dyn NewsRepository>, config: ServiceConfig) -> Self {
        Self { repo, config }
    }

    /// Newest first.
    #[instrument(name = "news.service.list", skip(self))]
    pub async fn list(
        &self,
        audience: Audience,
        filter: ArticleFilter,
    ) -> Result<Vec<NewsArticle>, DomainError> {
        let status = filter
            .status
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(parse_status)
            .transpose()?;
        let category = filter.category.filter(|c| !c.is_empty());

        let mut articles: Vec<_> = self
            .repo
            .list()
            .await?
            .into_iter()
            .filter(|a| audience == Audience::Editor || a.is_public())
            .filter(|a| status.map_or(true, |s| a.status == s))
            .filter(|a| {
                category
                    .as_deref()
                    .map_or(true, |c| a.category.eq_ignore_ascii_case(c))
            })
            .collect();
        articles.sort_by(|a, b| b.recency().cmp(&a.recency()));
        debug!(count = articles.len(), "articles listed");
        Ok(articles)
    }

    /// Unpublished articles are reported as missing to the public.
    #[instrument(name = "news.service.get", skip(self))]
    pub async fn get(&self, audience: Audience, id: Uuid) -> Result<NewsArticle, DomainError> {
        self.repo
            .find_by_id(id)
            .await?
            .filter(|a| audience == Audience::Editor || a.is_public())
            .ok_or_else(|| DomainError::not_found(id))
    }

    #[instrument(name = "news.service.create", skip(self, new), fields(title = %new.title))]
    pub async fn create(&self, new: NewArticle) -> Result<NewsArticle, DomainError> {
        let title = self.validate_title(&new.title)?;
        let content = required("content", &new.content)?;
        let author = required("author", &new.author)?;
        let status = new
            .status
            .as_deref()
            .map(parse_status)
            .transpose()?
            .unwrap_or_default();

        let now = Utc::now();
        let article = NewsArticle {
            id: Uuid::new_v4(),
            title,
            excerpt: new.excerpt.trim().to_string(),
            content,
            category: new.category.trim().to_string(),
            author,
            image: new.image.filter(|i| !i.trim().is_empty()),
            status,
            published_at: (status == ArticleStatus::Published).then_some(now),
            created_at: now,
            updated_at: now,
        };
        self.repo.insert(article.clone()).await?;
        info!(id = %article.id, %status, "article created");
        Ok(article)
    }

    #[instrument(name = "news.service.update", skip(self, patch))]
    pub async fn update(&self, id: Uuid, patch: ArticlePatch) -> Result<NewsArticle, DomainError> {
        let mut article = self.get(Audience::Editor, id).await?;

        if let Some(title) = patch.title {
            article.title = self.validate_title(&title)?;
        }
        if let Some(content) = patch.content {
            article.content = required("content", &content)?;
        }
        if let Some(author) = patch.author {
            article.author = required("author", &author)?;
        }
        if let Some(excerpt) = patch.excerpt {
            article.excerpt = excerpt.trim().to_string();
        }
        if let Some(category) = patch.category {
            article.category = category.trim().to_string();
        }
        if let Some(image) = patch.image {
            article.image = Some(image).filter(|i| !i.trim().is_empty());
        }
        let now = Utc::now();
        if let Some(status) = patch.status {
            article.status = parse_status(&status)?;
            if article.status == ArticleStatus::Published && article.published_at.is_none() {
                article.published_at = Some(now);
            }
        }
        article.updated_at = now;

        if !self.repo.update(article.clone()).await? {
            return Err(DomainError::not_found(id));
        }
        info!(status = %article.status, "article updated");
        Ok(article)
    }

    #[instrument(name = "news.service.delete", skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        if !self.repo.delete(id).await? {
            return Err(DomainError::not_found(id));
        }
        info!("article deleted");
        Ok(())
    }

    fn validate_title(&self, raw: &str) -> Result<String, DomainError> {
        let title = required("title", raw)?;
        let len = title.chars().count();
        if len > self.config.max_title_length {
            return Err(DomainError::validation(
                "title",
                format!(
                    "title too long: {len} characters (max: {})",
                    self.config.max_title_length
                ),
            ));
        }
        Ok(title)
    }
}

fn required(field: &'static str, value: &str) -> Result<String, DomainError> {
    let v = value.trim();
    if v.is_empty() {
        Err(DomainError::validation(field, format!("{field} is required")))
    } else {
        Ok(v.to_string())
    }
}

fn parse_status(raw: &str) -> Result<ArticleStatus, DomainError> {
    raw.parse().map_err(|e: String| DomainError::validation("status", e))
}
