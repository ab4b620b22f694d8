use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::contract::model::{ArticlePatch, ArticleStatus, NewArticle, NewsArticle};
use crate::domain::service::ArticleFilter;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleDto {
    pub id: Uuid,
    pub title: String,
    pub excerpt: String,
    pub content: String,
    pub category: String,
    pub author: String,
    pub image: Option<String>,
    pub status: ArticleStatus,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<NewsArticle> for ArticleDto {
    fn from(a: NewsArticle) -> Self {
        Self {
            id: a.id,
            title: a.title,
            excerpt: a.excerpt,
            content: a.content,
            category: a.category,
            author: a.author,
            image: a.image,
            status: a.status,
            published_at: a.published_at,
            created_at: a.created_at,
            updated_at: a.updated_at,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArticleReq {
    pub title: Option<String>,
    pub excerpt: Option<String>,
    pub content: Option<String>,
    pub category: Option<String>,
    pub author: Option<String>,
    pub image: Option<String>,
    pub status: Option<String>,
}

impl ArticleReq {
    /// `author` falls back to the name of the editor creating the article.
    pub fn into_new(self, editor: &str) -> NewArticle {
        NewArticle {
            title: self.title.unwrap_or_default(),
            excerpt: self.excerpt.unwrap_or_default(),
            content: self.content.unwrap_or_default(),
            category: self.category.unwrap_or_default(),
            author: self
                .author
                .filter(|a| !a.trim().is_empty())
                .unwrap_or_else(|| editor.to_string()),
            image: self.image,
            status: self.status,
        }
    }
}

impl From<ArticleReq> for ArticlePatch {
    fn from(r: ArticleReq) -> Self {
        Self {
            title: r.title,
            excerpt: r.excerpt,
            content: r.content,
            category: r.category,
            author: r.author,
            image: r.image,
            status: r.status,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListNewsQuery {
    pub status: Option<String>,
    pub category: Option<String>,
}

impl From<ListNewsQuery> for ArticleFilter {
    fn from(q: ListNewsQuery) -> Self {
        Self {
            status: q.status,
            category: q.category,
        }
    }
}
