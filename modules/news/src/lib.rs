//! News articles: public reads of published items, editor CRUD behind the
//! `news` capability.

pub mod api;
pub mod config;
pub mod contract;
pub mod domain;
pub mod infra;
pub mod module;

pub use config::NewsConfig;
pub use contract::model::{ArticlePatch, ArticleStatus, NewArticle, NewsArticle};
pub use module::NewsModule;

pub const MODULE_NAME: &str = "news";
