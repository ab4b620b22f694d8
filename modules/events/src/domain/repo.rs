use async_trait::async_trait;

use crate::contract::model::Event;

/// Persistence port of the events domain.
#[async_trait]
pub trait EventsRepository: Send + Sync {
    async fn list(&self) -> anyhow::Result<Vec<Event>>;
    /// Assigns `id`, `created_at` and `updated_at`; the rest is kept.
    async fn create(&self, event: Event) -> anyhow::Result<Event>;
    /// Replaces the record with `event.id`, keeping its `created_at`.
    /// `None` when no such record exists.
    async fn update(&self, event: Event) -> anyhow::Result<Option<Event>>;
    async fn delete(&self, id: &str) -> anyhow::Result<bool>;
}
