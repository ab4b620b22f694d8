use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::Context;
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;

use super::defaults::default_events;
use super::snapshot::SnapshotSource;
use crate::contract::model::Event;
use crate::domain::repo::EventsRepository;

/// Tier that produced a `list` result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListSource {
    Snapshot,
    Cache,
    File,
    /// The file was missing and has just been written with the defaults.
    SeededFile,
    /// Storage unusable; defaults returned without being persisted or cached.
    Defaults,
}

#[derive(Default)]
struct Cache {
    events: Option<Vec<Event>>,
    /// Set once a mutation is accepted; from then on the cache shadows the snapshot.
    mutated: bool,
}

/// Event collection backed, per call, by the first usable tier:
/// snapshot → cache → data file → defaults.
///
/// Writes go to the cache synchronously and to the data file best-effort.
/// The cache lock is never held across an `.await`; concurrent writers are
/// last-write-wins.
pub struct TieredEventStore {
    snapshot: Box<dyn SnapshotSource>,
    data_file: PathBuf,
    cache: Mutex<Cache>,
}

impl TieredEventStore {
    pub fn new(snapshot: impl SnapshotSource + 'static, data_file: impl Into<PathBuf>) -> Self {
        Self {
            snapshot: Box::new(snapshot),
            data_file: data_file.into(),
            cache: Mutex::new(Cache::default()),
        }
    }

    pub fn data_file(&self) -> &Path {
        &self.data_file
    }

    pub async fn list_with_source(&self) -> (Vec<Event>, ListSource) {
        {
            let cache = self.cache.lock();
            if cache.mutated {
                if let Some(events) = &cache.events {
                    return (events.clone(), ListSource::Cache);
                }
            }
        }

        if let Some(events) = self.read_snapshot() {
            return (events, ListSource::Snapshot);
        }

        if let Some(events) = self.cache.lock().events.clone() {
            return (events, ListSource::Cache);
        }

        let (events, source) = match self.read_file().await {
            Ok(Some(events)) => (events, ListSource::File),
            Ok(None) => match self.seed_file().await {
                Ok(events) => (events, ListSource::SeededFile),
                Err(e) => {
                    tracing::warn!(error = %e, path = %self.data_file.display(), "cannot seed events file, serving defaults");
                    return (default_events(), ListSource::Defaults);
                }
            },
            Err(e) => {
                tracing::warn!(error = %e, path = %self.data_file.display(), "cannot read events file, serving defaults");
                return (default_events(), ListSource::Defaults);
            }
        };

        let mut cache = self.cache.lock();
        // A writer may have won the race while the file was being read.
        if let Some(current) = &cache.events {
            return (current.clone(), ListSource::Cache);
        }
        cache.events = Some(events.clone());
        (events, source)
    }

    fn read_snapshot(&self) -> Option<Vec<Event>> {
        let raw = self.snapshot.load()?;
        match serde_json::from_str(&raw) {
            Ok(events) => Some(events),
            Err(e) => {
                tracing::warn!(error = %e, "ignoring unparsable events snapshot");
                None
            }
        }
    }

    /// `Ok(None)` when the file does not exist.
    async fn read_file(&self) -> anyhow::Result<Option<Vec<Event>>> {
        let bytes = match tokio::fs::read(&self.data_file).await {
            Ok(b) => b,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let events = serde_json::from_slice(&bytes)
            .with_context(|| format!("invalid JSON in {}", self.data_file.display()))?;
        Ok(Some(events))
    }

    async fn seed_file(&self) -> anyhow::Result<Vec<Event>> {
        self.write_file(&default_events()).await?;
        tracing::info!(path = %self.data_file.display(), "events file seeded with defaults");
        self.read_file()
            .await?
            .context("events file vanished right after seeding")
    }

    async fn write_file(&self, events: &[Event]) -> anyhow::Result<()> {
        if let Some(dir) = self.data_file.parent().filter(|d| !d.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(dir).await?;
        }
        let json = serde_json::to_vec_pretty(events)?;
        tokio::fs::write(&self.data_file, json).await?;
        Ok(())
    }

    /// Accept `events` as the new collection, then try to persist it.
    async fn commit(&self, events: Vec<Event>) {
        {
            let mut cache = self.cache.lock();
            cache.events = Some(events.clone());
            cache.mutated = true;
        }
        if let Err(e) = self.write_file(&events).await {
            tracing::warn!(error = %e, path = %self.data_file.display(), "events file not updated, change kept in memory");
        }
    }
}

/// Millisecond timestamp, bumped while it collides with an existing id.
fn next_id(existing: &[Event]) -> String {
    let mut candidate = Utc::now().timestamp_millis();
    while existing.iter().any(|e| e.id == candidate.to_string()) {
        candidate += 1;
    }
    candidate.to_string()
}

#[async_trait]
impl EventsRepository for TieredEventStore {
    async fn list(&self) -> anyhow::Result<Vec<Event>> {
        let (events, source) = self.list_with_source().await;
        tracing::debug!(?source, count = events.len(), "events loaded");
        Ok(events)
    }

    async fn create(&self, mut event: Event) -> anyhow::Result<Event> {
        let (mut events, _) = self.list_with_source().await;
        let now = Utc::now();
        event.id = next_id(&events);
        event.created_at = now;
        event.updated_at = now;
        events.push(event.clone());
        self.commit(events).await;
        Ok(event)
    }

    async fn update(&self, mut event: Event) -> anyhow::Result<Option<Event>> {
        let (mut events, _) = self.list_with_source().await;
        let Some(slot) = events.iter_mut().find(|e| e.id == event.id) else {
            return Ok(None);
        };
        event.created_at = slot.created_at;
        event.updated_at = Utc::now();
        *slot = event.clone();
        self.commit(events).await;
        Ok(Some(event))
    }

    async fn delete(&self, id: &str) -> anyhow::Result<bool> {
        let (mut events, _) = self.list_with_source().await;
        let before = events.len();
        events.retain(|e| e.id != id);
        if events.len() == before {
            return Ok(false);
        }
        self.commit(events).await;
        Ok(true)
    }
}
