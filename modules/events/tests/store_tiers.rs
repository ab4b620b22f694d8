//! Tier selection of `TieredEventStore` on a real filesystem.

use events::domain::repo::EventsRepository;
use events::infra::storage::{default_events, FixedSnapshot};
use events::{Event, ListSource, TieredEventStore};

fn sample(title: &str) -> Event {
    let mut e = default_events().remove(0);
    e.id = String::new();
    e.title = title.to_string();
    e
}

#[tokio::test]
async fn missing_file_is_seeded_with_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data").join("events.json");
    let store = TieredEventStore::new(FixedSnapshot(None), &path);

    let (events, source) = store.list_with_source().await;
    assert_eq!(source, ListSource::SeededFile);
    assert_eq!(events, default_events());

    let on_disk: Vec<Event> = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
    assert_eq!(on_disk, default_events());

    let (_, source) = store.list_with_source().await;
    assert_eq!(source, ListSource::Cache);
}

#[tokio::test]
async fn existing_file_populates_cache() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("events.json");
    let mut one = default_events();
    one.truncate(1);
    std::fs::write(&path, serde_json::to_vec(&one).unwrap()).unwrap();

    let store = TieredEventStore::new(FixedSnapshot(None), &path);
    let (events, source) = store.list_with_source().await;
    assert_eq!(source, ListSource::File);
    assert_eq!(events.len(), 1);
}

#[tokio::test]
async fn corrupt_file_serves_defaults_and_is_left_alone() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("events.json");
    std::fs::write(&path, b"{ nope").unwrap();

    let store = TieredEventStore::new(FixedSnapshot(None), &path);
    let (events, source) = store.list_with_source().await;
    assert_eq!(source, ListSource::Defaults);
    assert_eq!(events.len(), 4);
    assert_eq!(std::fs::read(&path).unwrap(), b"{ nope");
}

#[tokio::test]
async fn snapshot_wins_until_first_mutation() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("events.json");
    let mut snap = default_events();
    snap.truncate(2);
    let store = TieredEventStore::new(
        FixedSnapshot(Some(serde_json::to_string(&snap).unwrap())),
        &path,
    );

    let (events, source) = store.list_with_source().await;
    assert_eq!(source, ListSource::Snapshot);
    assert_eq!(events.len(), 2);

    let created = store.create(sample("Ship Security Officer")).await.unwrap();
    let (events, source) = store.list_with_source().await;
    assert_eq!(source, ListSource::Cache);
    assert_eq!(events.len(), 3);
    assert!(events.iter().any(|e| e.id == created.id));
}

#[tokio::test]
async fn unparsable_snapshot_is_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let store = TieredEventStore::new(
        FixedSnapshot(Some("not json".into())),
        dir.path().join("events.json"),
    );
    let (_, source) = store.list_with_source().await;
    assert_eq!(source, ListSource::SeededFile);
}

#[tokio::test]
async fn create_update_delete_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("events.json");
    let store = TieredEventStore::new(FixedSnapshot(None), &path);

    let created = store.create(sample("Tanker Familiarisation")).await.unwrap();
    assert!(!created.id.is_empty());
    assert!(created.id.parse::<i64>().is_ok());
    let listed = store.list().await.unwrap();
    assert_eq!(listed.len(), 5);
    assert!(listed.contains(&created));

    let mut changed = created.clone();
    changed.title = "Advanced Tanker Operations".into();
    let updated = store.update(changed).await.unwrap().unwrap();
    assert_eq!(updated.created_at, created.created_at);
    assert!(updated.updated_at >= created.updated_at);

    let mut ghost = created.clone();
    ghost.id = "missing".into();
    let before = store.list().await.unwrap();
    assert!(store.update(ghost).await.unwrap().is_none());
    assert_eq!(store.list().await.unwrap(), before);

    assert!(store.delete(&created.id).await.unwrap());
    assert!(!store.delete(&created.id).await.unwrap());
    let after = store.list().await.unwrap();
    assert_eq!(after.len(), 4);

    let on_disk: Vec<Event> = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
    assert_eq!(on_disk, after);
}

#[tokio::test]
async fn mutations_survive_unwritable_storage() {
    let dir = tempfile::tempdir().unwrap();
    // The data "file" is a directory, so every read and write fails.
    let store = TieredEventStore::new(FixedSnapshot(None), dir.path());

    let created = store.create(sample("Lifeboat Drill")).await.unwrap();
    let (events, source) = store.list_with_source().await;
    assert_eq!(source, ListSource::Cache);
    assert_eq!(events.len(), 5);
    assert!(events.iter().any(|e| e.id == created.id));
}
