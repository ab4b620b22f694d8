use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::{debug, info, instrument};

use crate::contract::model::{Event, EventPatch, EventStatus, NewEvent};
use crate::domain::error::DomainError;
use crate::domain::repo::EventsRepository;

#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    pub category: Option<String>,
    pub status: Option<String>,
}

/// Business rules for events; depends only on the repository port.
#[derive(Clone)]
pub struct Service {
    repo: Arc<dyn EventsRepository>,
}

impl Service {
    pub fn new(repo: Arc<dyn EventsRepository>) -> Self {
        Self { repo }
    }

    /// Filtered and sorted by date, then time.
    #[instrument(name = "events.service.list", skip(self))]
    pub async fn list(&self, filter: EventFilter) -> Result<Vec<Event>, DomainError> {
        let status = filter
            .status
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(parse_status)
            .transpose()?;
        let category = filter.category.filter(|c| !c.is_empty());

        let mut events: Vec<Event> = self
            .repo
            .list()
            .await?
            .into_iter()
            .filter(|e| status.map_or(true, |s| e.status == s))
            .filter(|e| {
                category
                    .as_deref()
                    .map_or(true, |c| e.category.eq_ignore_ascii_case(c))
            })
            .collect();
        events.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.time.cmp(&b.time)));
        debug!(count = events.len(), "events listed");
        Ok(events)
    }

    #[instrument(name = "events.service.get", skip(self))]
    pub async fn get(&self, id: &str) -> Result<Event, DomainError> {
        self.repo
            .list()
            .await?
            .into_iter()
            .find(|e| e.id == id)
            .ok_or_else(|| DomainError::not_found(id))
    }

    #[instrument(name = "events.service.create", skip(self, new), fields(title = %new.title))]
    pub async fn create(&self, new: NewEvent) -> Result<Event, DomainError> {
        let title = required("title", &new.title)?;
        let date = parse_date(required("date", &new.date)?)?;
        let time = required("time", &new.time)?;
        let location = required("location", &new.location)?;
        let status = new
            .status
            .as_deref()
            .map(parse_status)
            .transpose()?
            .unwrap_or_default();

        let now = Utc::now();
        let event = Event {
            id: String::new(),
            title,
            date,
            time,
            location,
            description: new.description,
            category: new.category,
            attendees: new.attendees,
            image: new.image,
            status,
            max_capacity: new.max_capacity,
            current_registrations: new.current_registrations,
            created_at: now,
            updated_at: now,
        };
        check_capacity(&event)?;

        let created = self.repo.create(event).await?;
        info!(id = %created.id, "event created");
        Ok(created)
    }

    /// Merges `patch` into the stored record and validates the result as a whole.
    #[instrument(name = "events.service.update", skip(self, patch))]
    pub async fn update(&self, id: &str, patch: EventPatch) -> Result<Event, DomainError> {
        let mut event = self.get(id).await?;

        if let Some(title) = patch.title {
            event.title = required("title", &title)?;
        }
        if let Some(date) = patch.date {
            event.date = parse_date(required("date", &date)?)?;
        }
        if let Some(time) = patch.time {
            event.time = required("time", &time)?;
        }
        if let Some(location) = patch.location {
            event.location = required("location", &location)?;
        }
        if let Some(status) = patch.status {
            event.status = parse_status(&status)?;
        }
        if let Some(v) = patch.description {
            event.description = v;
        }
        if let Some(v) = patch.category {
            event.category = v;
        }
        if let Some(v) = patch.attendees {
            event.attendees = v;
        }
        if let Some(v) = patch.image {
            event.image = v;
        }
        if patch.max_capacity.is_some() {
            event.max_capacity = patch.max_capacity;
        }
        if patch.current_registrations.is_some() {
            event.current_registrations = patch.current_registrations;
        }
        check_capacity(&event)?;

        let updated = self
            .repo
            .update(event)
            .await?
            .ok_or_else(|| DomainError::not_found(id))?;
        info!("event updated");
        Ok(updated)
    }

    #[instrument(name = "events.service.delete", skip(self))]
    pub async fn delete(&self, id: &str) -> Result<(), DomainError> {
        if self.repo.delete(id).await? {
            info!("event deleted");
            Ok(())
        } else {
            Err(DomainError::not_found(id))
        }
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

fn parse_date(raw: String) -> Result<NaiveDate, DomainError> {
    NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
        .map_err(|_| DomainError::validation("date", format!("date must be YYYY-MM-DD, got '{raw}'")))
}

fn parse_status(raw: &str) -> Result<EventStatus, DomainError> {
    raw.parse().map_err(|e: String| DomainError::validation("status", e))
}

fn check_capacity(e: &Event) -> Result<(), DomainError> {
    match (e.current_registrations, e.max_capacity) {
        (Some(current), Some(max)) if current > max => Err(DomainError::validation(
            "currentRegistrations",
            format!("currentRegistrations ({current}) exceeds maxCapacity ({max})"),
        )),
        _ => Ok(()),
    }
}
