use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::contract::model::{Event, EventPatch, EventStatus, NewEvent};
use crate::domain::service::EventFilter;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDto {
    pub id: String,
    pub title: String,
    pub date: NaiveDate,
    pub time: String,
    pub location: String,
    pub description: String,
    pub category: String,
    pub attendees: u32,
    pub image: String,
    pub status: EventStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_capacity: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_registrations: Option<u32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Event> for EventDto {
    fn from(e: Event) -> Self {
        Self {
            id: e.id,
            title: e.title,
            date: e.date,
            time: e.time,
            location: e.location,
            description: e.description,
            category: e.category,
            attendees: e.attendees,
            image: e.image,
            status: e.status,
            max_capacity: e.max_capacity,
            current_registrations: e.current_registrations,
            created_at: e.created_at,
            updated_at: e.updated_at,
        }
    }
}

/// Body of `POST` and `PUT`. Everything is optional at this layer so that
/// missing fields surface as domain validation errors, not parse errors.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventReq {
    pub title: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub attendees: Option<u32>,
    pub image: Option<String>,
    pub status: Option<String>,
    pub max_capacity: Option<u32>,
    pub current_registrations: Option<u32>,
}

impl From<EventReq> for NewEvent {
    fn from(r: EventReq) -> Self {
        Self {
            title: r.title.unwrap_or_default(),
            date: r.date.unwrap_or_default(),
            time: r.time.unwrap_or_default(),
            location: r.location.unwrap_or_default(),
            description: r.description.unwrap_or_default(),
            category: r.category.unwrap_or_default(),
            attendees: r.attendees.unwrap_or_default(),
            image: r.image.unwrap_or_default(),
            status: r.status,
            max_capacity: r.max_capacity,
            current_registrations: r.current_registrations,
        }
    }
}

impl From<EventReq> for EventPatch {
    fn from(r: EventReq) -> Self {
        Self {
            title: r.title,
            date: r.date,
            time: r.time,
            location: r.location,
            description: r.description,
            category: r.category,
            attendees: r.attendees,
            image: r.image,
            status: r.status,
            max_capacity: r.max_capacity,
            current_registrations: r.current_registrations,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListEventsQuery {
    pub category: Option<String>,
    pub status: Option<String>,
}

impl From<ListEventsQuery> for EventFilter {
    fn from(q: ListEventsQuery) -> Self {
        Self {
            category: q.category,
            status: q.status,
        }
    }
}
