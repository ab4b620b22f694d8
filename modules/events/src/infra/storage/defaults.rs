use chrono::{NaiveDate, TimeZone, Utc};

use crate::contract::model::{Event, EventStatus};

struct Seed {
    id: &'static str,
    title: &'static str,
    date: (i32, u32, u32),
    time: &'static str,
    location: &'static str,
    description: &'static str,
    category: &'static str,
    attendees: u32,
    image: &'static str,
    status: EventStatus,
    max_capacity: Option<u32>,
    current_registrations: Option<u32>,
}

const SEEDS: [Seed; 4] = [
    Seed {
        id: "1",
        title: "STCW Basic Safety Training",
        date: (2026, 11, 9),
        time: "08:30 - 16:30",
        location: "Harborline Training Centre, Pier 4",
        description: "Five-day refresher covering personal survival, fire prevention and fire fighting, elementary first aid and personal safety.",
        category: "safety",
        attendees: 18,
        image: "/images/events/basic-safety.jpg",
        status: EventStatus::RegistrationOpen,
        max_capacity: Some(24),
        current_registrations: Some(18),
    },
    Seed {
        id: "2",
        title: "Bridge Resource Management Workshop",
        date: (2026, 11, 23),
        time: "09:00 - 17:00",
        location: "Full Mission Bridge Simulator",
        description: "Team coordination, communication and decision making on the bridge, run on the full mission simulator.",
        category: "navigation",
        attendees: 10,
        image: "/images/events/brm.jpg",
        status: EventStatus::Upcoming,
        max_capacity: Some(12),
        current_registrations: Some(4),
    },
    Seed {
        id: "3",
        title: "GMDSS Radio Operator Refresher",
        date: (2026, 12, 7),
        time: "09:00 - 15:00",
        location: "Communications Lab, Building B",
        description: "Distress, urgency and safety procedures with hands-on DSC, NAVTEX and EPIRB exercises.",
        category: "communications",
        attendees: 14,
        image: "/images/events/gmdss.jpg",
        status: EventStatus::Upcoming,
        max_capacity: Some(16),
        current_registrations: Some(0),
    },
    Seed {
        id: "4",
        title: "Open Day: Careers at Sea",
        date: (2026, 9, 26),
        time: "10:00 - 14:00",
        location: "Harborline Training Centre, Main Hall",
        description: "Meet instructors and alumni, tour the simulators and learn about cadet programmes.",
        category: "community",
        attendees: 120,
        image: "/images/events/open-day.jpg",
        status: EventStatus::Completed,
        max_capacity: None,
        current_registrations: None,
    },
];

/// Built-in collection used to seed a missing data file, and as the last
/// resort when storage is unusable.
pub fn default_events() -> Vec<Event> {
    let stamp = Utc
        .with_ymd_and_hms(2026, 9, 1, 0, 0, 0)
        .single()
        .unwrap_or_else(Utc::now);

    SEEDS
        .iter()
        .filter_map(|s| {
            let (y, m, d) = s.date;
            Some(Event {
                id: s.id.to_string(),
                title: s.title.to_string(),
                date: NaiveDate::from_ymd_opt(y, m, d)?,
                time: s.time.to_string(),
                location: s.location.to_string(),
                description: s.description.to_string(),
                category: s.category.to_string(),
                attendees: s.attendees,
                image: s.image.to_string(),
                status: s.status,
                max_capacity: s.max_capacity,
                current_registrations: s.current_registrations,
                created_at: stamp,
                updated_at: stamp,
            })
        })
        .collect()
}
