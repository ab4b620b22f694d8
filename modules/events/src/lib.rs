//! Training events: public listing plus back-office CRUD over a tiered store
//! (environment snapshot → in-memory cache → JSON file → built-in defaults).

pub mod api;
pub mod config;
pub mod contract;
pub mod domain;
pub mod infra;
pub mod module;

pub use config::EventsConfig;
pub use contract::model::{Event, EventPatch, EventStatus, NewEvent};
pub use infra::storage::{ListSource, TieredEventStore};
pub use module::EventsModule;

pub const MODULE_NAME: &str = "events";
