//! Back-office user directory behind the `users` capability, plus the
//! `settings`-guarded storage probe.

pub mod api;
pub mod config;
pub mod contract;
pub mod domain;
pub mod infra;
pub mod module;

pub use config::UsersConfig;
pub use contract::model::{NewUser, User, UserPatch};
pub use module::UsersModule;

pub const MODULE_NAME: &str = "users";
