//! Auth Gate: resolves the session token of a request into an [`Identity`]
//! whose roles are already normalized into capabilities.
//!
//! Other modules fetch the [`AuthContext`] from the `ClientHub`, attach it
//! to their router as an extension and use the [`Authenticated`] /
//! [`MaybeAuthenticated`] extractors.
//!
//! The local [`AccountStore`] is published too; the users module edits it
//! and the static gate reads it on every request.

pub mod api;
pub mod config;
pub mod contract;
pub mod domain;
pub mod gateways;
pub mod infra;
pub mod module;

pub use api::rest::cookie::CookieSettings;
pub use api::rest::extract::{
    grant, AuthContext, Authenticated, Authorized, Grant, MaybeAuthenticated,
};
pub use config::{AccountConfig, AuthConfig};
pub use contract::{
    client::AuthGate,
    error::AuthError,
    model::{Account, Identity, Session},
};
pub use infra::storage::AccountStore;
pub use module::AuthModule;

pub const MODULE_NAME: &str = "auth";
