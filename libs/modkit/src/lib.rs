//! # ModKit
//!
//! Small module system used by the Harborline server.
//!
//! A module is a struct implementing [`Module`] plus any of the optional
//! capabilities ([`RestfulModule`], [`RestHostModule`], [`StatefulModule`]).
//! The binary lists its modules explicitly in a [`RegistryBuilder`], the
//! registry orders them by declared dependencies and [`run`] drives the
//! phases: init → REST → start → wait → stop.
//!
//! ```rust,ignore
//! let news = Arc::new(NewsModule::default());
//! let mut b = RegistryBuilder::default();
//! b.add(ModuleBinding::new("news", news.clone()).depends_on(&["auth"]).rest(news));
//! ```

pub use anyhow::Result;
pub use async_trait::async_trait;

pub mod contracts;
pub use contracts::*;

pub mod context;
pub use context::{ConfigProvider, ModuleCtx, ModuleCtxBuilder};

pub mod client_hub;
pub use client_hub::{ClientHub, ClientHubError};

pub mod registry;
pub use registry::{ModuleBinding, ModuleRegistry, RegistryBuilder, RegistryError};

pub mod api;
pub use api::{ApiEnvelope, ApiError, ApiResult, JsonBody};

pub mod http;
pub use http::client::TracedClient;

pub mod runtime;
pub use runtime::{run, RunOptions, ShutdownOptions};
