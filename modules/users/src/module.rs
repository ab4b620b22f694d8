use std::sync::Arc;

use arc_swap::ArcSwapOption;
use async_trait::async_trait;
use auth::{AccountStore, AuthContext};
use axum::Router;
use modkit::{Module, ModuleCtx, RestfulModule};

use crate::api::rest::routes;
use crate::config::UsersConfig;
use crate::domain::service::{Service, ServiceConfig};
use crate::infra::storage::AccountsRepository;

#[derive(Default)]
pub struct UsersModule {
    service: ArcSwapOption<Service>,
    auth: ArcSwapOption<AuthContext>,
}

impl UsersModule {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Module for UsersModule {
    async fn init(&self, ctx: &ModuleCtx) -> anyhow::Result<()> {
        let cfg: UsersConfig = ctx.module_config();
        tracing::debug!(?cfg, "users configured");

        let hub = ctx.client_hub();
        let store = hub.get::<AccountStore>()?;
        let service = Service::new(
            Arc::new(AccountsRepository::new(store)),
            ServiceConfig {
                max_name_length: cfg.max_name_length,
                probe_timeout: cfg.probe_timeout,
            },
        );
        self.service.store(Some(Arc::new(service)));
        self.auth.store(Some(hub.get::<AuthContext>()?));
        Ok(())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

impl RestfulModule for UsersModule {
    fn register_rest(&self, _ctx: &ModuleCtx, router: Router) -> anyhow::Result<Router> {
        let (Some(service), Some(auth)) = (self.service.load_full(), self.auth.load_full()) else {
            anyhow::bail!("users module not initialized");
        };
        Ok(routes::register_routes(router, service, auth))
    }
}
