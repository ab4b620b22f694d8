use std::sync::Arc;

use arc_swap::ArcSwapOption;
use async_trait::async_trait;
use auth::AuthContext;
use axum::Router;
use modkit::{Module, ModuleCtx, RestfulModule};

use crate::api::rest::routes;
use crate::config::NewsConfig;
use crate::domain::service::{Service, ServiceConfig};
use crate::infra::storage::InMemoryNewsRepository;

#[derive(Default)]
pub struct NewsModule {
    service: ArcSwapOption<Service>,
    auth: ArcSwapOption<AuthContext>,
}

impl NewsModule {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Module for NewsModule {
    async fn init(&self, ctx: &ModuleCtx) -> anyhow::Result<()> {
        let cfg: NewsConfig = ctx.module_config();
        tracing::debug!(max_title_length = cfg.max_title_length, "news configured");

        let service = Service::new(
            Arc::new(InMemoryNewsRepository::new()),
            ServiceConfig {
                max_title_length: cfg.max_title_length,
            },
        );
        self.service.store(Some(Arc::new(service)));
        self.auth
            .store(Some(ctx.client_hub().get::<AuthContext>()?));
        Ok(())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

impl RestfulModule for NewsModule {
    fn register_rest(&self, _ctx: &ModuleCtx, router: Router) -> anyhow::Result<Router> {
        let (Some(service), Some(auth)) = (self.service.load_full(), self.auth.load_full()) else {
            anyhow::bail!("news module not initialized");
        };
        Ok(routes::register_routes(router, service, auth))
    }
}
