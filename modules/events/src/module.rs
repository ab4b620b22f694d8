use std::path::Path;
use std::sync::Arc;

use arc_swap::ArcSwapOption;
use async_trait::async_trait;
use auth::AuthContext;
use axum::Router;
use modkit::{Module, ModuleCtx, RestfulModule};
use tracing::info;

use crate::api::rest::routes;
use crate::config::EventsConfig;
use crate::domain::service::Service;
use crate::infra::storage::{EnvSnapshot, TieredEventStore};

#[derive(Default)]
pub struct EventsModule {
    service: ArcSwapOption<Service>,
    auth: ArcSwapOption<AuthContext>,
}

impl EventsModule {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Module for EventsModule {
    async fn init(&self, ctx: &ModuleCtx) -> anyhow::Result<()> {
        let cfg: EventsConfig = ctx.module_config();
        let data_file = {
            let p = Path::new(&cfg.data_file);
            if p.is_absolute() {
                p.to_path_buf()
            } else {
                ctx.home_dir().join(p)
            }
        };
        info!(data_file = %data_file.display(), snapshot_env = %cfg.snapshot_env, "events store configured");

        let store = TieredEventStore::new(EnvSnapshot::new(cfg.snapshot_env), data_file);
        self.service
            .store(Some(Arc::new(Service::new(Arc::new(store)))));
        self.auth
            .store(Some(ctx.client_hub().get::<AuthContext>()?));
        Ok(())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

impl RestfulModule for EventsModule {
    fn register_rest(&self, _ctx: &ModuleCtx, router: Router) -> anyhow::Result<Router> {
        let (Some(service), Some(auth)) = (self.service.load_full(), self.auth.load_full()) else {
            anyhow::bail!("events module not initialized");
        };
        Ok(routes::register_routes(router, service, auth))
    }
}
