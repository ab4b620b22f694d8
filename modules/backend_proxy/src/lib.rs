//! Passthrough of `/api/laravel/news/*` to the external news backend.

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use async_trait::async_trait;
use auth::AuthContext;
use axum::{routing::any, Extension, Router};
use modkit::{Module, ModuleCtx, RestfulModule};

mod config;
pub mod forward;
mod web;

pub use config::BackendProxyConfig;
pub use forward::Upstream;

pub const MODULE_NAME: &str = "backend_proxy";

/// Mount the passthrough routes. Without an upstream every call answers 503.
pub fn register_routes(router: Router, upstream: Option<Arc<Upstream>>, auth: Arc<AuthContext>) -> Router {
    let proxy = Router::new()
        .route(forward::PUBLIC_PREFIX, any(web::proxy))
        .route("/api/laravel/news/{*path}", any(web::proxy))
        .layer(Extension(upstream))
        .layer(Extension(auth));
    router.merge(proxy)
}

#[derive(Default)]
pub struct BackendProxy {
    upstream: ArcSwapOption<Upstream>,
    auth: ArcSwapOption<AuthContext>,
}

impl BackendProxy {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Module for BackendProxy {
    async fn init(&self, ctx: &ModuleCtx) -> anyhow::Result<()> {
        let cfg: BackendProxyConfig = ctx.module_config();
        match cfg.base_url.as_deref() {
            Some(url) => {
                let upstream = Upstream::new(url, cfg.request_timeout)?;
                tracing::info!(backend = %url, timeout = ?cfg.request_timeout, "news passthrough enabled");
                self.upstream.store(Some(Arc::new(upstream)));
            }
            None => tracing::warn!("backend_proxy.base_url not set, passthrough answers 503"),
        }
        self.auth
            .store(Some(ctx.client_hub().get::<AuthContext>()?));
        Ok(())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

impl RestfulModule for BackendProxy {
    fn register_rest(&self, _ctx: &ModuleCtx, router: Router) -> anyhow::Result<Router> {
        let auth = self
            .auth
            .load_full()
            .ok_or_else(|| anyhow::anyhow!("backend_proxy module not initialized"))?;
        Ok(register_routes(router, self.upstream.load_full(), auth))
    }
}
