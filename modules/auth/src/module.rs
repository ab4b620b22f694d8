use std::sync::Arc;

use arc_swap::ArcSwapOption;
use async_trait::async_trait;
use axum::Router;
use modkit::{Module, ModuleCtx, RestfulModule};
use tracing::{info, warn};

use crate::api::rest::{cookie::CookieSettings, extract::AuthContext, routes};
use crate::config::AuthConfig;
use crate::contract::client::AuthGate;
use crate::gateways::{RemoteAuthGate, StaticAuthGate};
use crate::infra::storage::AccountStore;

/// Publishes `dyn AuthGate`, `AuthContext` and the `AccountStore` to the
/// `ClientHub` and serves `/api/auth/*`.
#[derive(Default)]
pub struct AuthModule {
    ctx: ArcSwapOption<AuthContext>,
}

impl AuthModule {
    pub fn new() -> Self {
        Self::default()
    }

    fn build_gate(
        cfg: &AuthConfig,
        store: Arc<AccountStore>,
    ) -> anyhow::Result<Arc<dyn AuthGate>> {
        match cfg.backend_url.as_deref() {
            Some(url) => {
                info!(backend = %url, "auth gate: remote backend");
                Ok(Arc::new(RemoteAuthGate::new(url, cfg.request_timeout)?))
            }
            None => {
                if store.is_empty() {
                    warn!("auth gate: no backend_url and no accounts, every request will be anonymous");
                } else {
                    info!(accounts = store.len(), "auth gate: static accounts");
                }
                Ok(Arc::new(StaticAuthGate::with_store(store, cfg.session_ttl)))
            }
        }
    }
}

#[async_trait]
impl Module for AuthModule {
    async fn init(&self, ctx: &ModuleCtx) -> anyhow::Result<()> {
        let cfg: AuthConfig = ctx.module_config();
        let store = Arc::new(AccountStore::from_config(&cfg.accounts));
        let gate = Self::build_gate(&cfg, store.clone())?;
        let auth_ctx = Arc::new(AuthContext::new(
            gate.clone(),
            CookieSettings {
                name: cfg.cookie_name.clone(),
                secure: cfg.secure_cookie,
                max_age: cfg.session_ttl,
            },
        ));

        let hub = ctx.client_hub();
        hub.register::<dyn AuthGate>(gate);
        hub.register::<AuthContext>(auth_ctx.clone());
        hub.register::<AccountStore>(store);
        self.ctx.store(Some(auth_ctx));
        Ok(())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

impl RestfulModule for AuthModule {
    fn register_rest(&self, _ctx: &ModuleCtx, router: Router) -> anyhow::Result<Router> {
        let auth_ctx = self
            .ctx
            .load_full()
            .ok_or_else(|| anyhow::anyhow!("auth module not initialized"))?;
        Ok(routes::register_routes(router, auth_ctx))
    }
}
