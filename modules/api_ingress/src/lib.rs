//! REST host: owns the router middleware stack and the HTTP server.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use arc_swap::ArcSwap;
use async_trait::async_trait;
use axum::{middleware::from_fn, routing::get, Router};
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tower_http::{
    cors::CorsLayer,
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
};

use modkit::{ModuleCtx, RestHostModule, StatefulModule};

mod config;
pub mod request_id;
mod web;

pub use config::ApiIngressConfig;

pub const MODULE_NAME: &str = "api_ingress";

pub struct ApiIngress {
    /// `server.host:server.port`, used unless the module section overrides it.
    default_bind: String,
    config: ArcSwap<ApiIngressConfig>,
    final_router: Mutex<Option<Router>>,
    server: Mutex<Option<JoinHandle<Result<()>>>>,
    local_addr: Mutex<Option<SocketAddr>>,
}

impl ApiIngress {
    pub fn new(default_bind: impl Into<String>) -> Self {
        Self {
            default_bind: default_bind.into(),
            config: ArcSwap::from_pointee(ApiIngressConfig::default()),
            final_router: Mutex::new(None),
            server: Mutex::new(None),
            local_addr: Mutex::new(None),
        }
    }

    pub fn config(&self) -> ApiIngressConfig {
        (**self.config.load()).clone()
    }

    pub fn bind_addr(&self) -> String {
        self.config
            .load()
            .bind_addr
            .clone()
            .unwrap_or_else(|| self.default_bind.clone())
    }

    /// Address the server actually listens on (differs from config for port 0).
    pub fn local_addr(&self) -> Option<SocketAddr> {
        *self.local_addr.lock()
    }

    /// Wrap `router` in the global middleware stack.
    ///
    /// Outermost first: PropagateRequestId → SetRequestId → request id
    /// extension → Trace → Timeout → CORS → BodyLimit.
    pub fn apply_layers(&self, router: Router) -> Router {
        let cfg = self.config.load();
        let x_request_id = request_id::header();

        let mut router = router.layer(RequestBodyLimitLayer::new(cfg.body_limit_bytes));
        if cfg.cors_enabled {
            router = router.layer(CorsLayer::very_permissive());
        }
        router
            .layer(TimeoutLayer::new(cfg.request_timeout))
            .layer(request_id::create_trace_layer())
            .layer(from_fn(request_id::push_req_id_to_extensions))
            .layer(SetRequestIdLayer::new(
                x_request_id.clone(),
                request_id::MakeReqId,
            ))
            .layer(PropagateRequestIdLayer::new(x_request_id))
    }

    /// Finalized router, if the REST phase has run.
    pub fn router(&self) -> Option<Router> {
        self.final_router.lock().clone()
    }
}

#[async_trait]
impl modkit::Module for ApiIngress {
    async fn init(&self, ctx: &ModuleCtx) -> Result<()> {
        let cfg = ctx.module_config::<ApiIngressConfig>();
        tracing::debug!(?cfg, "api_ingress configured");
        self.config.store(Arc::new(cfg));
        Ok(())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

impl RestHostModule for ApiIngress {
    fn rest_prepare(&self, _ctx: &ModuleCtx, router: Router) -> Result<Router> {
        Ok(router.route("/health", get(web::health_check)))
    }

    fn rest_finalize(&self, _ctx: &ModuleCtx, router: Router) -> Result<Router> {
        let router = self.apply_layers(router.fallback(web::not_found));
        *self.final_router.lock() = Some(router.clone());
        tracing::debug!("REST host finalized router");
        Ok(router)
    }
}

#[async_trait]
impl StatefulModule for ApiIngress {
    /// Binds the listener (so address errors fail startup) and serves in the
    /// background until `cancel` fires.
    async fn start(&self, cancel: CancellationToken) -> Result<()> {
        let bind = self.bind_addr();
        let addr: SocketAddr = bind
            .parse()
            .with_context(|| format!("invalid bind address '{bind}'"))?;

        let stored = { self.final_router.lock().clone() };
        let router = stored.unwrap_or_else(|| {
            tracing::debug!("no router from REST phase, serving health only");
            self.apply_layers(Router::new().route("/health", get(web::health_check)))
        });

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("cannot bind {addr}"))?;
        let local = listener.local_addr()?;
        *self.local_addr.lock() = Some(local);
        tracing::info!(%local, "HTTP server bound");

        let handle = tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(async move {
                    cancel.cancelled().await;
                    tracing::info!("HTTP server shutting down");
                })
                .await
                .map_err(anyhow::Error::from)
        });
        *self.server.lock() = Some(handle);
        Ok(())
    }

    async fn stop(&self, cancel: CancellationToken) -> Result<()> {
        cancel.cancel();
        let handle = { self.server.lock().take() };
        if let Some(handle) = handle {
            handle.await.context("HTTP server task panicked")??;
        }
        Ok(())
    }
}
