//! Drives a [`ModuleRegistry`] through its lifecycle.
//!
//! One base [`ModuleCtx`](crate::ModuleCtx) is built up front and shared by
//! every phase: init → rest → start → wait → stop. Shutdown is triggered by
//! OS signals, an external token or an arbitrary future.

use crate::client_hub::ClientHub;
use crate::context::{ConfigProvider, ModuleCtxBuilder};
use crate::registry::ModuleRegistry;
use crate::runtime::shutdown;
use std::{future::Future, path::PathBuf, pin::Pin, sync::Arc};
use tokio_util::sync::CancellationToken;

pub enum ShutdownOptions {
    /// Ctrl+C / SIGTERM.
    Signals,
    /// The caller owns the token and cancels it.
    Token(CancellationToken),
    /// Shut down once the future completes.
    Future(Pin<Box<dyn Future<Output = ()> + Send>>),
}

pub struct RunOptions {
    /// Raw module config sections, keyed by module name.
    pub modules_cfg: Arc<dyn ConfigProvider>,
    pub home_dir: PathBuf,
    pub registry: ModuleRegistry,
    pub shutdown: ShutdownOptions,
}

pub async fn run(opts: RunOptions) -> anyhow::Result<()> {
    let RunOptions {
        modules_cfg,
        home_dir,
        registry,
        shutdown,
    } = opts;

    let cancel = match &shutdown {
        ShutdownOptions::Token(t) => t.clone(),
        _ => CancellationToken::new(),
    };

    match shutdown {
        ShutdownOptions::Signals => {
            let c = cancel.clone();
            tokio::spawn(async move {
                if let Err(e) = shutdown::wait_for_shutdown().await {
                    tracing::warn!(error = %e, "signal listener failed; falling back to ctrl_c");
                    let _ = tokio::signal::ctrl_c().await;
                }
                tracing::info!("shutdown: signal received");
                c.cancel();
            });
        }
        ShutdownOptions::Future(waiter) => {
            let c = cancel.clone();
            tokio::spawn(async move {
                waiter.await;
                tracing::info!("shutdown: external future completed");
                c.cancel();
            });
        }
        ShutdownOptions::Token(_) => {
            tracing::debug!("shutdown: controlled by external token");
        }
    }

    let base_ctx = ModuleCtxBuilder::new(cancel.clone())
        .with_client_hub(Arc::new(ClientHub::default()))
        .with_config_provider(modules_cfg)
        .with_home_dir(home_dir)
        .build();

    tracing::info!("Phase: init");
    registry.run_init_phase(&base_ctx).await?;

    tracing::info!("Phase: rest");
    registry.run_rest_phase(&base_ctx, axum::Router::new())?;

    tracing::info!("Phase: start");
    if let Err(e) = registry.run_start_phase(cancel.clone()).await {
        // Modules started before the failure still need their stop hook.
        cancel.cancel();
        registry.run_stop_phase(cancel).await;
        return Err(e.into());
    }

    cancel.cancelled().await;

    tracing::info!("Phase: stop");
    registry.run_stop_phase(cancel).await;
    Ok(())
}
