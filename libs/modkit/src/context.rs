use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::client_hub::ClientHub;

/// Source of raw per-module configuration sections.
pub trait ConfigProvider: Send + Sync {
    fn get_module_config(&self, module_name: &str) -> Option<&serde_json::Value>;
}

/// Everything a module may touch while wiring itself.
///
/// One base context is built by the runner and cloned per module with
/// `for_module`, so all modules share the same hub and cancellation token.
#[derive(Clone)]
pub struct ModuleCtx {
    config_provider: Option<Arc<dyn ConfigProvider>>,
    client_hub: Arc<ClientHub>,
    cancellation_token: CancellationToken,
    module_name: Option<Arc<str>>,
    home_dir: Arc<Path>,
}

pub struct ModuleCtxBuilder {
    inner: ModuleCtx,
}

impl ModuleCtxBuilder {
    pub fn new(token: CancellationToken) -> Self {
        Self {
            inner: ModuleCtx {
                config_provider: None,
                client_hub: Arc::new(ClientHub::default()),
                cancellation_token: token,
                module_name: None,
                home_dir: Arc::from(PathBuf::from(".")),
            },
        }
    }

    pub fn with_config_provider(mut self, provider: Arc<dyn ConfigProvider>) -> Self {
        self.inner.config_provider = Some(provider);
        self
    }

    pub fn with_client_hub(mut self, hub: Arc<ClientHub>) -> Self {
        self.inner.client_hub = hub;
        self
    }

    pub fn with_home_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.inner.home_dir = Arc::from(dir.into());
        self
    }

    pub fn build(self) -> ModuleCtx {
        self.inner
    }
}

impl ModuleCtx {
    pub(crate) fn for_module(mut self, name: &str) -> Self {
        self.module_name = Some(Arc::from(name));
        self
    }

    pub fn client_hub(&self) -> Arc<ClientHub> {
        self.client_hub.clone()
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancellation_token
    }

    pub fn current_module(&self) -> Option<&str> {
        self.module_name.as_deref()
    }

    /// Absolute server home directory; relative data paths resolve under it.
    pub fn home_dir(&self) -> &Path {
        &self.home_dir
    }

    /// Best-effort: the module's section deserialized into `T`, or
    /// `T::default()` when the section is missing or does not parse.
    pub fn module_config<T: DeserializeOwned + Default>(&self) -> T {
        let (Some(name), Some(provider)) = (&self.module_name, &self.config_provider) else {
            return T::default();
        };
        let Some(raw) = provider.get_module_config(name) else {
            return T::default();
        };
        match serde_json::from_value::<T>(raw.clone()) {
            Ok(cfg) => cfg,
            Err(e) => {
                tracing::warn!(module = %name, error = %e, "invalid module config, using defaults");
                T::default()
            }
        }
    }

    /// Strict variant of [`module_config`](Self::module_config).
    pub fn module_config_required<T: DeserializeOwned>(&self) -> anyhow::Result<T> {
        let name = self
            .module_name
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("context is not scoped to a module"))?;
        let raw = self
            .config_provider
            .as_ref()
            .and_then(|p| p.get_module_config(name))
            .ok_or_else(|| anyhow::anyhow!("missing module config: {name}"))?;
        serde_json::from_value(raw.clone()).map_err(|e| anyhow::anyhow!("invalid {name} config: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;
    use std::collections::HashMap;

    struct MapProvider(HashMap<String, serde_json::Value>);

    impl ConfigProvider for MapProvider {
        fn get_module_config(&self, module_name: &str) -> Option<&serde_json::Value> {
            self.0.get(module_name)
        }
    }

    #[derive(Debug, Default, Deserialize, PartialEq)]
    struct NewsCfg {
        #[serde(default)]
        max_title_length: usize,
    }

    fn ctx_with(map: HashMap<String, serde_json::Value>) -> ModuleCtx {
        ModuleCtxBuilder::new(CancellationToken::new())
            .with_config_provider(Arc::new(MapProvider(map)))
            .with_home_dir("/srv/harborline")
            .build()
    }

    #[test]
    fn module_config_reads_scoped_section() {
        let ctx = ctx_with(HashMap::from([(
            "news".to_string(),
            json!({"max_title_length": 120}),
        )]))
        .for_module("news");

        assert_eq!(ctx.current_module(), Some("news"));
        assert_eq!(ctx.home_dir(), Path::new("/srv/harborline"));
        assert_eq!(ctx.module_config::<NewsCfg>().max_title_length, 120);
        assert!(ctx.module_config_required::<NewsCfg>().is_ok());
    }

    #[test]
    fn invalid_or_missing_sections_fall_back() {
        let ctx = ctx_with(HashMap::from([(
            "news".to_string(),
            json!({"max_title_length": "long"}),
        )]));

        let scoped = ctx.clone().for_module("news");
        assert_eq!(scoped.module_config::<NewsCfg>(), NewsCfg::default());
        assert!(scoped.module_config_required::<NewsCfg>().is_err());

        let other = ctx.for_module("users");
        assert_eq!(other.module_config::<NewsCfg>(), NewsCfg::default());
        let err = other.module_config_required::<NewsCfg>().unwrap_err();
        assert!(err.to_string().contains("missing module config: users"));
    }
}
