use axum::Router;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::context::ModuleCtx;
use crate::contracts::{Module, RestHostModule, RestfulModule, StatefulModule};

/// One module plus the capabilities it exposes.
pub struct ModuleBinding {
    pub name: &'static str,
    pub deps: Vec<&'static str>,
    pub core: Arc<dyn Module>,
    pub rest: Option<Arc<dyn RestfulModule>>,
    pub rest_host: Option<Arc<dyn RestHostModule>>,
    pub stateful: Option<Arc<dyn StatefulModule>>,
}

impl ModuleBinding {
    pub fn new(name: &'static str, core: Arc<dyn Module>) -> Self {
        Self {
            name,
            deps: Vec::new(),
            core,
            rest: None,
            rest_host: None,
            stateful: None,
        }
    }

    pub fn depends_on(mut self, deps: &[&'static str]) -> Self {
        self.deps.extend_from_slice(deps);
        self
    }

    pub fn rest(mut self, m: Arc<dyn RestfulModule>) -> Self {
        self.rest = Some(m);
        self
    }

    pub fn rest_host(mut self, m: Arc<dyn RestHostModule>) -> Self {
        self.rest_host = Some(m);
        self
    }

    pub fn stateful(mut self, m: Arc<dyn StatefulModule>) -> Self {
        self.stateful = Some(m);
        self
    }
}

impl std::fmt::Debug for ModuleBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleBinding")
            .field("name", &self.name)
            .field("deps", &self.deps)
            .field("has_rest", &self.rest.is_some())
            .field("is_rest_host", &self.rest_host.is_some())
            .field("has_stateful", &self.stateful.is_some())
            .finish()
    }
}

/// Modules in dependency order.
pub struct ModuleRegistry {
    modules: Vec<ModuleBinding>,
}

impl std::fmt::Debug for ModuleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.modules.iter().map(|m| m.name))
            .finish()
    }
}

impl ModuleRegistry {
    pub fn modules(&self) -> &[ModuleBinding] {
        &self.modules
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.modules.iter().map(|m| m.name).collect()
    }

    pub async fn run_init_phase(&self, base_ctx: &ModuleCtx) -> Result<(), RegistryError> {
        for m in &self.modules {
            let ctx = base_ctx.clone().for_module(m.name);
            m.core
                .init(&ctx)
                .await
                .map_err(|source| RegistryError::Init {
                    module: m.name,
                    source,
                })?;
            tracing::debug!(module = m.name, "module initialized");
        }
        Ok(())
    }

    /// Host prepare → every REST provider in order → host finalize.
    pub fn run_rest_phase(
        &self,
        base_ctx: &ModuleCtx,
        mut router: Router,
    ) -> Result<Router, RegistryError> {
        let host = self
            .modules
            .iter()
            .find_map(|m| m.rest_host.as_ref().map(|h| (m.name, h)));

        let Some((host_name, host)) = host else {
            return if self.modules.iter().any(|m| m.rest.is_some()) {
                Err(RegistryError::RestRequiresHost)
            } else {
                Ok(router)
            };
        };
        let host_ctx = base_ctx.clone().for_module(host_name);

        router = host
            .rest_prepare(&host_ctx, router)
            .map_err(|source| RegistryError::RestPrepare {
                module: host_name,
                source,
            })?;

        for m in &self.modules {
            if let Some(rest) = &m.rest {
                let ctx = base_ctx.clone().for_module(m.name);
                router = rest
                    .register_rest(&ctx, router)
                    .map_err(|source| RegistryError::RestRegister {
                        module: m.name,
                        source,
                    })?;
            }
        }

        host.rest_finalize(&host_ctx, router)
            .map_err(|source| RegistryError::RestFinalize {
                module: host_name,
                source,
            })
    }

    pub async fn run_start_phase(&self, cancel: CancellationToken) -> Result<(), RegistryError> {
        for m in &self.modules {
            if let Some(s) = &m.stateful {
                s.start(cancel.clone())
                    .await
                    .map_err(|source| RegistryError::Start {
                        module: m.name,
                        source,
                    })?;
            }
        }
        Ok(())
    }

    /// Reverse order; failures are logged and do not stop the remaining modules.
    pub async fn run_stop_phase(&self, cancel: CancellationToken) {
        for m in self.modules.iter().rev() {
            if let Some(s) = &m.stateful {
                if let Err(err) = s.stop(cancel.clone()).await {
                    tracing::warn!(module = m.name, error = %err, "failed to stop module");
                }
            }
        }
    }

    pub fn get_module(&self, name: &str) -> Option<Arc<dyn Module>> {
        self.modules
            .iter()
            .find(|m| m.name == name)
            .map(|m| m.core.clone())
    }
}

/// Collects bindings in registration order.
#[derive(Default)]
pub struct RegistryBuilder {
    bindings: Vec<ModuleBinding>,
}

impl RegistryBuilder {
    pub fn add(&mut self, binding: ModuleBinding) -> &mut Self {
        self.bindings.push(binding);
        self
    }

    /// Validate and order the modules so every dependency comes first.
    /// Independent modules keep their registration order.
    pub fn build(self) -> Result<ModuleRegistry, RegistryError> {
        let mut errors = Vec::new();
        let mut index: HashMap<&'static str, usize> = HashMap::new();
        for (i, b) in self.bindings.iter().enumerate() {
            if index.insert(b.name, i).is_some() {
                errors.push(format!("module '{}' is registered twice", b.name));
            }
        }
        let hosts: Vec<_> = self
            .bindings
            .iter()
            .filter(|b| b.rest_host.is_some())
            .map(|b| b.name)
            .collect();
        if hosts.len() > 1 {
            errors.push(format!(
                "only one REST host is allowed, found: {}",
                hosts.join(", ")
            ));
        }
        if !errors.is_empty() {
            return Err(RegistryError::InvalidConfiguration { errors });
        }

        // deps[i] = indices module i waits for
        let mut deps = vec![Vec::new(); self.bindings.len()];
        for (i, b) in self.bindings.iter().enumerate() {
            for d in &b.deps {
                let j = *index.get(d).ok_or_else(|| RegistryError::UnknownDependency {
                    module: b.name,
                    depends_on: d.to_string(),
                })?;
                deps[i].push(j);
            }
        }

        let order = topo_order(&deps).map_err(|cycle| RegistryError::CycleDetected {
            path: cycle.into_iter().map(|i| self.bindings[i].name).collect(),
        })?;

        let mut slots: Vec<Option<ModuleBinding>> = self.bindings.into_iter().map(Some).collect();
        let modules: Vec<ModuleBinding> = order
            .into_iter()
            .filter_map(|i| slots[i].take())
            .collect();

        tracing::info!(
            modules = ?modules.iter().map(|m| m.name).collect::<Vec<_>>(),
            "module order resolved"
        );
        Ok(ModuleRegistry { modules })
    }
}

/// Kahn's algorithm picking the lowest ready index first. On failure returns
/// one dependency cycle as a closed path of indices.
fn topo_order(deps: &[Vec<usize>]) -> Result<Vec<usize>, Vec<usize>> {
    let n = deps.len();
    let mut pending: Vec<usize> = deps.iter().map(Vec::len).collect();
    let mut dependents = vec![Vec::new(); n];
    for (i, ds) in deps.iter().enumerate() {
        for &d in ds {
            dependents[d].push(i);
        }
    }

    let mut ready: BTreeSet<usize> = (0..n).filter(|&i| pending[i] == 0).collect();
    let mut order = Vec::with_capacity(n);
    while let Some(i) = ready.pop_first() {
        order.push(i);
        for &w in &dependents[i] {
            pending[w] -= 1;
            if pending[w] == 0 {
                ready.insert(w);
            }
        }
    }
    if order.len() == n {
        return Ok(order);
    }

    // Every unordered node still waits on another unordered node, so
    // following unresolved deps from any of them must revisit a node.
    let start = (0..n).find(|&i| pending[i] > 0).unwrap_or(0);
    let mut path = vec![start];
    let mut cur = start;
    loop {
        let Some(&next) = deps[cur].iter().find(|&&d| pending[d] > 0) else {
            return Err(path);
        };
        if let Some(pos) = path.iter().position(|&p| p == next) {
            let mut cycle = path.split_off(pos);
            cycle.push(next);
            return Err(cycle);
        }
        path.push(next);
        cur = next;
    }
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("initialization failed for module '{module}'")]
    Init {
        module: &'static str,
        #[source]
        source: anyhow::Error,
    },
    #[error("start failed for module '{module}'")]
    Start {
        module: &'static str,
        #[source]
        source: anyhow::Error,
    },
    #[error("REST prepare failed for host module '{module}'")]
    RestPrepare {
        module: &'static str,
        #[source]
        source: anyhow::Error,
    },
    #[error("REST registration failed for module '{module}'")]
    RestRegister {
        module: &'static str,
        #[source]
        source: anyhow::Error,
    },
    #[error("REST finalize failed for host module '{module}'")]
    RestFinalize {
        module: &'static str,
        #[source]
        source: anyhow::Error,
    },
    #[error("modules expose REST routes but no REST host module is registered")]
    RestRequiresHost,
    #[error("module '{module}' depends on unknown '{depends_on}'")]
    UnknownDependency {
        module: &'static str,
        depends_on: String,
    },
    #[error("cyclic dependency detected: {}", path.join(" -> "))]
    CycleDetected { path: Vec<&'static str> },
    #[error("invalid registry configuration: {}", errors.join("; "))]
    InvalidConfiguration { errors: Vec<String> },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ModuleCtxBuilder;
    use parking_lot::Mutex;

    struct Probe {
        name: &'static str,
        log: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait::async_trait]
    impl Module for Probe {
        async fn init(&self, ctx: &ModuleCtx) -> anyhow::Result<()> {
            assert_eq!(ctx.current_module(), Some(self.name));
            self.log.lock().push(format!("init:{}", self.name));
            Ok(())
        }
        fn as_any(&self) -> &dyn std::any::Any {
            self
        }
    }

    impl RestfulModule for Probe {
        fn register_rest(&self, _ctx: &ModuleCtx, router: Router) -> anyhow::Result<Router> {
            self.log.lock().push(format!("rest:{}", self.name));
            Ok(router)
        }
    }

    impl RestHostModule for Probe {
        fn rest_prepare(&self, _ctx: &ModuleCtx, router: Router) -> anyhow::Result<Router> {
            self.log.lock().push("prepare".into());
            Ok(router)
        }
        fn rest_finalize(&self, _ctx: &ModuleCtx, router: Router) -> anyhow::Result<Router> {
            self.log.lock().push("finalize".into());
            Ok(router)
        }
    }

    #[async_trait::async_trait]
    impl StatefulModule for Probe {
        async fn start(&self, _cancel: CancellationToken) -> anyhow::Result<()> {
            self.log.lock().push(format!("start:{}", self.name));
            Ok(())
        }
        async fn stop(&self, _cancel: CancellationToken) -> anyhow::Result<()> {
            self.log.lock().push(format!("stop:{}", self.name));
            anyhow::bail!("stop failures are tolerated")
        }
    }

    fn probe(name: &'static str, log: &Arc<Mutex<Vec<String>>>) -> Arc<Probe> {
        Arc::new(Probe {
            name,
            log: log.clone(),
        })
    }

    fn core_only(names: &[(&'static str, &[&'static str])]) -> RegistryBuilder {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut b = RegistryBuilder::default();
        for &(name, deps) in names {
            b.add(ModuleBinding::new(name, probe(name, &log)).depends_on(deps));
        }
        b
    }

    #[test]
    fn dependencies_come_first_and_ties_keep_registration_order() {
        let reg = core_only(&[
            ("news", &["auth"]),
            ("events", &["auth"]),
            ("auth", &["api_ingress"]),
            ("api_ingress", &[]),
        ])
        .build()
        .unwrap();

        assert_eq!(reg.names(), vec!["api_ingress", "auth", "news", "events"]);
        assert!(reg.get_module("news").is_some());
        assert!(reg.get_module("users").is_none());
    }

    #[test]
    fn unknown_dependency_is_reported() {
        let err = core_only(&[("events", &["auth"])]).build().unwrap_err();
        match err {
            RegistryError::UnknownDependency { module, depends_on } => {
                assert_eq!(module, "events");
                assert_eq!(depends_on, "auth");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn cycle_path_excludes_unrelated_modules() {
        let err = core_only(&[("a", &["b"]), ("b", &["c"]), ("c", &["a"]), ("d", &[])])
            .build()
            .unwrap_err();
        match &err {
            RegistryError::CycleDetected { path } => {
                assert_eq!(path.len(), 4);
                assert_eq!(path.first(), path.last());
                assert!(!path.contains(&"d"));
            }
            other => panic!("expected cycle, got {other:?}"),
        }
        assert!(err.to_string().contains(" -> "));
    }

    #[test]
    fn duplicates_and_second_host_are_configuration_errors() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut b = RegistryBuilder::default();
        let h1 = probe("h1", &log);
        let h2 = probe("h2", &log);
        b.add(ModuleBinding::new("h1", h1.clone()).rest_host(h1));
        b.add(ModuleBinding::new("h2", h2.clone()).rest_host(h2));
        b.add(ModuleBinding::new("h2", probe("h2", &log)));

        match b.build().unwrap_err() {
            RegistryError::InvalidConfiguration { errors } => {
                assert_eq!(errors.len(), 2, "{errors:?}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn rest_without_host_is_rejected() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let svc = probe("svc", &log);
        let mut b = RegistryBuilder::default();
        b.add(ModuleBinding::new("svc", svc.clone()).rest(svc));
        let reg = b.build().unwrap();

        let ctx = ModuleCtxBuilder::new(CancellationToken::new()).build();
        assert!(matches!(
            reg.run_rest_phase(&ctx, Router::new()),
            Err(RegistryError::RestRequiresHost)
        ));
    }

    #[tokio::test]
    async fn phases_run_in_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let host = probe("host", &log);
        let svc = probe("svc", &log);

        let mut b = RegistryBuilder::default();
        b.add(ModuleBinding::new("svc", svc.clone()).depends_on(&["host"]).rest(svc));
        b.add(
            ModuleBinding::new("host", host.clone())
                .rest_host(host.clone())
                .stateful(host),
        );
        let reg = b.build().unwrap();

        let ctx = ModuleCtxBuilder::new(CancellationToken::new()).build();
        reg.run_init_phase(&ctx).await.unwrap();
        reg.run_rest_phase(&ctx, Router::new()).unwrap();
        let cancel = CancellationToken::new();
        reg.run_start_phase(cancel.clone()).await.unwrap();
        reg.run_stop_phase(cancel).await;

        assert_eq!(
            *log.lock(),
            vec![
                "init:host",
                "init:svc",
                "prepare",
                "rest:svc",
                "finalize",
                "start:host",
                "stop:host",
            ]
        );
    }
}
