/// Where a full serialized snapshot of the collection may come from.
pub trait SnapshotSource: Send + Sync {
    fn load(&self) -> Option<String>;
}

/// Snapshot carried in an environment variable (stateless deployments).
#[derive(Debug, Clone)]
pub struct EnvSnapshot {
    var: String,
}

impl EnvSnapshot {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl SnapshotSource for EnvSnapshot {
    fn load(&self) -> Option<String> {
        std::env::var(&self.var).ok().filter(|v| !v.trim().is_empty())
    }
}

/// Fixed snapshot, or none at all.
#[derive(Debug, Clone, Default)]
pub struct FixedSnapshot(pub Option<String>);

impl SnapshotSource for FixedSnapshot {
    fn load(&self) -> Option<String> {
        self.0.clone()
    }
}
