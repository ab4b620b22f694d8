//! Type-keyed registry of shared clients.
//!
//! A provider module registers `Arc<T>` once during init (usually
//! `T = dyn SomeApi`); consumers fetch it by the same type. The key is
//! `type_name::<T>()`, which works for trait objects too.

use parking_lot::RwLock;
use std::{any::Any, collections::HashMap, sync::Arc};

#[derive(Debug, thiserror::Error)]
pub enum ClientHubError {
    #[error("client not registered: {0}")]
    NotFound(&'static str),

    #[error("client type mismatch: {0}")]
    TypeMismatch(&'static str),
}

type Slot = Box<dyn Any + Send + Sync>;

#[derive(Default)]
pub struct ClientHub {
    clients: RwLock<HashMap<&'static str, Slot>>,
}

impl ClientHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registering twice replaces the earlier client; Arcs already handed
    /// out stay valid.
    pub fn register<T>(&self, client: Arc<T>)
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let key = std::any::type_name::<T>();
        tracing::debug!(client = key, "client registered");
        self.clients.write().insert(key, Box::new(client));
    }

    pub fn get<T>(&self) -> Result<Arc<T>, ClientHubError>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let key = std::any::type_name::<T>();
        let clients = self.clients.read();
        let slot = clients.get(key).ok_or(ClientHubError::NotFound(key))?;
        slot.downcast_ref::<Arc<T>>()
            .cloned()
            .ok_or(ClientHubError::TypeMismatch(key))
    }

    pub fn contains<T>(&self) -> bool
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.clients.read().contains_key(std::any::type_name::<T>())
    }

    pub fn len(&self) -> usize {
        self.clients.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.read().is_empty()
    }
}
