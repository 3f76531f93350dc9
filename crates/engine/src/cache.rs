//! Process-wide module cache with single-flight loading.
//!
//! A key is either loaded, loading, or absent. Requests for a key that is
//! loading join the in-flight load instead of starting another one; every
//! joined caller observes the same outcome. Failed loads are not cached.

use std::{
    collections::HashMap,
    fmt,
    sync::{Arc, Mutex},
};

use futures_util::future::{BoxFuture, FutureExt, Shared};
use thematic_registry::{ComponentLoader, LoadError, LoadedModule};
use thematic_types::{ComponentIdentity, ImplementationSource};
use tracing::{debug, info, warn};

type PendingLoad = Shared<BoxFuture<'static, Result<LoadedModule, LoadError>>>;

/// Cache key: one component identity and the source of its implementation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub identity: ComponentIdentity,
    pub source: ImplementationSource,
}

impl CacheKey {
    pub fn new(identity: ComponentIdentity, source: ImplementationSource) -> Self {
        Self { identity, source }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.identity, self.source)
    }
}

enum Slot {
    Ready(LoadedModule),
    Loading(PendingLoad),
}

#[derive(Default)]
pub struct ModuleCache {
    slots: Mutex<HashMap<CacheKey, Slot>>,
}

impl ModuleCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached module for `key`, joining or starting a load as needed.
    pub async fn get_or_load(&self, key: &CacheKey, loader: &Arc<dyn ComponentLoader>) -> Result<LoadedModule, LoadError> {
        let pending = {
            let mut slots = self.slots.lock().expect("module cache lock");
            match slots.get(key) {
                Some(Slot::Ready(module)) => {
                    debug!(cache_key = %key, "module cache hit");
                    return Ok(Arc::clone(module));
                }
                Some(Slot::Loading(pending)) => {
                    debug!(cache_key = %key, "joining in-flight module load");
                    pending.clone()
                }
                None => {
                    debug!(cache_key = %key, "module cache miss; starting load");
                    let loader = Arc::clone(loader);
                    let pending = async move { loader.load().await }.boxed().shared();
                    slots.insert(key.clone(), Slot::Loading(pending.clone()));
                    pending
                }
            }
        };

        let outcome = pending.clone().await;
        self.settle(key, &pending, &outcome);
        outcome
    }

    /// Whether `key` holds a loaded module.
    pub fn is_loaded(&self, key: &CacheKey) -> bool {
        matches!(self.slots.lock().expect("module cache lock").get(key), Some(Slot::Ready(_)))
    }

    /// Whether a load for `key` is currently in flight.
    pub fn is_loading(&self, key: &CacheKey) -> bool {
        matches!(self.slots.lock().expect("module cache lock").get(key), Some(Slot::Loading(_)))
    }

    /// Number of loaded modules.
    pub fn loaded_count(&self) -> usize {
        self.slots
            .lock()
            .expect("module cache lock")
            .values()
            .filter(|slot| matches!(slot, Slot::Ready(_)))
            .count()
    }

    fn settle(&self, key: &CacheKey, pending: &PendingLoad, outcome: &Result<LoadedModule, LoadError>) {
        let mut slots = self.slots.lock().expect("module cache lock");
        // Only the load that created the slot may settle it; later loads for
        // the same key own their own slot.
        let owns_slot = matches!(slots.get(key), Some(Slot::Loading(current)) if current.ptr_eq(pending));
        if !owns_slot {
            return;
        }
        match outcome {
            Ok(module) => {
                info!(cache_key = %key, module = %module.name(), "module loaded");
                slots.insert(key.clone(), Slot::Ready(Arc::clone(module)));
            }
            Err(error) => {
                warn!(cache_key = %key, error = %error, "module load failed");
                slots.remove(key);
            }
        }
    }
}

impl fmt::Debug for ModuleCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleCache").field("loaded", &self.loaded_count()).finish()
    }
}
