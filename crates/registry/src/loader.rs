//! Loaders produce component modules on demand.

use std::{fmt, future::Future, sync::Arc};

use async_trait::async_trait;

use crate::{ComponentModule, LoadError, LoadedModule};

/// Lazily loads the code of one implementation.
///
/// Loads may suspend (for example while fetching a bundle) and may fail.
/// Callers cache successful loads; a loader is invoked at most once per
/// successful load in a process.
#[async_trait]
pub trait ComponentLoader: Send + Sync {
    async fn load(&self) -> Result<LoadedModule, LoadError>;
}

/// Loader for a module that is already linked into the binary.
pub struct ReadyLoader {
    module: LoadedModule,
}

impl ReadyLoader {
    pub fn new(module: LoadedModule) -> Self {
        Self { module }
    }
}

#[async_trait]
impl ComponentLoader for ReadyLoader {
    async fn load(&self) -> Result<LoadedModule, LoadError> {
        Ok(Arc::clone(&self.module))
    }
}

impl fmt::Debug for ReadyLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadyLoader").field("module", &self.module.name()).finish()
    }
}

/// Loader backed by an async closure.
pub struct FnLoader<F> {
    load: F,
}

impl<F> FnLoader<F> {
    pub fn new(load: F) -> Self {
        Self { load }
    }
}

#[async_trait]
impl<F, Fut> ComponentLoader for FnLoader<F>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<LoadedModule, LoadError>> + Send + 'static,
{
    async fn load(&self) -> Result<LoadedModule, LoadError> {
        (self.load)().await
    }
}

/// Loader standing in for an implementation path that does not exist.
#[derive(Debug, Clone)]
pub struct MissingLoader {
    implementation: String,
}

impl MissingLoader {
    pub fn new(implementation: impl Into<String>) -> Self {
        Self {
            implementation: implementation.into(),
        }
    }
}

#[async_trait]
impl ComponentLoader for MissingLoader {
    async fn load(&self) -> Result<LoadedModule, LoadError> {
        Err(LoadError::not_found(self.implementation.clone()))
    }
}

/// Wrap an already-available module in a loader.
pub fn ready(module: impl ComponentModule + 'static) -> Arc<dyn ComponentLoader> {
    Arc::new(ReadyLoader::new(Arc::new(module)))
}

/// Wrap an async closure in a loader.
///
/// ```rust
/// use std::sync::Arc;
/// use thematic_registry::{LoadError, LoadedModule, PropertyModule, lazy};
///
/// let loader = lazy(|| async {
///     let module: LoadedModule = Arc::new(PropertyModule::new("custom/FooComponent"));
///     Ok::<_, LoadError>(module)
/// });
/// # drop(loader);
/// ```
pub fn lazy<F, Fut>(load: F) -> Arc<dyn ComponentLoader>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<LoadedModule, LoadError>> + Send + 'static,
{
    Arc::new(FnLoader::new(load))
}
