//! # Thematic Engine
//!
//! Resolves component identities to theme-specific implementations and
//! keeps the code that uses a component insulated from which one was chosen.
//!
//! ## Architecture
//!
//! - **`resolver`**: override-then-default lookup along a theme's ancestry
//! - **`cache`**: process-wide module cache with single-flight loading
//! - **`binding`**: wrapper-side inputs/outputs and re-binding onto implementations
//! - **`context`**: the active theme, observed through a watch channel
//! - **`wrapper`**: the stable proxy owning one resolved implementation
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use serde_json::json;
//! use thematic_engine::{ThemeContext, ThemedResolver, ThemedWrapper};
//! use thematic_registry::{ComponentRegistry, PropertyModule, ThemeCatalog, ready};
//! use thematic_types::BindingDescriptor;
//!
//! # tokio::runtime::Runtime::new()?.block_on(async {
//! let mut registry = ComponentRegistry::new();
//! registry.register(
//!     "FooComponent",
//!     BindingDescriptor::inputs(["title"])?,
//!     ready(PropertyModule::new("FooComponent").with_inputs(["title"])),
//! )?;
//! registry.register_override("FooComponent", "custom", ready(PropertyModule::new("custom/FooComponent").with_inputs(["title"])))?;
//!
//! let resolver = Arc::new(ThemedResolver::new(Arc::new(registry), ThemeCatalog::empty()));
//! let mut wrapper = ThemedWrapper::new("FooComponent", resolver, ThemeContext::fixed("custom"))?;
//! wrapper.set_input("title", json!("X"))?;
//! wrapper.attach().await?;
//!
//! assert_eq!(wrapper.used_theme().map(|theme| theme.as_str()), Some("custom"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! # })?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod binding;
pub mod cache;
pub mod context;
pub mod errors;
pub mod resolver;
pub mod wrapper;

pub use binding::{BindingSurface, OUTPUT_CHANNEL_CAPACITY, rebind};
pub use cache::{CacheKey, ModuleCache};
pub use context::{ThemeContext, ThemeSwitch, theme_channel};
pub use errors::{ResolutionError, WrapperError};
pub use resolver::{ResolvedImplementation, ThemedResolver};
pub use wrapper::{AttachOutcome, LifecycleHandle, ThemedWrapper};
