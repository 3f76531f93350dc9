//! Registry crate for themed component definitions.
//!
//! This crate provides the component abstractions (modules, instances,
//! loaders), the registry mapping component identities and themes to
//! loaders, and the theme catalog that describes theme inheritance.

pub mod catalog;
pub mod component;
pub mod errors;
pub mod loader;
pub mod models;
pub mod property;

pub use catalog::ThemeCatalog;
pub use component::{ComponentInstance, ComponentModule, LoadedModule, OutputSink};
pub use errors::{BindingError, LoadError, RegistryError};
pub use loader::{ComponentLoader, FnLoader, MissingLoader, ReadyLoader, lazy, ready};
pub use models::{ComponentRegistration, ComponentRegistry};
pub use property::PropertyModule;
pub use thematic_types::{BindingDescriptor, BindingKind, BindingValue, ComponentIdentity, ThemeDefinition, ThemeIdentifier};
