use std::{fmt, sync::Arc};

use indexmap::IndexMap;
use thematic_types::{BindingDescriptor, ComponentIdentity, ThemeIdentifier};
use tracing::debug;

use crate::{ComponentLoader, RegistryError};

/// Everything known about one logical component.
pub struct ComponentRegistration {
    identity: ComponentIdentity,
    bindings: BindingDescriptor,
    default_loader: Arc<dyn ComponentLoader>,
    overrides: IndexMap<ThemeIdentifier, Arc<dyn ComponentLoader>>,
}

impl ComponentRegistration {
    pub fn identity(&self) -> &ComponentIdentity {
        &self.identity
    }

    pub fn bindings(&self) -> &BindingDescriptor {
        &self.bindings
    }

    pub fn default_loader(&self) -> &Arc<dyn ComponentLoader> {
        &self.default_loader
    }

    /// Loader registered for exactly `theme`, ignoring inheritance.
    pub fn override_for(&self, theme: &ThemeIdentifier) -> Option<&Arc<dyn ComponentLoader>> {
        self.overrides.get(theme)
    }

    /// Themes with an override, in registration order.
    pub fn overridden_themes(&self) -> impl Iterator<Item = &ThemeIdentifier> {
        self.overrides.keys()
    }
}

impl fmt::Debug for ComponentRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentRegistration")
            .field("identity", &self.identity)
            .field("bindings", &self.bindings)
            .field("overrides", &self.overrides.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Registry mapping `(ComponentIdentity, ThemeIdentifier)` to loaders.
///
/// Populated at startup and shared read-only afterwards. Every identity has
/// exactly one default loader; theme overrides are optional.
#[derive(Debug, Default)]
pub struct ComponentRegistry {
    components: IndexMap<ComponentIdentity, ComponentRegistration>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a component with its binding descriptor and default implementation.
    pub fn register(
        &mut self,
        identity: impl Into<ComponentIdentity>,
        bindings: BindingDescriptor,
        default_loader: Arc<dyn ComponentLoader>,
    ) -> Result<&mut Self, RegistryError> {
        let identity = identity.into();
        if self.components.contains_key(&identity) {
            return Err(RegistryError::AlreadyRegistered { identity });
        }
        debug!(identity = %identity, binding_count = bindings.len(), "registered component");
        self.components.insert(
            identity.clone(),
            ComponentRegistration {
                identity,
                bindings,
                default_loader,
                overrides: IndexMap::new(),
            },
        );
        Ok(self)
    }

    /// Register a theme-specific implementation of an already registered component.
    pub fn register_override(
        &mut self,
        identity: impl Into<ComponentIdentity>,
        theme: impl Into<ThemeIdentifier>,
        loader: Arc<dyn ComponentLoader>,
    ) -> Result<&mut Self, RegistryError> {
        let identity = identity.into();
        let theme = theme.into();
        if theme.is_none() {
            return Err(RegistryError::MissingOverrideTheme { identity });
        }
        let Some(registration) = self.components.get_mut(&identity) else {
            return Err(RegistryError::UnknownComponent { identity });
        };
        if registration.overrides.contains_key(&theme) {
            return Err(RegistryError::DuplicateOverride { identity, theme });
        }
        debug!(identity = %identity, theme = %theme, "registered theme override");
        registration.overrides.insert(theme, loader);
        Ok(self)
    }

    pub fn get(&self, identity: &ComponentIdentity) -> Option<&ComponentRegistration> {
        self.components.get(identity)
    }

    pub fn registration(&self, identity: &ComponentIdentity) -> Result<&ComponentRegistration, RegistryError> {
        self.get(identity).ok_or_else(|| RegistryError::UnknownComponent {
            identity: identity.clone(),
        })
    }

    pub fn bindings_for(&self, identity: &ComponentIdentity) -> Result<&BindingDescriptor, RegistryError> {
        self.registration(identity).map(ComponentRegistration::bindings)
    }

    pub fn registrations(&self) -> impl Iterator<Item = &ComponentRegistration> {
        self.components.values()
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}
