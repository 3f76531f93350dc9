//! Themed component resolution.
//!
//! Resolution of `(identity, theme)` walks the theme's ancestry looking for a
//! registered override and falls back to the identity's default. Overrides
//! that report [`LoadError::NotFound`] are skipped; other override failures
//! are surfaced unless the resolver runs with [`FallbackPolicy::Lenient`].

use std::{fmt, sync::Arc};

use serde_json::Value;
use thematic_registry::{
    ComponentInstance, ComponentRegistration, ComponentRegistry, LoadError, LoadedModule, RegistryError, ThemeCatalog,
};
use thematic_types::{BindingDescriptor, ComponentIdentity, FallbackPolicy, ImplementationSource, ThemeIdentifier};
use thematic_util::ThematicConfig;
use tracing::{debug, error, warn};

use crate::{
    ResolutionError,
    cache::{CacheKey, ModuleCache},
};

/// A freshly instantiated implementation and what it was resolved from.
///
/// Owned by exactly one wrapper; dropped (and destroyed) when the wrapper
/// detaches or re-resolves.
pub struct ResolvedImplementation {
    identity: ComponentIdentity,
    requested_theme: ThemeIdentifier,
    source: ImplementationSource,
    module_name: String,
    bindings: BindingDescriptor,
    pub(crate) instance: Box<dyn ComponentInstance>,
}

impl ResolvedImplementation {
    pub fn identity(&self) -> &ComponentIdentity {
        &self.identity
    }

    /// Theme the caller asked for.
    pub fn requested_theme(&self) -> &ThemeIdentifier {
        &self.requested_theme
    }

    pub fn source(&self) -> &ImplementationSource {
        &self.source
    }

    /// Theme that supplied the implementation, `None` for the default.
    pub fn used_theme(&self) -> Option<&ThemeIdentifier> {
        self.source.theme()
    }

    pub fn module_name(&self) -> &str {
        &self.module_name
    }

    /// Declared bindings of the identity.
    pub fn bindings(&self) -> &BindingDescriptor {
        &self.bindings
    }

    pub fn instance(&self) -> &dyn ComponentInstance {
        self.instance.as_ref()
    }

    pub fn snapshot(&self) -> Value {
        self.instance.snapshot()
    }

    pub(crate) fn release(mut self) {
        debug!(identity = %self.identity, module = %self.module_name, "releasing implementation");
        self.instance.destroy();
    }
}

impl fmt::Debug for ResolvedImplementation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedImplementation")
            .field("identity", &self.identity)
            .field("requested_theme", &self.requested_theme)
            .field("source", &self.source)
            .field("module_name", &self.module_name)
            .finish()
    }
}

/// Resolves component identities to implementations for a theme.
pub struct ThemedResolver {
    registry: Arc<ComponentRegistry>,
    catalog: ThemeCatalog,
    cache: ModuleCache,
    policy: FallbackPolicy,
}

impl ThemedResolver {
    pub fn new(registry: Arc<ComponentRegistry>, catalog: ThemeCatalog) -> Self {
        Self {
            registry,
            catalog,
            cache: ModuleCache::new(),
            policy: FallbackPolicy::default(),
        }
    }

    /// Build a resolver using the configured themes and fallback policy.
    pub fn from_config(registry: Arc<ComponentRegistry>, config: &ThematicConfig) -> Result<Self, RegistryError> {
        let catalog = ThemeCatalog::new(config.themes.iter().cloned())?;
        Ok(Self::new(registry, catalog).with_policy(config.fallback_policy))
    }

    pub fn with_policy(mut self, policy: FallbackPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    pub fn catalog(&self) -> &ThemeCatalog {
        &self.catalog
    }

    pub fn cache(&self) -> &ModuleCache {
        &self.cache
    }

    pub fn policy(&self) -> FallbackPolicy {
        self.policy
    }

    /// Resolve and instantiate the implementation of `identity` for `theme`.
    ///
    /// `theme` may be the "no theme" identifier, in which case the default is
    /// used directly. Fails with [`ResolutionError::Failure`] only when the
    /// default cannot be loaded either.
    pub async fn resolve(&self, identity: &ComponentIdentity, theme: &ThemeIdentifier) -> Result<ResolvedImplementation, ResolutionError> {
        let registration = self
            .registry
            .get(identity)
            .ok_or_else(|| ResolutionError::unknown_component(identity))?;

        let (source, module) = self.locate(registration, theme).await?;
        debug!(
            identity = %identity,
            theme = %theme,
            source = %source,
            module = %module.name(),
            "component resolved"
        );

        Ok(ResolvedImplementation {
            identity: identity.clone(),
            requested_theme: theme.clone(),
            source,
            module_name: module.name().to_string(),
            bindings: registration.bindings().clone(),
            instance: module.instantiate(),
        })
    }

    async fn locate(
        &self,
        registration: &ComponentRegistration,
        theme: &ThemeIdentifier,
    ) -> Result<(ImplementationSource, LoadedModule), ResolutionError> {
        let identity = registration.identity();

        for candidate in self.catalog.ancestry(theme) {
            let Some(loader) = registration.override_for(&candidate) else {
                continue;
            };
            let source = ImplementationSource::Themed(candidate.clone());
            let key = CacheKey::new(identity.clone(), source.clone());
            match self.cache.get_or_load(&key, loader).await {
                Ok(module) => return Ok((source, module)),
                Err(cause) if cause.is_not_found() => {
                    debug!(identity = %identity, theme = %candidate, "override not found; falling back");
                }
                Err(cause) => match self.policy {
                    FallbackPolicy::Lenient => {
                        warn!(
                            identity = %identity,
                            theme = %candidate,
                            error = %cause,
                            "override failed to load; falling back"
                        );
                    }
                    FallbackPolicy::Strict => {
                        return Err(ResolutionError::OverrideLoad {
                            identity: identity.clone(),
                            theme: candidate,
                            cause,
                        });
                    }
                },
            }
        }

        let key = CacheKey::new(identity.clone(), ImplementationSource::Default);
        match self.cache.get_or_load(&key, registration.default_loader()).await {
            Ok(module) => Ok((ImplementationSource::Default, module)),
            Err(cause) => {
                error!(identity = %identity, theme = %theme, error = %cause, "no implementation could be loaded");
                Err(failure(identity, theme, cause))
            }
        }
    }
}

fn failure(identity: &ComponentIdentity, theme: &ThemeIdentifier, cause: LoadError) -> ResolutionError {
    ResolutionError::Failure {
        identity: identity.clone(),
        theme: theme.clone(),
        cause,
    }
}

impl fmt::Debug for ThemedResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThemedResolver")
            .field("components", &self.registry.len())
            .field("themes", &self.catalog.len())
            .field("policy", &self.policy)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use thematic_registry::{MissingLoader, PropertyModule, lazy, ready};
    use thematic_types::ThemeDefinition;

    fn registry() -> ComponentRegistry {
        let mut registry = ComponentRegistry::new();
        registry
            .register(
                "FooComponent",
                BindingDescriptor::inputs(["title", "content"]).expect("descriptor"),
                ready(PropertyModule::new("FooComponent").with_inputs(["title", "content"])),
            )
            .expect("register");
        registry
    }

    fn resolver(registry: ComponentRegistry) -> ThemedResolver {
        ThemedResolver::new(Arc::new(registry), ThemeCatalog::empty())
    }

    #[tokio::test]
    async fn default_used_without_override() {
        let resolver = resolver(registry());
        let resolved = resolver
            .resolve(&"FooComponent".into(), &"custom".into())
            .await
            .expect("resolved");
        assert_eq!(resolved.source(), &ImplementationSource::Default);
        assert_eq!(resolved.module_name(), "FooComponent");
        assert_eq!(resolved.used_theme(), None);
        assert_eq!(resolved.requested_theme().as_str(), "custom");
    }

    #[tokio::test]
    async fn override_preferred_when_registered() {
        let mut registry = registry();
        registry
            .register_override("FooComponent", "custom", ready(PropertyModule::new("custom/FooComponent")))
            .expect("override");
        let resolver = resolver(registry);

        let resolved = resolver
            .resolve(&"FooComponent".into(), &"custom".into())
            .await
            .expect("resolved");
        assert_eq!(resolved.module_name(), "custom/FooComponent");
        assert_eq!(resolved.used_theme().map(|t| t.as_str()), Some("custom"));

        let unthemed = resolver
            .resolve(&"FooComponent".into(), &ThemeIdentifier::none())
            .await
            .expect("resolved");
        assert!(unthemed.source().is_default());
    }

    #[tokio::test]
    async fn ancestor_override_applies_to_descendants() {
        let mut registry = registry();
        registry
            .register_override("FooComponent", "dspace", ready(PropertyModule::new("dspace/FooComponent")))
            .expect("override");
        let catalog = ThemeCatalog::new(vec![ThemeDefinition::new("dspace"), ThemeDefinition::extending("mantis", "dspace")])
            .expect("catalog");
        let resolver = ThemedResolver::new(Arc::new(registry), catalog);

        let resolved = resolver
            .resolve(&"FooComponent".into(), &"mantis".into())
            .await
            .expect("resolved");
        assert_eq!(resolved.module_name(), "dspace/FooComponent");
        assert_eq!(resolved.used_theme().map(|t| t.as_str()), Some("dspace"));
    }

    #[tokio::test]
    async fn not_found_override_falls_back() {
        let mut registry = registry();
        registry
            .register_override("FooComponent", "custom", Arc::new(MissingLoader::new("custom/FooComponent")))
            .expect("override");
        let resolver = resolver(registry);

        let resolved = resolver
            .resolve(&"FooComponent".into(), &"custom".into())
            .await
            .expect("resolved");
        assert!(resolved.source().is_default());
    }

    #[tokio::test]
    async fn strict_policy_surfaces_override_load_errors() {
        let mut registry = registry();
        registry
            .register_override(
                "FooComponent",
                "custom",
                lazy(|| async { Err::<LoadedModule, _>(LoadError::transient("custom/FooComponent", "connection reset")) }),
            )
            .expect("override");
        let resolver = resolver(registry);

        let error = resolver
            .resolve(&"FooComponent".into(), &"custom".into())
            .await
            .expect_err("strict policy surfaces the failure");
        assert!(matches!(error, ResolutionError::OverrideLoad { .. }));
        assert!(error.is_transient());
    }

    #[tokio::test]
    async fn lenient_policy_falls_back_on_any_override_error() {
        let mut registry = registry();
        registry
            .register_override(
                "FooComponent",
                "custom",
                lazy(|| async { Err::<LoadedModule, _>(LoadError::failed("custom/FooComponent", "bad bundle")) }),
            )
            .expect("override");
        let resolver = resolver(registry).with_policy(FallbackPolicy::Lenient);

        let resolved = resolver
            .resolve(&"FooComponent".into(), &"custom".into())
            .await
            .expect("lenient fallback");
        assert!(resolved.source().is_default());
    }

    #[tokio::test]
    async fn missing_default_is_a_resolution_failure() {
        let mut registry = ComponentRegistry::new();
        registry
            .register("BrokenComponent", BindingDescriptor::empty(), Arc::new(MissingLoader::new("BrokenComponent")))
            .expect("register");
        let resolver = resolver(registry);

        let error = resolver
            .resolve(&"BrokenComponent".into(), &"custom".into())
            .await
            .expect_err("no implementation");
        assert!(matches!(error, ResolutionError::Failure { .. }));
    }

    #[tokio::test]
    async fn unknown_identity_is_rejected() {
        let resolver = resolver(registry());
        let error = resolver
            .resolve(&"Nope".into(), &ThemeIdentifier::none())
            .await
            .expect_err("unknown");
        assert_eq!(error, ResolutionError::unknown_component(&"Nope".into()));
    }

    #[test]
    fn from_config_applies_policy_and_themes() {
        let config = ThematicConfig {
            active_theme: None,
            fallback_policy: FallbackPolicy::Lenient,
            themes: vec![ThemeDefinition::new("dspace")],
        };
        let resolver = ThemedResolver::from_config(Arc::new(registry()), &config).expect("resolver");
        assert_eq!(resolver.policy(), FallbackPolicy::Lenient);
        assert!(resolver.catalog().contains("dspace"));
    }
}
