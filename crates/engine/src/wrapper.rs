//! The themed wrapper: a stable proxy that resolves, owns and binds one implementation.
//!
//! Lifecycle:
//!
//! ```text
//! Unresolved --attach--> Resolving --ok--> Resolved --detach/destroy--> Unresolved
//!                            |
//!                            +--error--> Failed (terminal)
//! ```
//!
//! A wrapper can be destroyed from elsewhere through its [`LifecycleHandle`],
//! including while a resolution is in flight; the eventual result is then
//! discarded without binding anything.

use std::sync::Arc;

use thematic_types::{BindingDescriptor, BindingValue, ComponentIdentity, ImplementationSource, ThemeIdentifier, WrapperState};
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::{BindingSurface, ResolutionError, ResolvedImplementation, ThemeContext, ThemedResolver, WrapperError, rebind};

/// Result of [`ThemedWrapper::attach`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttachOutcome {
    /// An implementation was resolved and bound.
    Bound(ImplementationSource),
    /// The wrapper was already resolved; nothing changed.
    AlreadyBound,
    /// The wrapper was destroyed while resolving; the result was dropped.
    Discarded,
}

/// Destroys a wrapper from outside its owner.
#[derive(Debug, Clone)]
pub struct LifecycleHandle {
    identity: ComponentIdentity,
    token: CancellationToken,
}

impl LifecycleHandle {
    pub fn destroy(&self) {
        if !self.token.is_cancelled() {
            debug!(identity = %self.identity, "wrapper destroyed through lifecycle handle");
        }
        self.token.cancel();
    }

    pub fn is_destroyed(&self) -> bool {
        self.token.is_cancelled()
    }
}

struct ActivePairing {
    implementation: ResolvedImplementation,
    pairing: CancellationToken,
}

/// Stable-identity proxy for a themed component.
pub struct ThemedWrapper {
    identity: ComponentIdentity,
    resolver: Arc<ThemedResolver>,
    theme: ThemeContext,
    surface: BindingSurface,
    state: WrapperState,
    active: Option<ActivePairing>,
    lifecycle: CancellationToken,
}

impl ThemedWrapper {
    pub fn new(identity: impl Into<ComponentIdentity>, resolver: Arc<ThemedResolver>, theme: ThemeContext) -> Result<Self, WrapperError> {
        let identity = identity.into();
        let bindings = resolver
            .registry()
            .bindings_for(&identity)
            .map_err(|_| ResolutionError::unknown_component(&identity))?
            .clone();
        Ok(Self {
            surface: BindingSurface::new(identity.clone(), bindings),
            identity,
            resolver,
            theme,
            state: WrapperState::Unresolved,
            active: None,
            lifecycle: CancellationToken::new(),
        })
    }

    pub fn identity(&self) -> &ComponentIdentity {
        &self.identity
    }

    pub fn bindings(&self) -> &BindingDescriptor {
        self.surface.descriptor()
    }

    /// Current lifecycle state. A destroyed wrapper reports `Unresolved`.
    pub fn state(&self) -> WrapperState {
        if self.is_destroyed() && self.state != WrapperState::Failed {
            WrapperState::Unresolved
        } else {
            self.state
        }
    }

    pub fn is_destroyed(&self) -> bool {
        self.lifecycle.is_cancelled()
    }

    pub fn lifecycle_handle(&self) -> LifecycleHandle {
        LifecycleHandle {
            identity: self.identity.clone(),
            token: self.lifecycle.clone(),
        }
    }

    /// The bound implementation, if resolved.
    pub fn implementation(&self) -> Option<&ResolvedImplementation> {
        if self.is_destroyed() {
            return None;
        }
        self.active.as_ref().map(|active| &active.implementation)
    }

    /// Theme that supplied the bound implementation; `None` for the default
    /// or when nothing is bound.
    pub fn used_theme(&self) -> Option<&ThemeIdentifier> {
        self.implementation().and_then(ResolvedImplementation::used_theme)
    }

    /// Set a declared input. Applied immediately when resolved, otherwise
    /// remembered and applied at the next bind.
    pub fn set_input(&mut self, name: &str, value: BindingValue) -> Result<(), WrapperError> {
        self.reap_if_destroyed();
        if self.is_destroyed() {
            return Err(self.destroyed_error());
        }
        self.surface.set_input(name, value.clone())?;
        if let Some(active) = self.active.as_mut() {
            active.implementation.instance.set_input(name, value)?;
        }
        Ok(())
    }

    pub fn input(&self, name: &str) -> Option<&BindingValue> {
        self.surface.input(name)
    }

    /// Subscribe to a declared output. The subscription follows the wrapper
    /// across re-resolutions.
    pub fn subscribe(&self, name: &str) -> Result<broadcast::Receiver<BindingValue>, WrapperError> {
        Ok(self.surface.subscribe(name)?)
    }

    /// Resolve an implementation for the current theme and bind it.
    pub async fn attach(&mut self) -> Result<AttachOutcome, WrapperError> {
        self.reap_if_destroyed();
        if self.is_destroyed() {
            return Err(self.destroyed_error());
        }
        match self.state {
            WrapperState::Failed => {
                return Err(WrapperError::Failed {
                    identity: self.identity.clone(),
                });
            }
            WrapperState::Resolved => return Ok(AttachOutcome::AlreadyBound),
            WrapperState::Unresolved | WrapperState::Resolving => {}
        }

        let theme = self.theme.observe();
        debug!(identity = %self.identity, theme = %theme, "resolving wrapper");
        let resolved = {
            let resolving = ResolvingGuard::enter(&mut self.state);
            let resolved = self.resolver.resolve(&self.identity, &theme).await;
            resolving.complete();
            resolved
        };

        if self.is_destroyed() {
            self.state = WrapperState::Unresolved;
            if let Ok(implementation) = resolved {
                implementation.release();
            }
            warn!(identity = %self.identity, "wrapper destroyed during resolution; result discarded");
            return Ok(AttachOutcome::Discarded);
        }

        let mut implementation = match resolved {
            Ok(implementation) => implementation,
            Err(resolution_error) => {
                self.state = WrapperState::Failed;
                error!(identity = %self.identity, theme = %theme, error = %resolution_error, "wrapper resolution failed");
                return Err(resolution_error.into());
            }
        };

        let pairing = self.lifecycle.child_token();
        let bindings = implementation.bindings().clone();
        if let Err(binding_error) = rebind(&self.surface, &mut implementation, &bindings, &pairing) {
            pairing.cancel();
            implementation.release();
            self.state = WrapperState::Failed;
            error!(identity = %self.identity, error = %binding_error, "binding implementation failed");
            return Err(binding_error.into());
        }

        let source = implementation.source().clone();
        info!(identity = %self.identity, theme = %theme, source = %source, "wrapper resolved");
        self.active = Some(ActivePairing { implementation, pairing });
        self.state = WrapperState::Resolved;
        Ok(AttachOutcome::Bound(source))
    }

    /// Release the bound implementation. Returns `false` if nothing was bound.
    pub fn detach(&mut self) -> bool {
        let Some(active) = self.active.take() else {
            return false;
        };
        active.pairing.cancel();
        active.implementation.release();
        if self.state == WrapperState::Resolved {
            self.state = WrapperState::Unresolved;
        }
        true
    }

    /// Destroy the wrapper, releasing any bound implementation.
    pub fn destroy(&mut self) {
        self.lifecycle.cancel();
        self.detach();
    }

    /// Re-resolve if the active theme differs from the one the bound
    /// implementation was resolved for. Returns whether re-resolution happened.
    pub async fn refresh_theme(&mut self) -> Result<bool, WrapperError> {
        self.reap_if_destroyed();
        if self.is_destroyed() {
            return Err(self.destroyed_error());
        }
        let Some(active) = self.active.as_ref() else {
            return Ok(false);
        };
        let current = self.theme.current();
        if active.implementation.requested_theme() == &current {
            return Ok(false);
        }

        info!(
            identity = %self.identity,
            from = %active.implementation.requested_theme(),
            to = %current,
            "theme changed; re-resolving wrapper"
        );
        self.detach();
        self.attach().await?;
        Ok(true)
    }

    /// Wait for the next theme change, then refresh.
    ///
    /// Returns `Ok(false)` when the theme can no longer change. A destroy
    /// through a [`LifecycleHandle`] ends the wait, releases the bound
    /// implementation and yields [`WrapperError::Destroyed`].
    pub async fn watch_theme(&mut self) -> Result<bool, WrapperError> {
        self.reap_if_destroyed();
        if self.is_destroyed() {
            return Err(self.destroyed_error());
        }
        let lifecycle = self.lifecycle.clone();
        let changed = tokio::select! {
            _ = lifecycle.cancelled() => None,
            changed = self.theme.changed() => Some(changed),
        };
        match changed {
            None => {
                self.detach();
                debug!(identity = %self.identity, "wrapper destroyed while watching the theme");
                Err(self.destroyed_error())
            }
            Some(false) => Ok(false),
            Some(true) => self.refresh_theme().await,
        }
    }

    fn reap_if_destroyed(&mut self) {
        if self.is_destroyed() {
            self.detach();
        }
    }

    fn destroyed_error(&self) -> WrapperError {
        WrapperError::Destroyed {
            identity: self.identity.clone(),
        }
    }
}

/// Marks a wrapper as resolving. Dropped without [`ResolvingGuard::complete`]
/// (an `attach` future cancelled mid-load), it puts the wrapper back to
/// `Unresolved`.
struct ResolvingGuard<'a> {
    state: &'a mut WrapperState,
    completed: bool,
}

impl<'a> ResolvingGuard<'a> {
    fn enter(state: &'a mut WrapperState) -> Self {
        *state = WrapperState::Resolving;
        Self { state, completed: false }
    }

    fn complete(mut self) {
        self.completed = true;
    }
}

impl Drop for ResolvingGuard<'_> {
    fn drop(&mut self) {
        if !self.completed {
            *self.state = WrapperState::Unresolved;
        }
    }
}

impl Drop for ThemedWrapper {
    fn drop(&mut self) {
        self.destroy();
    }
}

impl std::fmt::Debug for ThemedWrapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThemedWrapper")
            .field("identity", &self.identity)
            .field("state", &self.state())
            .field("implementation", &self.implementation())
            .finish()
    }
}
