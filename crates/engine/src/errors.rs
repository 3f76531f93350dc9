//! Error types for resolution and wrapper lifecycle.

use thematic_registry::{BindingError, LoadError};
use thematic_types::{ComponentIdentity, ThemeIdentifier};
use thiserror::Error;

/// Errors produced by [`crate::ThemedResolver::resolve`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResolutionError {
    #[error("component not registered: {identity}")]
    UnknownComponent { identity: ComponentIdentity },

    /// Neither a themed override nor the default could be loaded. This is a
    /// configuration error: every identity must have a loadable default.
    #[error("no implementation of {identity} available for theme {theme}: {cause}")]
    Failure {
        identity: ComponentIdentity,
        theme: ThemeIdentifier,
        cause: LoadError,
    },

    /// A registered override failed for a reason other than "not found".
    #[error("override of {identity} from theme '{theme}' failed to load: {cause}")]
    OverrideLoad {
        identity: ComponentIdentity,
        theme: ThemeIdentifier,
        cause: LoadError,
    },
}

impl ResolutionError {
    pub fn unknown_component(identity: &ComponentIdentity) -> Self {
        Self::UnknownComponent {
            identity: identity.clone(),
        }
    }

    /// Whether retrying the same resolution could succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            ResolutionError::UnknownComponent { .. } => false,
            ResolutionError::Failure { cause, .. } | ResolutionError::OverrideLoad { cause, .. } => {
                matches!(cause, LoadError::Transient { .. })
            }
        }
    }
}

/// Errors produced by [`crate::ThemedWrapper`].
#[derive(Debug, Error)]
pub enum WrapperError {
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error(transparent)]
    Binding(#[from] BindingError),

    #[error("wrapper for {identity} failed to resolve and cannot be reused")]
    Failed { identity: ComponentIdentity },

    #[error("wrapper for {identity} has been destroyed")]
    Destroyed { identity: ComponentIdentity },
}
