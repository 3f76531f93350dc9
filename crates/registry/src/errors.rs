//! Error types for component registration, loading and binding.

use thematic_types::{BindingKind, ComponentIdentity, ThemeIdentifier};
use thiserror::Error;

/// Errors raised while building the component registry or theme catalog.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("component not registered: {identity}")]
    UnknownComponent { identity: ComponentIdentity },

    #[error("component already registered: {identity}")]
    AlreadyRegistered { identity: ComponentIdentity },

    #[error("override of {identity} for theme '{theme}' already registered")]
    DuplicateOverride { identity: ComponentIdentity, theme: ThemeIdentifier },

    #[error("override of {identity} needs a theme name")]
    MissingOverrideTheme { identity: ComponentIdentity },

    #[error("theme defined more than once: {name}")]
    DuplicateTheme { name: String },

    #[error("theme '{name}' extends unknown theme '{parent}'")]
    UnknownParentTheme { name: String, parent: String },

    #[error("theme inheritance cycle: {}", .chain.join(" -> "))]
    ThemeCycle { chain: Vec<String> },
}

/// Errors reported by a [`crate::ComponentLoader`].
///
/// `NotFound` means the implementation does not exist and is the expected
/// fallback path for theme overrides; every other variant is a real failure.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LoadError {
    #[error("implementation not found: {implementation}")]
    NotFound { implementation: String },

    #[error("transient failure loading {implementation}: {reason}")]
    Transient { implementation: String, reason: String },

    #[error("failed to load {implementation}: {reason}")]
    Failed { implementation: String, reason: String },
}

impl LoadError {
    pub fn not_found(implementation: impl Into<String>) -> Self {
        Self::NotFound {
            implementation: implementation.into(),
        }
    }

    pub fn transient(implementation: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Transient {
            implementation: implementation.into(),
            reason: reason.into(),
        }
    }

    pub fn failed(implementation: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Failed {
            implementation: implementation.into(),
            reason: reason.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, LoadError::NotFound { .. })
    }
}

/// Errors raised while forwarding inputs and outputs.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BindingError {
    /// The implementation lacks a binding its descriptor declares.
    #[error("binding mismatch: {implementation} has no {kind} named '{name}'")]
    Mismatch {
        implementation: String,
        name: String,
        kind: BindingKind,
    },

    /// A wrapper was asked for a binding its descriptor does not declare.
    #[error("'{name}' is not a declared {kind} of {identity}")]
    Undeclared {
        identity: ComponentIdentity,
        name: String,
        kind: BindingKind,
    },

    #[error("{implementation} rejected input '{name}': {reason}")]
    Rejected {
        implementation: String,
        name: String,
        reason: String,
    },
}

impl BindingError {
    pub fn mismatch(implementation: impl Into<String>, name: impl Into<String>, kind: BindingKind) -> Self {
        Self::Mismatch {
            implementation: implementation.into(),
            name: name.into(),
            kind,
        }
    }

    pub fn undeclared(identity: &ComponentIdentity, name: impl Into<String>, kind: BindingKind) -> Self {
        Self::Undeclared {
            identity: identity.clone(),
            name: name.into(),
            kind,
        }
    }

    pub fn rejected(implementation: impl Into<String>, name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Rejected {
            implementation: implementation.into(),
            name: name.into(),
            reason: reason.into(),
        }
    }
}
