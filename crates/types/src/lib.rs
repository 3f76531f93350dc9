//! Shared type definitions for themed component resolution.
//!
//! Everything here is plain data: identities, binding descriptors, theme
//! definitions and lifecycle states. Behaviour lives in `thematic-registry`
//! and `thematic-engine`.

use std::fmt;

use serde::{Deserialize, Serialize};

pub mod binding;
pub mod theme;

pub use binding::{Binding, BindingDescriptor, BindingDescriptorBuilder, BindingKind, BindingValue, DescriptorError};
pub use theme::{FallbackPolicy, ThemeDefinition};

/// Stable logical name of a UI capability, independent of any theme.
///
/// Example: `ComponentIdentity::from("ItemPageComponent")`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentIdentity(String);

impl ComponentIdentity {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ComponentIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ComponentIdentity {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ComponentIdentity {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Name of the active theme.
///
/// The empty identifier means "no active theme"; surrounding whitespace is
/// ignored so that `" "` and `""` are the same identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct ThemeIdentifier(String);

impl ThemeIdentifier {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.len() == name.len() {
            Self(name)
        } else {
            Self(trimmed.to_string())
        }
    }

    /// The "no active theme" identifier.
    pub fn none() -> Self {
        Self(String::new())
    }

    pub fn is_none(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the theme name, or `None` when no theme is active.
    pub fn name(&self) -> Option<&str> {
        if self.is_none() { None } else { Some(&self.0) }
    }
}

impl fmt::Display for ThemeIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_none() {
            f.write_str("<none>")
        } else {
            f.write_str(&self.0)
        }
    }
}

impl From<&str> for ThemeIdentifier {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ThemeIdentifier {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<Option<String>> for ThemeIdentifier {
    fn from(value: Option<String>) -> Self {
        value.map(Self::new).unwrap_or_default()
    }
}

impl From<ThemeIdentifier> for String {
    fn from(value: ThemeIdentifier) -> Self {
        value.0
    }
}

/// Where a resolved implementation came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "theme", rename_all = "snake_case")]
pub enum ImplementationSource {
    /// The identity's default (unthemed) implementation.
    Default,
    /// An override registered for the named theme.
    Themed(ThemeIdentifier),
}

impl ImplementationSource {
    /// Theme that supplied the implementation, `None` for the default.
    pub fn theme(&self) -> Option<&ThemeIdentifier> {
        match self {
            ImplementationSource::Default => None,
            ImplementationSource::Themed(theme) => Some(theme),
        }
    }

    pub fn is_default(&self) -> bool {
        matches!(self, ImplementationSource::Default)
    }
}

impl fmt::Display for ImplementationSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImplementationSource::Default => f.write_str("default"),
            ImplementationSource::Themed(theme) => write!(f, "theme:{}", theme),
        }
    }
}

/// Lifecycle of a single themed wrapper.
///
/// `Unresolved -> Resolving -> Resolved -> Unresolved`; a failed resolution
/// ends in the terminal `Failed` state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WrapperState {
    #[default]
    Unresolved,
    Resolving,
    Resolved,
    Failed,
}

impl WrapperState {
    pub fn as_str(&self) -> &'static str {
        match self {
            WrapperState::Unresolved => "unresolved",
            WrapperState::Resolving => "resolving",
            WrapperState::Resolved => "resolved",
            WrapperState::Failed => "failed",
        }
    }
}

impl fmt::Display for WrapperState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
