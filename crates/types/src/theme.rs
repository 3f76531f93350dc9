//! Theme definitions shared by configuration and the theme catalog.

use serde::{Deserialize, Serialize};

/// A named theme, optionally extending a parent theme.
///
/// Overrides registered for an ancestor apply to every descendant that does
/// not register its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ThemeDefinition {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extends: Option<String>,
}

impl ThemeDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            extends: None,
        }
    }

    pub fn extending(name: impl Into<String>, parent: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            extends: Some(parent.into()),
        }
    }
}

/// What to do when a registered theme override fails to load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FallbackPolicy {
    /// Fall back only when the override reports it does not exist; surface
    /// every other load failure.
    #[default]
    Strict,
    /// Fall back to the default on any override load failure.
    Lenient,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn theme_definition_parses_camel_case_yaml() {
        let theme: ThemeDefinition = serde_yaml::from_str("name: mantis\nextends: dspace\n").expect("theme");
        assert_eq!(theme, ThemeDefinition::extending("mantis", "dspace"));
    }

    #[test]
    fn fallback_policy_defaults_to_strict() {
        assert_eq!(FallbackPolicy::default(), FallbackPolicy::Strict);
        let parsed: FallbackPolicy = serde_yaml::from_str("lenient").expect("policy");
        assert_eq!(parsed, FallbackPolicy::Lenient);
    }
}
