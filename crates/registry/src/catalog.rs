//! Theme catalog and inheritance.
//!
//! Themes may extend a parent theme. When resolving a component for a theme,
//! overrides are searched along the theme's ancestry: the theme itself, then
//! its parent, then the parent's parent.

use std::collections::HashSet;

use indexmap::IndexMap;
use thematic_types::{ThemeDefinition, ThemeIdentifier};

use crate::RegistryError;

/// Known themes and their parents. Guaranteed free of cycles and dangling parents.
#[derive(Debug, Clone, Default)]
pub struct ThemeCatalog {
    parents: IndexMap<String, Option<String>>,
}

impl ThemeCatalog {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(definitions: impl IntoIterator<Item = ThemeDefinition>) -> Result<Self, RegistryError> {
        let mut parents = IndexMap::new();
        for definition in definitions {
            if parents.contains_key(&definition.name) {
                return Err(RegistryError::DuplicateTheme { name: definition.name });
            }
            parents.insert(definition.name, definition.extends);
        }

        for (name, parent) in &parents {
            if let Some(parent) = parent
                && !parents.contains_key(parent)
            {
                return Err(RegistryError::UnknownParentTheme {
                    name: name.clone(),
                    parent: parent.clone(),
                });
            }
        }

        let catalog = Self { parents };
        catalog.reject_cycles()?;
        Ok(catalog)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.parents.contains_key(name)
    }

    pub fn parent_of(&self, name: &str) -> Option<&str> {
        self.parents.get(name).and_then(|parent| parent.as_deref())
    }

    /// The theme followed by its ancestors, nearest first.
    ///
    /// The "no theme" identifier has no ancestry. A theme missing from the
    /// catalog is its own sole ancestor.
    pub fn ancestry(&self, theme: &ThemeIdentifier) -> Vec<ThemeIdentifier> {
        let Some(name) = theme.name() else {
            return Vec::new();
        };
        let mut chain = vec![theme.clone()];
        let mut cursor = self.parent_of(name);
        while let Some(parent) = cursor {
            chain.push(ThemeIdentifier::new(parent));
            cursor = self.parent_of(parent);
        }
        chain
    }

    pub fn definitions(&self) -> impl Iterator<Item = ThemeDefinition> + '_ {
        self.parents.iter().map(|(name, parent)| ThemeDefinition {
            name: name.clone(),
            extends: parent.clone(),
        })
    }

    pub fn len(&self) -> usize {
        self.parents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }

    fn reject_cycles(&self) -> Result<(), RegistryError> {
        for start in self.parents.keys() {
            let mut visited = HashSet::new();
            let mut chain = vec![start.clone()];
            visited.insert(start.as_str());
            let mut cursor = self.parent_of(start);
            while let Some(parent) = cursor {
                chain.push(parent.to_string());
                if !visited.insert(parent) {
                    return Err(RegistryError::ThemeCycle { chain });
                }
                cursor = self.parent_of(parent);
            }
        }
        Ok(())
    }
}
