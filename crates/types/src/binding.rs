//! Binding descriptors: the named inputs and outputs a wrapper forwards.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Values travelling through input and output bindings.
pub type BindingValue = serde_json::Value;

/// Direction of a binding relative to the resolved implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BindingKind {
    /// Wrapper value pushed into the implementation.
    Input,
    /// Implementation event re-emitted by the wrapper.
    Output,
}

impl fmt::Display for BindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindingKind::Input => f.write_str("input"),
            BindingKind::Output => f.write_str("output"),
        }
    }
}

/// A single named binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Binding {
    pub name: String,
    pub kind: BindingKind,
}

/// Errors produced while building a [`BindingDescriptor`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DescriptorError {
    #[error("binding name cannot be empty")]
    EmptyName,

    #[error("binding '{name}' declared more than once")]
    Duplicate { name: String },
}

/// Ordered list of bindings declared statically for one component identity.
///
/// Names are unique across inputs and outputs. Order is declaration order and
/// is the order in which inputs are applied when an implementation is bound.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BindingDescriptor {
    bindings: Vec<Binding>,
}

impl BindingDescriptor {
    /// Descriptor with no bindings.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn builder() -> BindingDescriptorBuilder {
        BindingDescriptorBuilder::default()
    }

    /// Descriptor made only of inputs, in the given order.
    ///
    /// ```rust
    /// use thematic_types::BindingDescriptor;
    ///
    /// let descriptor = BindingDescriptor::inputs(["title", "content"]).unwrap();
    /// assert_eq!(descriptor.input_names().collect::<Vec<_>>(), vec!["title", "content"]);
    /// ```
    pub fn inputs<I, S>(names: I) -> Result<Self, DescriptorError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        names.into_iter().fold(Self::builder(), |builder, name| builder.input(name)).build()
    }

    pub fn from_bindings(bindings: Vec<Binding>) -> Result<Self, DescriptorError> {
        for (index, binding) in bindings.iter().enumerate() {
            if binding.name.trim().is_empty() {
                return Err(DescriptorError::EmptyName);
            }
            if bindings[..index].iter().any(|earlier| earlier.name == binding.name) {
                return Err(DescriptorError::Duplicate {
                    name: binding.name.clone(),
                });
            }
        }
        Ok(Self { bindings })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Binding> {
        self.bindings.iter()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Binding> {
        self.bindings.iter().find(|binding| binding.name == name)
    }

    pub fn input_names(&self) -> impl Iterator<Item = &str> {
        self.names_of(BindingKind::Input)
    }

    pub fn output_names(&self) -> impl Iterator<Item = &str> {
        self.names_of(BindingKind::Output)
    }

    pub fn has_input(&self, name: &str) -> bool {
        self.get(name).is_some_and(|binding| binding.kind == BindingKind::Input)
    }

    pub fn has_output(&self, name: &str) -> bool {
        self.get(name).is_some_and(|binding| binding.kind == BindingKind::Output)
    }

    fn names_of(&self, kind: BindingKind) -> impl Iterator<Item = &str> {
        self.bindings
            .iter()
            .filter(move |binding| binding.kind == kind)
            .map(|binding| binding.name.as_str())
    }
}

impl<'de> Deserialize<'de> for BindingDescriptor {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw {
            bindings: Vec<Binding>,
        }

        let raw = Raw::deserialize(deserializer)?;
        BindingDescriptor::from_bindings(raw.bindings).map_err(serde::de::Error::custom)
    }
}

/// Incremental builder; validation happens once in [`BindingDescriptorBuilder::build`].
#[derive(Debug, Default)]
pub struct BindingDescriptorBuilder {
    bindings: Vec<Binding>,
}

impl BindingDescriptorBuilder {
    pub fn input(mut self, name: impl Into<String>) -> Self {
        self.bindings.push(Binding {
            name: name.into(),
            kind: BindingKind::Input,
        });
        self
    }

    pub fn output(mut self, name: impl Into<String>) -> Self {
        self.bindings.push(Binding {
            name: name.into(),
            kind: BindingKind::Output,
        });
        self
    }

    pub fn build(self) -> Result<BindingDescriptor, DescriptorError> {
        BindingDescriptor::from_bindings(self.bindings)
    }
}
