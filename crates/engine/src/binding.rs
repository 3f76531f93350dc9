//! Input/output forwarding between a wrapper and its implementation.

use indexmap::IndexMap;
use thematic_registry::{BindingError, OutputSink};
use thematic_types::{BindingDescriptor, BindingKind, BindingValue, ComponentIdentity};
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::ResolvedImplementation;

/// Buffered output events per subscriber before slow receivers start lagging.
pub const OUTPUT_CHANNEL_CAPACITY: usize = 64;

/// The wrapper-side binding surface: current input values and output emitters.
///
/// Input values survive re-resolution, so a value set before an
/// implementation exists is applied once one is bound.
#[derive(Debug)]
pub struct BindingSurface {
    identity: ComponentIdentity,
    descriptor: BindingDescriptor,
    inputs: IndexMap<String, BindingValue>,
    outputs: IndexMap<String, broadcast::Sender<BindingValue>>,
}

impl BindingSurface {
    pub fn new(identity: ComponentIdentity, descriptor: BindingDescriptor) -> Self {
        let outputs = descriptor
            .output_names()
            .map(|name| (name.to_string(), broadcast::channel(OUTPUT_CHANNEL_CAPACITY).0))
            .collect();
        Self {
            identity,
            descriptor,
            inputs: IndexMap::new(),
            outputs,
        }
    }

    pub fn descriptor(&self) -> &BindingDescriptor {
        &self.descriptor
    }

    /// Record a new value for a declared input.
    pub fn set_input(&mut self, name: &str, value: BindingValue) -> Result<(), BindingError> {
        if !self.descriptor.has_input(name) {
            return Err(BindingError::undeclared(&self.identity, name, BindingKind::Input));
        }
        self.inputs.insert(name.to_string(), value);
        Ok(())
    }

    pub fn input(&self, name: &str) -> Option<&BindingValue> {
        self.inputs.get(name)
    }

    /// Subscribe to a declared output. Subscriptions outlive re-resolution.
    pub fn subscribe(&self, name: &str) -> Result<broadcast::Receiver<BindingValue>, BindingError> {
        self.outputs
            .get(name)
            .map(broadcast::Sender::subscribe)
            .ok_or_else(|| BindingError::undeclared(&self.identity, name, BindingKind::Output))
    }

    fn sink(&self, name: &str, pairing: &CancellationToken) -> Result<OutputSink, BindingError> {
        let sender = self
            .outputs
            .get(name)
            .ok_or_else(|| BindingError::undeclared(&self.identity, name, BindingKind::Output))?;
        Ok(OutputSink::new(name, sender.clone(), pairing.clone()))
    }
}

/// Wire `implementation` to `surface` for the lifetime of `pairing`.
///
/// Every binding in `bindings` is checked against the implementation before
/// anything is applied, so a mismatch leaves the implementation untouched.
/// Outputs are connected first, then the surface's current input values are
/// pushed in declaration order. Inputs never set on the surface are skipped.
pub fn rebind(
    surface: &BindingSurface,
    implementation: &mut ResolvedImplementation,
    bindings: &BindingDescriptor,
    pairing: &CancellationToken,
) -> Result<(), BindingError> {
    check_bindings(implementation, bindings)?;

    for name in bindings.output_names() {
        let sink = surface.sink(name, pairing)?;
        implementation.instance.connect_output(sink)?;
    }

    let mut applied = 0usize;
    for name in bindings.input_names() {
        if let Some(value) = surface.input(name) {
            implementation.instance.set_input(name, value.clone())?;
            applied += 1;
        }
    }

    debug!(
        identity = %implementation.identity(),
        module = %implementation.module_name(),
        inputs_applied = applied,
        outputs_connected = bindings.output_names().count(),
        "implementation bound"
    );
    Ok(())
}

fn check_bindings(implementation: &ResolvedImplementation, bindings: &BindingDescriptor) -> Result<(), BindingError> {
    let instance = implementation.instance();
    for binding in bindings.iter() {
        let present = match binding.kind {
            BindingKind::Input => instance.has_input(&binding.name),
            BindingKind::Output => instance.has_output(&binding.name),
        };
        if !present {
            return Err(BindingError::mismatch(implementation.module_name(), &binding.name, binding.kind));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn surface() -> BindingSurface {
        let descriptor = BindingDescriptor::builder()
            .input("title")
            .output("selected")
            .build()
            .expect("descriptor");
        BindingSurface::new("FooComponent".into(), descriptor)
    }

    #[test]
    fn surface_accepts_only_declared_inputs() {
        let mut surface = surface();
        surface.set_input("title", json!("X")).expect("declared input");
        assert_eq!(surface.input("title"), Some(&json!("X")));

        let error = surface.set_input("selected", json!(true)).expect_err("output is not an input");
        assert_eq!(error, BindingError::undeclared(&"FooComponent".into(), "selected", BindingKind::Input));
    }

    #[test]
    fn surface_subscribes_only_to_declared_outputs() {
        let surface = surface();
        assert!(surface.subscribe("selected").is_ok());
        assert!(matches!(surface.subscribe("title"), Err(BindingError::Undeclared { .. })));
    }
}
