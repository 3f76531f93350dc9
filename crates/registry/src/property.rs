//! Data-driven component implementation.
//!
//! `PropertyModule` describes a component purely by its input and output
//! names. Its instances keep the last value of every input and can announce
//! input changes on an output, which is enough to stand in for real UI
//! components in catalogs, demos and tests.

use indexmap::IndexMap;
use serde_json::{Map, Value, json};
use thematic_types::{BindingKind, BindingValue};

use crate::{BindingError, ComponentInstance, ComponentModule, OutputSink};

#[derive(Debug, Clone)]
pub struct PropertyModule {
    name: String,
    inputs: Vec<String>,
    outputs: Vec<String>,
    change_output: Option<String>,
}

impl PropertyModule {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            change_output: None,
        }
    }

    pub fn with_inputs<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inputs.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn with_outputs<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.outputs.extend(names.into_iter().map(Into::into));
        self
    }

    /// Emit `{"input": name, "value": value}` on `output` whenever an input changes.
    ///
    /// `output` is added to the declared outputs if missing.
    pub fn announcing_changes_on(mut self, output: impl Into<String>) -> Self {
        let output = output.into();
        if !self.outputs.contains(&output) {
            self.outputs.push(output.clone());
        }
        self.change_output = Some(output);
        self
    }
}

impl ComponentModule for PropertyModule {
    fn name(&self) -> &str {
        &self.name
    }

    fn instantiate(&self) -> Box<dyn ComponentInstance> {
        Box::new(PropertyInstance {
            module: self.name.clone(),
            inputs: self.inputs.iter().map(|name| (name.clone(), Value::Null)).collect(),
            outputs: self.outputs.iter().map(|name| (name.clone(), None)).collect(),
            change_output: self.change_output.clone(),
            destroyed: false,
        })
    }
}

struct PropertyInstance {
    module: String,
    inputs: IndexMap<String, Value>,
    outputs: IndexMap<String, Option<OutputSink>>,
    change_output: Option<String>,
    destroyed: bool,
}

impl ComponentInstance for PropertyInstance {
    fn has_input(&self, name: &str) -> bool {
        self.inputs.contains_key(name)
    }

    fn has_output(&self, name: &str) -> bool {
        self.outputs.contains_key(name)
    }

    fn set_input(&mut self, name: &str, value: BindingValue) -> Result<(), BindingError> {
        if self.destroyed {
            return Err(BindingError::rejected(&self.module, name, "instance destroyed"));
        }
        let slot = self
            .inputs
            .get_mut(name)
            .ok_or_else(|| BindingError::mismatch(&self.module, name, BindingKind::Input))?;
        *slot = value.clone();

        if let Some(output) = self.change_output.as_deref()
            && let Some(Some(sink)) = self.outputs.get(output)
        {
            sink.emit(json!({ "input": name, "value": value }));
        }
        Ok(())
    }

    fn connect_output(&mut self, sink: OutputSink) -> Result<(), BindingError> {
        let slot = self
            .outputs
            .get_mut(sink.name())
            .ok_or_else(|| BindingError::mismatch(&self.module, sink.name(), BindingKind::Output))?;
        *slot = Some(sink);
        Ok(())
    }

    fn snapshot(&self) -> Value {
        let inputs: Map<String, Value> = self.inputs.iter().map(|(name, value)| (name.clone(), value.clone())).collect();
        json!({
            "implementation": self.module,
            "inputs": inputs,
            "outputs": self.outputs.keys().collect::<Vec<_>>(),
        })
    }

    fn destroy(&mut self) {
        self.destroyed = true;
        for sink in self.outputs.values_mut() {
            sink.take();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::broadcast;
    use tokio_util::sync::CancellationToken;

    #[test]
    fn records_inputs_and_rejects_unknown_names() {
        let module = PropertyModule::new("FooComponent").with_inputs(["title", "content"]);
        let mut instance = module.instantiate();

        instance.set_input("title", json!("X")).expect("title accepted");
        assert_eq!(instance.snapshot()["inputs"]["title"], json!("X"));
        assert_eq!(instance.snapshot()["inputs"]["content"], Value::Null);

        let error = instance.set_input("missing", json!(1)).expect_err("unknown input");
        assert_eq!(error, BindingError::mismatch("FooComponent", "missing", BindingKind::Input));
    }

    #[test]
    fn announces_changes_on_connected_output() {
        let module = PropertyModule::new("FooComponent")
            .with_inputs(["title"])
            .announcing_changes_on("changed");
        let mut instance = module.instantiate();
        assert!(instance.has_output("changed"));

        let (sender, mut receiver) = broadcast::channel(4);
        instance
            .connect_output(OutputSink::new("changed", sender, CancellationToken::new()))
            .expect("connect");
        instance.set_input("title", json!("hello")).expect("set");

        assert_eq!(receiver.try_recv().expect("announcement"), json!({"input": "title", "value": "hello"}));
    }

    #[test]
    fn destroyed_instance_rejects_inputs() {
        let mut instance = PropertyModule::new("FooComponent").with_inputs(["title"]).instantiate();
        instance.destroy();
        assert!(matches!(instance.set_input("title", json!(1)), Err(BindingError::Rejected { .. })));
    }
}
