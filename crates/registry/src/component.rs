//! Component abstractions.
//!
//! A [`ComponentModule`] is the loaded code for one implementation of a
//! logical component; it produces [`ComponentInstance`]s. Instances receive
//! inputs through [`ComponentInstance::set_input`] and publish outputs
//! through the [`OutputSink`]s handed to them when a wrapper binds them.

use std::{fmt, sync::Arc};

use serde_json::Value;
use thematic_types::BindingValue;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::trace;

use crate::BindingError;

/// Shared handle to loaded component code.
pub type LoadedModule = Arc<dyn ComponentModule>;

/// Loaded code for one implementation (default or themed) of a component.
pub trait ComponentModule: Send + Sync {
    /// Implementation name, for example `mantis/ItemPageComponent`.
    fn name(&self) -> &str;

    /// Create a fresh instance owned by the caller.
    fn instantiate(&self) -> Box<dyn ComponentInstance>;
}

/// A live component instance.
pub trait ComponentInstance: Send {
    fn has_input(&self, name: &str) -> bool;

    fn has_output(&self, name: &str) -> bool;

    /// Apply a new value to a named input.
    fn set_input(&mut self, name: &str, value: BindingValue) -> Result<(), BindingError>;

    /// Attach the sink the instance must use to publish the named output.
    fn connect_output(&mut self, sink: OutputSink) -> Result<(), BindingError>;

    /// Inspectable view of the instance, used by diagnostics and the CLI.
    fn snapshot(&self) -> Value {
        Value::Null
    }

    /// Called once when the owning wrapper releases the instance.
    fn destroy(&mut self) {}
}

/// Channel through which an instance publishes one output.
///
/// The sink is valid only for the lifetime of the wrapper/implementation
/// pairing; after the pairing ends every emission is dropped.
#[derive(Clone)]
pub struct OutputSink {
    name: String,
    sender: broadcast::Sender<BindingValue>,
    pairing: CancellationToken,
}

impl OutputSink {
    pub fn new(name: impl Into<String>, sender: broadcast::Sender<BindingValue>, pairing: CancellationToken) -> Self {
        Self {
            name: name.into(),
            sender,
            pairing,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_connected(&self) -> bool {
        !self.pairing.is_cancelled()
    }

    /// Publish a value to the wrapper's subscribers.
    ///
    /// Returns `false` when the pairing has ended or nobody is subscribed.
    pub fn emit(&self, value: BindingValue) -> bool {
        if !self.is_connected() {
            trace!(output = %self.name, "dropping output emitted after pairing ended");
            return false;
        }
        self.sender.send(value).is_ok()
    }
}

impl fmt::Debug for OutputSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutputSink")
            .field("name", &self.name)
            .field("connected", &self.is_connected())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sink_delivers_until_pairing_ends() {
        let (sender, mut receiver) = broadcast::channel(4);
        let pairing = CancellationToken::new();
        let sink = OutputSink::new("selected", sender, pairing.clone());

        assert!(sink.emit(json!(1)));
        assert_eq!(receiver.try_recv().expect("first value"), json!(1));

        pairing.cancel();
        assert!(!sink.is_connected());
        assert!(!sink.emit(json!(2)));
        assert!(receiver.try_recv().is_err());
    }

    #[test]
    fn sink_reports_missing_subscribers() {
        let (sender, receiver) = broadcast::channel(4);
        drop(receiver);
        let sink = OutputSink::new("selected", sender, CancellationToken::new());
        assert!(!sink.emit(json!("ignored")));
    }
}
