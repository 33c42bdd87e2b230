//! Controller contexts - swappable input-to-processor routing tables.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::debug;

use super::command::InputCommand;
use super::controller::InputController;
use crate::device::{Input, InputEvent};

/// Reacts to the events of one input while its context is active.
///
/// `init` runs when the owning context becomes current, `exit` when it is
/// switched away; both default to no-ops. Processors producing a command report
/// it through [`command`](Self::command) so contexts can enumerate their
/// vocabulary.
pub trait InputEventProcessor: Send + Sync {
    fn init(&self, _controller: &InputController) {}

    fn process(&self, event: &InputEvent, controller: &InputController);

    fn exit(&self, _controller: &InputController) {}

    fn command(&self) -> Option<&InputCommand> {
        None
    }
}

struct ContextInner {
    identifier: String,
    processors: Mutex<HashMap<Input, Vec<Arc<dyn InputEventProcessor>>>>,
}

/// A named routing table mapping inputs to ordered processor lists.
///
/// Contexts are cheap-clone handles and may be re-wired while events are in
/// flight: routing iterates a snapshot taken under a short lock, so a rebind
/// racing an event can never corrupt delivery - the in-flight event simply sees
/// the table as it was.
#[derive(Clone)]
pub struct ControllerContext {
    inner: Arc<ContextInner>,
}

impl ControllerContext {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(ContextInner {
                identifier: identifier.into(),
                processors: Mutex::new(HashMap::new()),
            }),
        }
    }

    pub fn identifier(&self) -> &str {
        &self.inner.identifier
    }

    /// Appends a processor to the input's invocation list.
    pub fn register_processor(&self, input: Input, processor: Arc<dyn InputEventProcessor>) {
        let mut map = self.inner.processors.lock().expect("context map poisoned");
        map.entry(input).or_default().push(processor);
    }

    /// Removes one processor instance; drops the input entry when none remain.
    pub fn unregister_processor(&self, input: &Input, processor: &Arc<dyn InputEventProcessor>) {
        let mut map = self.inner.processors.lock().expect("context map poisoned");
        if let Some(list) = map.get_mut(input) {
            list.retain(|known| !Arc::ptr_eq(known, processor));
            if list.is_empty() {
                map.remove(input);
            }
        }
    }

    pub fn unregister_input(&self, input: &Input) {
        self.inner
            .processors
            .lock()
            .expect("context map poisoned")
            .remove(input);
    }

    pub fn clear(&self) {
        self.inner
            .processors
            .lock()
            .expect("context map poisoned")
            .clear();
    }

    /// The commands produced by this context's processors.
    pub fn commands(&self) -> Vec<InputCommand> {
        let map = self.inner.processors.lock().expect("context map poisoned");
        let mut commands = Vec::new();
        for list in map.values() {
            for processor in list {
                if let Some(command) = processor.command() {
                    if !commands.contains(command) {
                        commands.push(command.clone());
                    }
                }
            }
        }
        commands
    }

    pub(crate) fn init(&self, controller: &InputController) {
        debug!(context = self.identifier(), "context init");
        for processor in self.all_processors() {
            processor.init(controller);
        }
    }

    /// Routes one event to the processors registered for its input, in
    /// registration order.
    pub(crate) fn process(&self, event: &InputEvent, controller: &InputController) {
        let routed: Option<Vec<Arc<dyn InputEventProcessor>>> = {
            let map = self.inner.processors.lock().expect("context map poisoned");
            map.get(event.input()).cloned()
        };
        if let Some(processors) = routed {
            for processor in processors {
                processor.process(event, controller);
            }
        }
    }

    pub(crate) fn exit(&self, controller: &InputController) {
        debug!(context = self.identifier(), "context exit");
        for processor in self.all_processors() {
            processor.exit(controller);
        }
    }

    /// Every registered processor, deduplicated by instance.
    fn all_processors(&self) -> Vec<Arc<dyn InputEventProcessor>> {
        let map = self.inner.processors.lock().expect("context map poisoned");
        let mut processors: Vec<Arc<dyn InputEventProcessor>> = Vec::new();
        for list in map.values() {
            for processor in list {
                if !processors.iter().any(|known| Arc::ptr_eq(known, processor)) {
                    processors.push(processor.clone());
                }
            }
        }
        processors
    }
}

impl PartialEq for ControllerContext {
    fn eq(&self, other: &Self) -> bool {
        self.identifier() == other.identifier()
    }
}

impl std::fmt::Debug for ControllerContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControllerContext")
            .field("identifier", &self.identifier())
            .finish()
    }
}
