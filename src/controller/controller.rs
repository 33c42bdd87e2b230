//! The input controller - per-device command state and routing.
//!
//! One controller binds one device and routes its events through the currently
//! active context into command producers. The gating policy (concurrent firing,
//! fast release, auto-repeat cadence) is plain configuration on the controller;
//! command vocabularies are composed in (see [`super::joystick`]) rather than
//! subclassed.

use chrono::Local;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, OnceLock, Weak};
use std::time::Duration;
use tracing::{debug, info, warn};

use super::command::InputCommand;
use super::context::{ControllerContext, InputEventProcessor};
use super::error::ControllerError;
use super::producer::{CommandValueProducer, GatedCommandProducer};
use super::repeat::CommandRepeater;
use super::selector::GatedInputSelector;
use crate::device::{InputDevice, InputEvent, InputValueRange};
use crate::gateway::InputEventGateway;
use crate::listeners::{InputEventListener, ListenerList};

/// The command vocabulary flavor a controller was built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControllerKind {
    /// Value-forwarding commands only.
    Plain,
    /// Gated fire/release commands.
    Gated,
    /// Gated commands with the joystick vocabulary.
    Joystick,
}

impl std::fmt::Display for ControllerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ControllerKind::Plain => write!(f, "plain"),
            ControllerKind::Gated => write!(f, "gated"),
            ControllerKind::Joystick => write!(f, "joystick"),
        }
    }
}

/// Gating policy settings for a controller.
#[derive(Debug, Clone)]
pub struct ControllerSettings {
    /// Whether several commands may be firing at the same time.
    pub concurrent_firing: bool,

    /// Whether analog axes release on a decline from their recent peak instead
    /// of waiting for full range exit.
    pub fast_releasing: bool,

    /// Whether held commands re-fire on the auto-repeat scheduler.
    pub auto_repeat: bool,

    /// Delay before the first auto-repeat of a held command.
    pub auto_repeat_initial_delay: Duration,

    /// Steady cadence between subsequent auto-repeats.
    pub auto_repeat_delay: Duration,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            concurrent_firing: true,
            fast_releasing: true,
            auto_repeat: false,
            auto_repeat_initial_delay: Duration::from_millis(500),
            auto_repeat_delay: Duration::from_millis(30),
        }
    }
}

/// Receives a controller's command notifications. All methods default to no-ops.
///
/// Fire and release notifications are delivered under the controller's
/// fire/release lock so that a scheduler-driven repeat can never interleave
/// with an input-driven transition; listener implementations must therefore
/// not call back into fire/release paths of the same controller.
pub trait InputControllerListener: Send + Sync {
    fn command_fired(
        &self,
        _controller: &InputController,
        _command: &InputCommand,
        _auto_repeat: bool,
    ) {
    }

    fn command_released(&self, _controller: &InputController, _command: &InputCommand) {}

    fn command_value_changed(
        &self,
        _controller: &InputController,
        _command: &InputCommand,
        _value: f32,
    ) {
    }
}

/// Scheduler key for one controller instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct ControllerId(usize);

pub(crate) struct ControllerInner {
    name: String,
    kind: ControllerKind,
    device: InputDevice,
    gateway: InputEventGateway,
    repeater: CommandRepeater,
    contexts: Mutex<Vec<ControllerContext>>,
    current: Mutex<Option<ControllerContext>>,
    listeners: ListenerList<dyn InputControllerListener>,
    active: AtomicBool,
    concurrent_firing: AtomicBool,
    fast_releasing: AtomicBool,
    auto_repeat: AtomicBool,
    auto_repeat_initial_delay_ms: AtomicU64,
    auto_repeat_delay_ms: AtomicU64,
    /// Fire/release bookkeeping; distinct from every dispatch-path lock because
    /// a repeat fire (scheduler task) can race an input-driven release.
    firing: Mutex<Option<InputCommand>>,
    tap: OnceLock<Arc<dyn InputEventListener>>,
}

/// A cheap-clone handle on one controller.
#[derive(Clone)]
pub struct InputController {
    inner: Arc<ControllerInner>,
}

impl InputController {
    /// Builds a controller bound to `device` and subscribes it to that device's
    /// events on the gateway.
    ///
    /// # Panics
    ///
    /// Panics on an empty controller name.
    pub fn new(
        name: impl Into<String>,
        kind: ControllerKind,
        device: InputDevice,
        gateway: &InputEventGateway,
        repeater: &CommandRepeater,
        settings: Option<ControllerSettings>,
    ) -> Self {
        let name = name.into();
        assert!(!name.is_empty(), "controller name must not be empty");
        let settings = settings.unwrap_or_default();
        let inner = Arc::new(ControllerInner {
            name,
            kind,
            device,
            gateway: gateway.clone(),
            repeater: repeater.clone(),
            contexts: Mutex::new(Vec::new()),
            current: Mutex::new(None),
            listeners: ListenerList::new(),
            active: AtomicBool::new(true),
            concurrent_firing: AtomicBool::new(settings.concurrent_firing),
            fast_releasing: AtomicBool::new(settings.fast_releasing),
            auto_repeat: AtomicBool::new(settings.auto_repeat),
            auto_repeat_initial_delay_ms: AtomicU64::new(
                settings.auto_repeat_initial_delay.as_millis() as u64,
            ),
            auto_repeat_delay_ms: AtomicU64::new(settings.auto_repeat_delay.as_millis() as u64),
            firing: Mutex::new(None),
            tap: OnceLock::new(),
        });
        let tap: Arc<dyn InputEventListener> = Arc::new(ControllerEventTap {
            controller: Arc::downgrade(&inner),
        });
        let _ = inner.tap.set(tap.clone());
        gateway.register_device_listener(inner.device.identifier(), tap);
        let controller = Self { inner };
        info!(
            name = controller.name(),
            device = controller.device().identifier(),
            kind = %controller.kind(),
            "controller created"
        );
        controller
    }

    /// Builds a controller for a device known only by identifier.
    ///
    /// A missing or currently disconnected device surfaces as
    /// [`ControllerError::DeviceNotFound`].
    pub fn for_device_identifier(
        name: impl Into<String>,
        kind: ControllerKind,
        device_identifier: &str,
        gateway: &InputEventGateway,
        repeater: &CommandRepeater,
        settings: Option<ControllerSettings>,
    ) -> Result<Self, ControllerError> {
        let device = gateway
            .device_with_identifier(device_identifier)
            .ok_or_else(|| ControllerError::DeviceNotFound(device_identifier.to_string()))?;
        Ok(Self::new(name, kind, device, gateway, repeater, settings))
    }

    pub(crate) fn from_inner(inner: Arc<ControllerInner>) -> Self {
        Self { inner }
    }

    pub(crate) fn id(&self) -> ControllerId {
        ControllerId(Arc::as_ptr(&self.inner) as usize)
    }

    pub(crate) fn downgrade(&self) -> Weak<ControllerInner> {
        Arc::downgrade(&self.inner)
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn kind(&self) -> ControllerKind {
        self.inner.kind
    }

    pub fn device(&self) -> &InputDevice {
        &self.inner.device
    }

    // --- contexts ---------------------------------------------------------

    pub fn add_context(&self, context: ControllerContext) {
        let mut contexts = self.inner.contexts.lock().expect("contexts poisoned");
        if !contexts.contains(&context) {
            contexts.push(context);
        }
    }

    pub fn add_and_switch_context(&self, context: ControllerContext) {
        self.add_context(context.clone());
        self.switch_to(context);
    }

    /// Switches to a previously added context by identifier.
    pub fn switch_context(&self, identifier: &str) -> Result<(), ControllerError> {
        let context = {
            let contexts = self.inner.contexts.lock().expect("contexts poisoned");
            contexts
                .iter()
                .find(|context| context.identifier() == identifier)
                .cloned()
        };
        let context =
            context.ok_or_else(|| ControllerError::ContextNotFound(identifier.to_string()))?;
        self.switch_to(context);
        Ok(())
    }

    /// Exit hooks run on the outgoing context, init hooks on the incoming one;
    /// switching to the already-current context is a no-op.
    fn switch_to(&self, context: ControllerContext) {
        let previous = {
            let mut current = self.inner.current.lock().expect("current context poisoned");
            if current.as_ref() == Some(&context) {
                return;
            }
            current.replace(context.clone())
        };
        if let Some(previous) = previous {
            previous.exit(self);
        }
        context.init(self);
        debug!(context = context.identifier(), "context switched");
    }

    pub fn current_context(&self) -> Option<ControllerContext> {
        self.inner
            .current
            .lock()
            .expect("current context poisoned")
            .clone()
    }

    pub fn context_identifiers(&self) -> Vec<String> {
        self.inner
            .contexts
            .lock()
            .expect("contexts poisoned")
            .iter()
            .map(|context| context.identifier().to_string())
            .collect()
    }

    pub fn remove_all_contexts(&self) {
        self.inner
            .contexts
            .lock()
            .expect("contexts poisoned")
            .clear();
        self.inner
            .current
            .lock()
            .expect("current context poisoned")
            .take();
    }

    /// The commands of the currently active context.
    pub fn current_context_commands(&self) -> Vec<InputCommand> {
        self.current_context()
            .map(|context| context.commands())
            .unwrap_or_default()
    }

    // --- command setup ----------------------------------------------------

    /// Registers a processor against an input of the bound device, creating an
    /// anonymous context when none is current yet.
    ///
    /// An unknown input identifier surfaces as [`ControllerError::InputNotFound`].
    pub fn setup_processor(
        &self,
        processor: Arc<dyn InputEventProcessor>,
        input_identifier: &str,
    ) -> Result<(), ControllerError> {
        let input = self
            .inner
            .device
            .input_with_identifier(input_identifier)
            .ok_or_else(|| ControllerError::InputNotFound {
                device: self.inner.device.identifier().to_string(),
                input: input_identifier.to_string(),
            })?;
        let context = match self.current_context() {
            Some(context) => context,
            None => {
                let identifier = format!(
                    "{}-context-{}",
                    self.inner.device.identifier(),
                    Local::now().timestamp_millis()
                );
                let context = ControllerContext::new(identifier);
                self.add_and_switch_context(context.clone());
                context
            }
        };
        context.register_processor(input, processor);
        Ok(())
    }

    /// Binds a value-forwarding command to an input.
    pub fn setup_value_command(
        &self,
        command: InputCommand,
        input_identifier: &str,
    ) -> Result<(), ControllerError> {
        self.setup_processor(Arc::new(CommandValueProducer::new(command)), input_identifier)
    }

    /// Binds a gated command with an explicit firing range.
    pub fn setup_gated_command(
        &self,
        command: InputCommand,
        input_identifier: &str,
        firing_range: InputValueRange,
    ) -> Result<(), ControllerError> {
        self.setup_processor(
            Arc::new(GatedCommandProducer::new(command, firing_range)),
            input_identifier,
        )
    }

    /// Binds a gated command on the digital "on" value.
    pub fn setup_gated_button(
        &self,
        command: InputCommand,
        input_identifier: &str,
    ) -> Result<(), ControllerError> {
        self.setup_processor(
            Arc::new(GatedCommandProducer::digital(command)),
            input_identifier,
        )
    }

    /// Binds a gated command as described by a selector. The selector's input
    /// identifier and firing range are used; the controller's own device is
    /// authoritative.
    pub fn setup_gated_selector(
        &self,
        command: InputCommand,
        selector: &GatedInputSelector,
    ) -> Result<(), ControllerError> {
        self.setup_gated_command(command, selector.input_identifier(), selector.firing_range())
    }

    // --- listeners --------------------------------------------------------

    pub fn add_listener(&self, listener: Arc<dyn InputControllerListener>) {
        self.inner.listeners.add(listener);
    }

    pub fn remove_listener(&self, listener: &Arc<dyn InputControllerListener>) {
        self.inner.listeners.remove(listener);
    }

    // --- activity ---------------------------------------------------------

    pub fn is_active(&self) -> bool {
        self.inner.active.load(Ordering::SeqCst)
    }

    /// While inactive, fires and value changes are suppressed; releases are
    /// still delivered so no command can get stuck firing across reactivation.
    pub fn set_active(&self, active: bool) {
        self.inner.active.store(active, Ordering::SeqCst);
    }

    /// Deactivates the controller and schedules reactivation after `duration`.
    /// Must be called within a tokio runtime context.
    pub fn deactivate_for(&self, duration: Duration) {
        self.set_active(false);
        let weak = Arc::downgrade(&self.inner);
        tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            if let Some(inner) = weak.upgrade() {
                inner.active.store(true, Ordering::SeqCst);
                debug!(name = %inner.name, "controller reactivated");
            }
        });
    }

    // --- gating policy ----------------------------------------------------

    pub fn is_concurrent_firing(&self) -> bool {
        self.inner.concurrent_firing.load(Ordering::Relaxed)
    }

    pub fn set_concurrent_firing(&self, enabled: bool) {
        self.inner
            .concurrent_firing
            .store(enabled, Ordering::Relaxed);
    }

    pub fn is_fast_releasing(&self) -> bool {
        self.inner.fast_releasing.load(Ordering::Relaxed)
    }

    pub fn set_fast_releasing(&self, enabled: bool) {
        self.inner.fast_releasing.store(enabled, Ordering::Relaxed);
    }

    pub fn is_auto_repeat_enabled(&self) -> bool {
        self.inner.auto_repeat.load(Ordering::Relaxed)
    }

    pub fn set_auto_repeat_enabled(&self, enabled: bool) {
        self.inner.auto_repeat.store(enabled, Ordering::Relaxed);
    }

    pub fn auto_repeat_initial_delay(&self) -> Duration {
        Duration::from_millis(
            self.inner
                .auto_repeat_initial_delay_ms
                .load(Ordering::Relaxed),
        )
    }

    pub fn set_auto_repeat_initial_delay(&self, delay: Duration) {
        self.inner
            .auto_repeat_initial_delay_ms
            .store(delay.as_millis() as u64, Ordering::Relaxed);
    }

    pub fn auto_repeat_delay(&self) -> Duration {
        Duration::from_millis(self.inner.auto_repeat_delay_ms.load(Ordering::Relaxed))
    }

    pub fn set_auto_repeat_delay(&self, delay: Duration) {
        self.inner
            .auto_repeat_delay_ms
            .store(delay.as_millis() as u64, Ordering::Relaxed);
    }

    // --- event flow -------------------------------------------------------

    /// Routes one event through the currently active context. Called by the
    /// gateway subscription; also usable by hosts injecting synthetic events.
    pub fn process_input_event(&self, event: &InputEvent) {
        if let Some(context) = self.current_context() {
            context.process(event, self);
        }
    }

    /// Input-driven fire. Honored while active and, without concurrent firing,
    /// only when no other command holds the controller.
    pub(crate) fn fire_command(&self, command: &InputCommand) {
        if !self.is_active() {
            return;
        }
        let mut firing = self.inner.firing.lock().expect("firing slot poisoned");
        let accepted =
            self.is_concurrent_firing() || firing.is_none() || firing.as_ref() == Some(command);
        if !accepted {
            debug!(
                command = command.identifier(),
                "fire suppressed, controller busy"
            );
            return;
        }
        *firing = Some(command.clone());
        debug!(command = command.identifier(), "command fired");
        for listener in self.inner.listeners.snapshot() {
            listener.command_fired(self, command, false);
        }
        if self.is_auto_repeat_enabled() {
            self.inner.repeater.schedule(self, command);
        }
    }

    /// Scheduler-driven re-fire of a held command. Does not reschedule; the
    /// scheduler owns the cadence.
    pub(crate) fn fire_command_repeat(&self, command: &InputCommand) {
        if !self.is_active() {
            return;
        }
        let mut firing = self.inner.firing.lock().expect("firing slot poisoned");
        let accepted = self.is_concurrent_firing() || firing.as_ref() == Some(command);
        if accepted {
            *firing = Some(command.clone());
            for listener in self.inner.listeners.snapshot() {
                listener.command_fired(self, command, true);
            }
        }
    }

    /// Releases are honored even while inactive, so a deactivated controller
    /// cannot come back with a stuck firing command.
    pub(crate) fn release_command(&self, command: &InputCommand) {
        let mut firing = self.inner.firing.lock().expect("firing slot poisoned");
        let accepted = self.is_concurrent_firing() || firing.as_ref() == Some(command);
        if accepted {
            firing.take();
            self.inner.repeater.cancel(self.id(), command);
            debug!(command = command.identifier(), "command released");
            for listener in self.inner.listeners.snapshot() {
                listener.command_released(self, command);
            }
        }
    }

    pub(crate) fn notify_command_value(&self, command: &InputCommand, value: f32) {
        if !self.is_active() {
            return;
        }
        for listener in self.inner.listeners.snapshot() {
            listener.command_value_changed(self, command, value);
        }
    }

    /// Unsubscribes from the gateway and exits the current context. After
    /// disposal the controller no longer receives events; remaining handles
    /// stay valid but inert.
    pub fn dispose(&self) {
        if let Some(tap) = self.inner.tap.get() {
            self.inner
                .gateway
                .unregister_device_listener(self.inner.device.identifier(), tap);
        }
        if let Some(context) = self.current_context() {
            context.exit(self);
        }
        info!(name = self.name(), "controller disposed");
    }
}

impl std::fmt::Debug for InputController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InputController")
            .field("name", &self.name())
            .field("kind", &self.kind())
            .field("device", &self.device().identifier())
            .field("contexts", &self.context_identifiers())
            .finish()
    }
}

struct ControllerEventTap {
    controller: Weak<ControllerInner>,
}

impl InputEventListener for ControllerEventTap {
    fn receive_input_event(&self, event: &InputEvent) {
        match self.controller.upgrade() {
            Some(inner) => InputController::from_inner(inner).process_input_event(event),
            None => warn!("event for dropped controller ignored"),
        }
    }
}
