//! Event gateway - the single mediation point between one event source and many
//! consumers.
//!
//! ```text
//!                      ┌────────────┐      global listeners
//! InputEventSource ──► │ event pump │ ──►  device-scoped listeners
//!   (poll/rescan)      └────────────┘      (deduplicated fan-out)
//! ```
//!
//! The gateway is an explicitly constructed, cloneable service owned by the
//! application's composition root; "at most one running pump per gateway" is an
//! invariant of its own state. The pump task exists on demand only: it is
//! spawned when a source is attached, at least one listener is registered and
//! external poll mode is off, and it is torn down as soon as any of that stops
//! holding - it is never left running without consumers.
//!
//! In *external poll mode* no background task runs at all; the embedding
//! application calls [`InputEventGateway::poll_externally`] from its own cadence
//! (once per frame, typically) and delivery happens synchronously inside that
//! call.

mod pump;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::device::{Input, InputDevice, InputEvent, InputEventSource, InputFilter};
use crate::listeners::{InputEventListener, ListenerList};
use pump::EventPump;

/// Default cadence for periodic device rescans while scan mode is on.
const DEFAULT_SCAN_INTERVAL: Duration = Duration::from_secs(3);

struct ScopedListener {
    device_identifier: String,
    listener: Arc<dyn InputEventListener>,
}

struct PumpHandle {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

pub(crate) struct GatewayShared {
    source: RwLock<Option<Arc<dyn InputEventSource>>>,
    /// Serializes every `poll_events` call; the pump and an externally driven
    /// poll never run against the source concurrently.
    poll_lock: Mutex<()>,
    global: ListenerList<dyn InputEventListener>,
    scoped: Mutex<Vec<ScopedListener>>,
    external_poll: AtomicBool,
    scan_mode: AtomicBool,
    scan_interval: Mutex<Duration>,
    pump: Mutex<Option<PumpHandle>>,
}

impl GatewayShared {
    pub(crate) fn source(&self) -> Option<Arc<dyn InputEventSource>> {
        self.source.read().expect("source lock poisoned").clone()
    }

    pub(crate) fn is_scan_mode(&self) -> bool {
        self.scan_mode.load(Ordering::Relaxed)
    }

    pub(crate) fn scan_interval(&self) -> Duration {
        *self.scan_interval.lock().expect("scan interval poisoned")
    }

    /// Polls the source under the poll lock.
    pub(crate) fn poll_source(&self) -> Vec<InputEvent> {
        let Some(source) = self.source() else {
            return Vec::new();
        };
        let _guard = self.poll_lock.lock().expect("poll lock poisoned");
        source.poll_events()
    }

    /// Fans one event out to every global listener, then to the listeners scoped
    /// to the event's device. A listener registered both globally and for the
    /// device receives the event once.
    pub(crate) fn dispatch_event(&self, event: &InputEvent) {
        let global = self.global.snapshot();
        for listener in &global {
            listener.receive_input_event(event);
        }
        let scoped: Vec<Arc<dyn InputEventListener>> = {
            let entries = self.scoped.lock().expect("scoped listeners poisoned");
            entries
                .iter()
                .filter(|entry| entry.device_identifier == event.device_identifier())
                .map(|entry| entry.listener.clone())
                .collect()
        };
        for listener in scoped {
            if !self.global.contains(&listener) {
                listener.receive_input_event(event);
            }
        }
    }

    fn has_listeners(&self) -> bool {
        !self.global.is_empty()
            || !self
                .scoped
                .lock()
                .expect("scoped listeners poisoned")
                .is_empty()
    }
}

/// The mediation service between one [`InputEventSource`] and many listeners.
///
/// Cloning yields another handle onto the same gateway. Listener registration
/// may spawn the pump task and must therefore happen within a tokio runtime
/// context (unless external poll mode is on).
#[derive(Clone)]
pub struct InputEventGateway {
    shared: Arc<GatewayShared>,
}

impl InputEventGateway {
    /// A gateway with no source attached yet.
    pub fn new() -> Self {
        Self {
            shared: Arc::new(GatewayShared {
                source: RwLock::new(None),
                poll_lock: Mutex::new(()),
                global: ListenerList::new(),
                scoped: Mutex::new(Vec::new()),
                external_poll: AtomicBool::new(false),
                scan_mode: AtomicBool::new(false),
                scan_interval: Mutex::new(DEFAULT_SCAN_INTERVAL),
                pump: Mutex::new(None),
            }),
        }
    }

    /// A gateway with an initial source.
    pub fn with_source(source: Arc<dyn InputEventSource>) -> Self {
        let gateway = Self::new();
        gateway.switch_source(Some(source));
        gateway
    }

    /// Swaps the event source. With a pump already running the new source is
    /// picked up in place on the next poll cycle; otherwise the pump is spawned
    /// or torn down as demand dictates.
    pub fn switch_source(&self, source: Option<Arc<dyn InputEventSource>>) {
        {
            let mut slot = self.shared.source.write().expect("source lock poisoned");
            *slot = source;
        }
        self.setup_pump();
    }

    pub fn source(&self) -> Option<Arc<dyn InputEventSource>> {
        self.shared.source()
    }

    /// Registers a listener for every event, regardless of device.
    pub fn register_global_listener(&self, listener: Arc<dyn InputEventListener>) {
        if self.shared.global.add(listener) {
            self.setup_pump();
        }
    }

    pub fn unregister_global_listener(&self, listener: &Arc<dyn InputEventListener>) {
        if self.shared.global.remove(listener) {
            self.setup_pump();
        }
    }

    /// Registers a listener for events of one device only.
    pub fn register_device_listener(
        &self,
        device_identifier: &str,
        listener: Arc<dyn InputEventListener>,
    ) {
        let changed = {
            let mut entries = self.shared.scoped.lock().expect("scoped listeners poisoned");
            let known = entries.iter().any(|entry| {
                entry.device_identifier == device_identifier
                    && Arc::ptr_eq(&entry.listener, &listener)
            });
            if !known {
                entries.push(ScopedListener {
                    device_identifier: device_identifier.to_string(),
                    listener,
                });
            }
            !known
        };
        if changed {
            self.setup_pump();
        }
    }

    pub fn unregister_device_listener(
        &self,
        device_identifier: &str,
        listener: &Arc<dyn InputEventListener>,
    ) {
        let changed = {
            let mut entries = self.shared.scoped.lock().expect("scoped listeners poisoned");
            let before = entries.len();
            entries.retain(|entry| {
                entry.device_identifier != device_identifier
                    || !Arc::ptr_eq(&entry.listener, listener)
            });
            entries.len() != before
        };
        if changed {
            self.setup_pump();
        }
    }

    pub fn unregister_all_listeners(&self) {
        let mut changed = self.shared.global.clear();
        {
            let mut entries = self.shared.scoped.lock().expect("scoped listeners poisoned");
            changed |= !entries.is_empty();
            entries.clear();
        }
        if changed {
            self.setup_pump();
        }
    }

    /// Whether the background pump task is currently alive.
    pub fn is_dispatching(&self) -> bool {
        self.shared
            .pump
            .lock()
            .expect("pump lock poisoned")
            .as_ref()
            .is_some_and(|handle| !handle.task.is_finished())
    }

    /// Switches between background pumping and caller-driven polling.
    pub fn set_external_poll_mode(&self, external: bool) {
        if self.shared.external_poll.swap(external, Ordering::SeqCst) != external {
            info!(external, "external poll mode changed");
            self.setup_pump();
        }
    }

    pub fn is_external_poll_mode(&self) -> bool {
        self.shared.external_poll.load(Ordering::SeqCst)
    }

    /// Polls the source and delivers any pending events synchronously on the
    /// calling thread. Only effective in external poll mode.
    pub fn poll_externally(&self) {
        if !self.is_external_poll_mode() {
            debug!("poll_externally ignored, external poll mode is off");
            return;
        }
        let events = self.shared.poll_source();
        for event in &events {
            self.shared.dispatch_event(event);
        }
    }

    /// Enables periodic device rescans in the pump loop.
    pub fn set_scan_mode(&self, scan: bool) {
        self.shared.scan_mode.store(scan, Ordering::Relaxed);
    }

    pub fn is_scan_mode(&self) -> bool {
        self.shared.is_scan_mode()
    }

    pub fn set_scan_interval(&self, interval: Duration) {
        *self
            .shared
            .scan_interval
            .lock()
            .expect("scan interval poisoned") = interval;
    }

    /// Forces a device rescan on the source, immediately.
    pub fn rescan(&self) {
        if let Some(source) = self.shared.source() {
            source.rescan();
        }
    }

    pub fn devices(&self) -> Vec<InputDevice> {
        self.shared
            .source()
            .map(|source| source.devices())
            .unwrap_or_default()
    }

    pub fn device_with_identifier(&self, identifier: &str) -> Option<InputDevice> {
        self.shared.source()?.device_with_identifier(identifier)
    }

    pub fn input_with_identifier(
        &self,
        device_identifier: &str,
        input_identifier: &str,
    ) -> Option<Input> {
        self.shared
            .source()?
            .input_with_identifier(device_identifier, input_identifier)
    }

    /// The source's explicit-user-gesture filter, or accept-all without a source.
    pub fn user_gesture_filter(&self) -> InputFilter {
        self.shared
            .source()
            .map(|source| source.user_gesture_filter())
            .unwrap_or_else(InputFilter::accept_all)
    }

    /// Reconciles the pump task with current demand: spawned lazily on the first
    /// listener with a source attached, stopped when the last listener leaves,
    /// the source is cleared or external poll mode turns on.
    fn setup_pump(&self) {
        let mut slot = self.shared.pump.lock().expect("pump lock poisoned");
        let needed = self.shared.source().is_some()
            && self.shared.has_listeners()
            && !self.is_external_poll_mode();
        if needed {
            let stale = slot.as_ref().is_some_and(|handle| handle.task.is_finished());
            if stale {
                warn!("event pump task ended unexpectedly, respawning");
                *slot = None;
            }
            if slot.is_none() {
                let cancel = CancellationToken::new();
                let mut machine = EventPump::create(Arc::downgrade(&self.shared)).arm();
                let task_cancel = cancel.clone();
                let task = tokio::spawn(async move {
                    machine.run(task_cancel).await;
                });
                *slot = Some(PumpHandle { cancel, task });
                info!("event pump spawned");
            }
        } else if let Some(handle) = slot.take() {
            handle.cancel.cancel();
            info!("event pump stopped");
        }
    }
}

impl Default for InputEventGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for InputEventGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InputEventGateway")
            .field("has_source", &self.source().is_some())
            .field("external_poll", &self.is_external_poll_mode())
            .field("dispatching", &self.is_dispatching())
            .finish()
    }
}
