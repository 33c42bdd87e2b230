//! Interactive input discovery.
//!
//! A tuner is a transient session that answers "which input did the user just
//! touch?". It listens globally on the gateway, gates events by magnitude
//! (digital inputs must be pressed, analog inputs must be pushed past their
//! sensitivity threshold) and by device/input filters, and derives a *tuning
//! range* from each qualifying event - the firing range a command bound to that
//! gesture should get.
//!
//! A silence detector task debounces the session: while the tuner waits for
//! silence, qualifying events are not forwarded, they only restart the quiet
//! period. One physical gesture can emit dozens of events and release bounce;
//! the debounce makes it count as one capture.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, OnceLock, Weak};
use std::time::Duration;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::device::range::ensure_valid_sensitivity;
use crate::device::{DeviceFilter, InputEvent, InputFilter, InputValueRange, RangeError};
use crate::gateway::InputEventGateway;
use crate::listeners::{InputEventListener, ListenerList};

/// Default analog sensitivity: an axis qualifies once pushed past 40% of its
/// extreme.
pub const DEFAULT_ANALOG_SENSITIVITY: f32 = 0.6;

/// Default quiet period before a capture is considered settled.
pub const DEFAULT_SILENCE_DURATION: Duration = Duration::from_millis(250);

/// Longer quiet period swallowed at tuning start, so the gesture that opened
/// the session is not captured as its first assignment.
pub const DEFAULT_TUNING_START_SILENCE: Duration = Duration::from_millis(400);

/// Receives tuner notifications. All methods default to no-ops.
pub trait TunerListener: Send + Sync {
    fn tuner_waiting_for_silence(&self, _tuner: &InputTuner) {}

    fn tuner_silence_reached(&self, _tuner: &InputTuner) {}

    /// A qualifying gesture, with the firing range derived for it.
    fn tuned_input(&self, _tuner: &InputTuner, _event: &InputEvent, _tuning_range: InputValueRange) {
    }
}

struct TunerShared {
    gateway: InputEventGateway,
    device_filter: DeviceFilter,
    input_filter: InputFilter,
    sensitivity: Mutex<f32>,
    silence_duration: Mutex<Duration>,
    listeners: ListenerList<dyn TunerListener>,
    waiting_for_silence: AtomicBool,
    started: AtomicBool,
    stopped: AtomicBool,
    rearm: Notify,
    cancel: CancellationToken,
    tap: OnceLock<Arc<dyn InputEventListener>>,
}

/// An interactive discovery session. Cheap to clone; stop it with
/// [`stop_tuning`](Self::stop_tuning) when done - a stopped tuner is dead for
/// good, discovery restarts with a fresh one.
#[derive(Clone)]
pub struct InputTuner {
    shared: Arc<TunerShared>,
}

impl InputTuner {
    /// A tuner accepting any device, with the source's explicit-user-gesture
    /// input filter and default sensitivity.
    pub fn new(gateway: &InputEventGateway) -> Self {
        let gesture_filter = gateway.user_gesture_filter();
        Self::with_filters(gateway, DeviceFilter::accept_all(), gesture_filter)
    }

    pub fn with_filters(
        gateway: &InputEventGateway,
        device_filter: DeviceFilter,
        input_filter: InputFilter,
    ) -> Self {
        Self {
            shared: Arc::new(TunerShared {
                gateway: gateway.clone(),
                device_filter,
                input_filter,
                sensitivity: Mutex::new(DEFAULT_ANALOG_SENSITIVITY),
                silence_duration: Mutex::new(DEFAULT_SILENCE_DURATION),
                listeners: ListenerList::new(),
                waiting_for_silence: AtomicBool::new(false),
                started: AtomicBool::new(false),
                stopped: AtomicBool::new(false),
                rearm: Notify::new(),
                cancel: CancellationToken::new(),
                tap: OnceLock::new(),
            }),
        }
    }

    pub fn add_listener(&self, listener: Arc<dyn TunerListener>) {
        self.shared.listeners.add(listener);
    }

    pub fn remove_listener(&self, listener: &Arc<dyn TunerListener>) {
        self.shared.listeners.remove(listener);
    }

    pub fn remove_all_listeners(&self) {
        self.shared.listeners.clear();
    }

    /// Starts discovery: spawns the silence detector and subscribes to the
    /// gateway. With `wait_for_silence` the session opens in a silence wait, so
    /// whatever gesture triggered opening it is not captured.
    ///
    /// Must be called within a tokio runtime context.
    ///
    /// # Panics
    ///
    /// Panics when called on a stopped tuner; create a new tuner instead.
    pub fn start_tuning(&self, wait_for_silence: bool) {
        assert!(
            !self.is_stopped(),
            "tuning cannot resume once stopped; create a new tuner"
        );
        if self.shared.started.swap(true, Ordering::SeqCst) {
            return;
        }
        if wait_for_silence {
            self.wait_for_silence_for(DEFAULT_TUNING_START_SILENCE);
        }
        tokio::spawn(run_silence_watch(
            Arc::downgrade(&self.shared),
            self.shared.cancel.clone(),
        ));
        let tap: Arc<dyn InputEventListener> = Arc::new(TunerTap {
            tuner: Arc::downgrade(&self.shared),
        });
        let _ = self.shared.tap.set(tap.clone());
        self.shared.gateway.register_global_listener(tap);
        info!("tuning started");
    }

    /// Ends the session permanently.
    pub fn stop_tuning(&self) {
        if self.shared.stopped.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Some(tap) = self.shared.tap.get() {
            self.shared.gateway.unregister_global_listener(tap);
        }
        self.shared.cancel.cancel();
        info!("tuning stopped");
    }

    /// Enters a silence wait with the default quiet period.
    pub fn wait_for_silence(&self) {
        self.wait_for_silence_for(DEFAULT_SILENCE_DURATION);
    }

    /// Enters a silence wait: qualifying events are ignored for forwarding and
    /// only restart the quiet period until it elapses untouched.
    pub fn wait_for_silence_for(&self, duration: Duration) {
        if self
            .shared
            .waiting_for_silence
            .swap(true, Ordering::SeqCst)
        {
            return;
        }
        *self
            .shared
            .silence_duration
            .lock()
            .expect("silence duration poisoned") = duration;
        debug!(?duration, "waiting for silence");
        let tuner = self.clone();
        for listener in self.shared.listeners.snapshot() {
            listener.tuner_waiting_for_silence(&tuner);
        }
        self.shared.rearm.notify_one();
    }

    pub fn is_waiting_for_silence(&self) -> bool {
        self.shared.waiting_for_silence.load(Ordering::SeqCst)
    }

    pub fn is_stopped(&self) -> bool {
        self.shared.stopped.load(Ordering::SeqCst)
    }

    pub fn analog_sensitivity(&self) -> f32 {
        *self.shared.sensitivity.lock().expect("sensitivity poisoned")
    }

    /// Adjusts the analog qualification threshold. Values outside `[0, 1)` are
    /// rejected.
    pub fn set_analog_sensitivity(&self, sensitivity: f32) -> Result<(), RangeError> {
        ensure_valid_sensitivity(sensitivity)?;
        *self.shared.sensitivity.lock().expect("sensitivity poisoned") = sensitivity;
        Ok(())
    }

    pub fn silence_duration(&self) -> Duration {
        *self
            .shared
            .silence_duration
            .lock()
            .expect("silence duration poisoned")
    }

    fn from_shared(shared: Arc<TunerShared>) -> Self {
        Self { shared }
    }
}

impl std::fmt::Debug for InputTuner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InputTuner")
            .field("waiting_for_silence", &self.is_waiting_for_silence())
            .field("stopped", &self.is_stopped())
            .finish()
    }
}

/// Derives the firing range a command bound to this gesture should get.
///
/// Digital: pinned to the observed value. Analog: the half-range from the
/// sensitivity threshold out to the input's natural extreme, on the side the
/// axis was pushed - capturing the direction without binding to the exact
/// magnitude.
fn tuning_range_for(event: &InputEvent, sensitivity: f32) -> InputValueRange {
    if event.input().is_digital() {
        return InputValueRange::digital(event.value());
    }
    let threshold = 1.0 - sensitivity;
    let natural = event.input().value_range();
    if event.value() > 0.0 {
        InputValueRange::analog_span(threshold, natural.max_value().max(threshold))
    } else {
        InputValueRange::analog_span(natural.min_value().min(-threshold), -threshold)
    }
}

struct TunerTap {
    tuner: Weak<TunerShared>,
}

impl TunerTap {
    fn qualifies(shared: &TunerShared, event: &InputEvent) -> bool {
        if event.input().is_digital() {
            if event.value() <= 0.0 {
                return false;
            }
        } else {
            let sensitivity = *shared.sensitivity.lock().expect("sensitivity poisoned");
            if event.value().abs() < 1.0 - sensitivity {
                return false;
            }
        }
        let Some(device) = shared
            .gateway
            .device_with_identifier(event.device_identifier())
        else {
            return false;
        };
        shared.device_filter.accepts(&device) && shared.input_filter.accepts(event.input())
    }
}

impl InputEventListener for TunerTap {
    fn receive_input_event(&self, event: &InputEvent) {
        let Some(shared) = self.tuner.upgrade() else {
            return;
        };
        if shared.stopped.load(Ordering::SeqCst) {
            return;
        }
        if !Self::qualifies(&shared, event) {
            return;
        }
        if shared.waiting_for_silence.load(Ordering::SeqCst) {
            // Still noisy: push the quiet period out.
            shared.rearm.notify_one();
            return;
        }
        let sensitivity = *shared.sensitivity.lock().expect("sensitivity poisoned");
        let tuning_range = tuning_range_for(event, sensitivity);
        debug!(input = event.input().identifier(), %tuning_range, "tuned input");
        let tuner = InputTuner::from_shared(shared.clone());
        for listener in shared.listeners.snapshot() {
            listener.tuned_input(&tuner, event, tuning_range);
        }
    }
}

/// The silence detector: a quiet period that elapses without a re-arm while the
/// tuner was waiting fires "silence reached" and clears the wait.
async fn run_silence_watch(shared: Weak<TunerShared>, cancel: CancellationToken) {
    debug!("silence detector started");
    loop {
        let Some(live) = shared.upgrade() else {
            break;
        };
        if live.stopped.load(Ordering::SeqCst) {
            break;
        }
        let was_waiting = live.waiting_for_silence.load(Ordering::SeqCst);
        let quiet_period = *live
            .silence_duration
            .lock()
            .expect("silence duration poisoned");
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = live.rearm.notified() => {
                // Activity or a fresh wait: restart the quiet period.
            }
            _ = tokio::time::sleep(quiet_period) => {
                if was_waiting && !live.stopped.load(Ordering::SeqCst) {
                    live.waiting_for_silence.store(false, Ordering::SeqCst);
                    debug!("silence reached");
                    let tuner = InputTuner::from_shared(live.clone());
                    for listener in live.listeners.snapshot() {
                        listener.tuner_silence_reached(&tuner);
                    }
                }
            }
        }
        drop(live);
    }
    debug!("silence detector stopped");
}
