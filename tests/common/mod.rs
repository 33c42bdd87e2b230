//! Shared test fixtures: a scripted event source and capture listeners.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use opengate::controller::{InputCommand, InputController, InputControllerListener};
use opengate::device::{
    DeviceKind, Input, InputDevice, InputEvent, InputEventSource, InputSpec,
};
use opengate::gateway::InputEventGateway;
use opengate::listeners::InputEventListener;

/// Installs a test-writer subscriber so `--nocapture` runs show the pipeline's
/// tracing output. Safe to call from every test; only the first wins.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// A deterministic in-memory source: tests push events, the pipeline drains
/// them on the next poll.
pub struct ScriptedEventSource {
    devices: Mutex<Vec<InputDevice>>,
    queue: Mutex<VecDeque<InputEvent>>,
    rescans: AtomicUsize,
}

impl ScriptedEventSource {
    pub fn new(devices: Vec<InputDevice>) -> Self {
        Self {
            devices: Mutex::new(devices),
            queue: Mutex::new(VecDeque::new()),
            rescans: AtomicUsize::new(0),
        }
    }

    pub fn push_event(&self, event: InputEvent) {
        self.queue.lock().unwrap().push_back(event);
    }

    pub fn push_value(&self, input: &Input, value: f32) {
        self.push_event(InputEvent::new(input.clone(), value));
    }

    pub fn rescan_count(&self) -> usize {
        self.rescans.load(Ordering::SeqCst)
    }
}

impl InputEventSource for ScriptedEventSource {
    fn devices(&self) -> Vec<InputDevice> {
        self.devices.lock().unwrap().clone()
    }

    fn poll_events(&self) -> Vec<InputEvent> {
        self.queue.lock().unwrap().drain(..).collect()
    }

    fn rescan(&self) {
        self.rescans.fetch_add(1, Ordering::SeqCst);
    }
}

/// A gamepad-shaped test device: four buttons, two axes.
pub fn test_pad() -> InputDevice {
    InputDevice::new(
        "Test Pad",
        DeviceKind::Gamepad,
        vec![
            InputSpec::digital_button("button.south", "South button"),
            InputSpec::digital_button("button.east", "East button"),
            InputSpec::digital_button("button.north", "North button"),
            InputSpec::digital_button("button.west", "West button"),
            InputSpec::analog_axis("axis.x", "X axis"),
            InputSpec::analog_axis("axis.y", "Y axis"),
        ],
    )
}

pub fn second_pad() -> InputDevice {
    InputDevice::new(
        "Other Pad",
        DeviceKind::Gamepad,
        vec![
            InputSpec::digital_button("button.south", "South button"),
            InputSpec::analog_axis("axis.x", "X axis"),
        ],
    )
}

/// A gateway in external poll mode over a scripted source, so tests drive the
/// whole pipeline synchronously.
pub fn scripted_gateway(
    devices: Vec<InputDevice>,
) -> (Arc<ScriptedEventSource>, InputEventGateway) {
    let source = Arc::new(ScriptedEventSource::new(devices));
    let gateway = InputEventGateway::new();
    gateway.set_external_poll_mode(true);
    gateway.switch_source(Some(source.clone() as Arc<dyn InputEventSource>));
    (source, gateway)
}

/// One observed command notification.
#[derive(Debug, Clone)]
pub enum Observed {
    Fired {
        command: String,
        auto_repeat: bool,
        at: tokio::time::Instant,
    },
    Released {
        command: String,
        at: tokio::time::Instant,
    },
    Value {
        command: String,
        value: f32,
    },
}

/// Captures controller notifications for assertions.
#[derive(Default)]
pub struct CommandRecorder {
    observed: Mutex<Vec<Observed>>,
}

impl CommandRecorder {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn observed(&self) -> Vec<Observed> {
        self.observed.lock().unwrap().clone()
    }

    pub fn fires(&self) -> Vec<(String, bool, tokio::time::Instant)> {
        self.observed()
            .into_iter()
            .filter_map(|entry| match entry {
                Observed::Fired {
                    command,
                    auto_repeat,
                    at,
                } => Some((command, auto_repeat, at)),
                _ => None,
            })
            .collect()
    }

    pub fn fire_count(&self) -> usize {
        self.fires().iter().filter(|(_, repeat, _)| !repeat).count()
    }

    pub fn repeat_count(&self) -> usize {
        self.fires().iter().filter(|(_, repeat, _)| *repeat).count()
    }

    pub fn release_count(&self) -> usize {
        self.observed()
            .iter()
            .filter(|entry| matches!(entry, Observed::Released { .. }))
            .count()
    }

    pub fn values(&self) -> Vec<f32> {
        self.observed()
            .into_iter()
            .filter_map(|entry| match entry {
                Observed::Value { value, .. } => Some(value),
                _ => None,
            })
            .collect()
    }
}

impl InputControllerListener for CommandRecorder {
    fn command_fired(
        &self,
        _controller: &InputController,
        command: &InputCommand,
        auto_repeat: bool,
    ) {
        self.observed.lock().unwrap().push(Observed::Fired {
            command: command.identifier().to_string(),
            auto_repeat,
            at: tokio::time::Instant::now(),
        });
    }

    fn command_released(&self, _controller: &InputController, command: &InputCommand) {
        self.observed.lock().unwrap().push(Observed::Released {
            command: command.identifier().to_string(),
            at: tokio::time::Instant::now(),
        });
    }

    fn command_value_changed(
        &self,
        _controller: &InputController,
        command: &InputCommand,
        value: f32,
    ) {
        self.observed.lock().unwrap().push(Observed::Value {
            command: command.identifier().to_string(),
            value,
        });
    }
}

/// Counts raw events seen by a gateway listener.
#[derive(Default)]
pub struct EventCounter {
    pub seen: Mutex<Vec<InputEvent>>,
}

impl EventCounter {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn count(&self) -> usize {
        self.seen.lock().unwrap().len()
    }
}

impl InputEventListener for EventCounter {
    fn receive_input_event(&self, event: &InputEvent) {
        self.seen.lock().unwrap().push(event.clone());
    }
}
