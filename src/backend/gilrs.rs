//! gilrs-backed event source.
//!
//! Wraps a [`gilrs::Gilrs`] context behind the [`InputEventSource`] boundary:
//! connected gamepads become [`InputDevice`]s with a stable fingerprint derived
//! from name, UUID and the standard input catalog, and gilrs events become
//! [`InputEvent`]s against the cached catalog. gilrs itself is not `Sync`, so
//! the whole backend state lives behind one mutex; callers already serialize
//! polling through the gateway's poll lock.

use chrono::{DateTime, Local};
use gilrs::{Axis, Button, Event, EventType, GamepadId, Gilrs};
use std::collections::HashMap;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::Mutex;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::device::{DeviceKind, Input, InputDevice, InputEvent, InputEventSource, InputSpec};

/// Errors raised while initializing the backend.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("failed to initialize gilrs: {0}")]
    Initialization(String),
}

const BUTTONS: &[(Button, &str, &str)] = &[
    (Button::South, "button.south", "South button"),
    (Button::East, "button.east", "East button"),
    (Button::North, "button.north", "North button"),
    (Button::West, "button.west", "West button"),
    (Button::LeftTrigger, "button.left-bumper", "Left bumper"),
    (Button::RightTrigger, "button.right-bumper", "Right bumper"),
    (Button::LeftTrigger2, "button.left-trigger", "Left trigger"),
    (
        Button::RightTrigger2,
        "button.right-trigger",
        "Right trigger",
    ),
    (Button::Select, "button.select", "Select button"),
    (Button::Start, "button.start", "Start button"),
    (Button::Mode, "button.mode", "Mode button"),
    (Button::LeftThumb, "button.left-thumb", "Left stick button"),
    (
        Button::RightThumb,
        "button.right-thumb",
        "Right stick button",
    ),
    (Button::DPadUp, "button.dpad-up", "D-pad up"),
    (Button::DPadDown, "button.dpad-down", "D-pad down"),
    (Button::DPadLeft, "button.dpad-left", "D-pad left"),
    (Button::DPadRight, "button.dpad-right", "D-pad right"),
];

const AXES: &[(Axis, &str, &str)] = &[
    (Axis::LeftStickX, "axis.left-stick-x", "Left stick X"),
    (Axis::LeftStickY, "axis.left-stick-y", "Left stick Y"),
    (Axis::RightStickX, "axis.right-stick-x", "Right stick X"),
    (Axis::RightStickY, "axis.right-stick-y", "Right stick Y"),
    (Axis::LeftZ, "axis.left-z", "Left Z"),
    (Axis::RightZ, "axis.right-z", "Right Z"),
];

struct GilrsState {
    gilrs: Gilrs,
    devices: HashMap<GamepadId, InputDevice>,
}

/// The default [`InputEventSource`] over the gilrs gamepad layer.
pub struct GilrsEventSource {
    state: Mutex<GilrsState>,
}

impl GilrsEventSource {
    pub fn new() -> Result<Self, BackendError> {
        let gilrs = Gilrs::new().map_err(|error| {
            warn!("gilrs initialization failed: {error}");
            BackendError::Initialization(error.to_string())
        })?;
        info!("gilrs backend initialized");
        let mut state = GilrsState {
            gilrs,
            devices: HashMap::new(),
        };
        refresh_devices(&mut state);
        Ok(Self {
            state: Mutex::new(state),
        })
    }
}

impl InputEventSource for GilrsEventSource {
    fn devices(&self) -> Vec<InputDevice> {
        let mut state = self.state.lock().expect("gilrs state poisoned");
        refresh_connected(&mut state);
        state.devices.values().cloned().collect()
    }

    fn poll_events(&self) -> Vec<InputEvent> {
        let mut state = self.state.lock().expect("gilrs state poisoned");
        let mut events = Vec::new();
        while let Some(Event {
            id, event, time, ..
        }) = state.gilrs.next_event()
        {
            let timestamp: DateTime<Local> = DateTime::from(time);
            match event {
                EventType::ButtonPressed(button, _) => {
                    if let Some(input) = resolve_input(&mut state, id, button_identifier(button)) {
                        events.push(InputEvent::at(input, 1.0, timestamp));
                    }
                }
                EventType::ButtonReleased(button, _) => {
                    if let Some(input) = resolve_input(&mut state, id, button_identifier(button)) {
                        events.push(InputEvent::at(input, 0.0, timestamp));
                    }
                }
                EventType::AxisChanged(axis, value, _) => {
                    if let Some(input) = resolve_input(&mut state, id, axis_identifier(axis)) {
                        events.push(InputEvent::at(input, value, timestamp));
                    }
                }
                EventType::Connected => {
                    debug!(gamepad = %id, "gamepad connected");
                    cache_device(&mut state, id);
                }
                EventType::Disconnected => {
                    debug!(gamepad = %id, "gamepad disconnected");
                    state.devices.remove(&id);
                }
                _ => {}
            }
        }
        events
    }

    fn rescan(&self) {
        let mut state = self.state.lock().expect("gilrs state poisoned");
        refresh_devices(&mut state);
        debug!(devices = state.devices.len(), "device rescan complete");
    }
}

/// Caches newly connected gamepads and evicts vanished ones; surviving devices
/// keep their identity.
fn refresh_devices(state: &mut GilrsState) {
    refresh_connected(state);
    let connected: Vec<GamepadId> = state
        .gilrs
        .gamepads()
        .map(|(id, _)| id)
        .collect();
    state.devices.retain(|id, _| connected.contains(id));
}

fn refresh_connected(state: &mut GilrsState) {
    let ids: Vec<GamepadId> = state.gilrs.gamepads().map(|(id, _)| id).collect();
    for id in ids {
        cache_device(state, id);
    }
}

fn cache_device(state: &mut GilrsState, id: GamepadId) {
    if state.devices.contains_key(&id) {
        return;
    }
    let gamepad = state.gilrs.gamepad(id);
    let name = gamepad.name().to_string();
    let identifier = derive_identifier(&name, gamepad.uuid());
    let specs: Vec<InputSpec> = BUTTONS
        .iter()
        .map(|(_, identifier, label)| InputSpec::digital_button(*identifier, *label))
        .chain(
            AXES.iter()
                .map(|(_, identifier, label)| InputSpec::analog_axis(*identifier, *label)),
        )
        .collect();
    let device = InputDevice::with_identifier(identifier, &name, DeviceKind::Gamepad, specs);
    info!(device = %device, "gamepad cached");
    state.devices.insert(id, device);
}

/// Fingerprint from the pad's name and UUID (vendor/product/bus), stable across
/// process restarts for the same unit model.
fn derive_identifier(name: &str, uuid: [u8; 16]) -> String {
    let mut hasher = DefaultHasher::new();
    DeviceKind::Gamepad.hash(&mut hasher);
    name.hash(&mut hasher);
    uuid.hash(&mut hasher);
    format!("gilrs-{:016x}", hasher.finish())
}

fn resolve_input(state: &mut GilrsState, id: GamepadId, identifier: Option<&str>) -> Option<Input> {
    let identifier = identifier?;
    cache_device(state, id);
    state
        .devices
        .get(&id)
        .and_then(|device| device.input_with_identifier(identifier))
}

fn button_identifier(button: Button) -> Option<&'static str> {
    BUTTONS
        .iter()
        .find(|(known, _, _)| *known == button)
        .map(|(_, identifier, _)| *identifier)
}

fn axis_identifier(axis: Axis) -> Option<&'static str> {
    AXES.iter()
        .find(|(known, _, _)| *known == axis)
        .map(|(_, identifier, _)| *identifier)
}
