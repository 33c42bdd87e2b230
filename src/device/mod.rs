//! Input device model
//!
//! Devices and their inputs are cheap-clone handles around immutable shared state:
//!
//! ```text
//! InputEventSource ──► InputDevice ──► [Input] ──► InputValueRange
//! ```
//!
//! Identity rules: a device is identified by a stable string fingerprint (same
//! physical unit maps to the same identifier across process restarts), an input by
//! the pair (device identifier, input identifier). Input catalogs are enumerated
//! once per device lifetime and cached.

pub mod event;
pub mod filter;
pub mod range;
pub mod source;

pub use event::InputEvent;
pub use filter::{DeviceFilter, InputFilter};
pub use range::{InputValueRange, RangeError};
pub use source::InputEventSource;

use serde::{Deserialize, Serialize};
use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::Arc;

/// Broad device category, used by device filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceKind {
    Mouse,
    Keyboard,
    Stick,
    Gamepad,
    Unknown,
}

impl std::fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            DeviceKind::Mouse => "mouse",
            DeviceKind::Keyboard => "keyboard",
            DeviceKind::Stick => "stick",
            DeviceKind::Gamepad => "gamepad",
            DeviceKind::Unknown => "unknown",
        };
        write!(f, "{label}")
    }
}

/// Immutable description of one input, used to build a device's catalog.
#[derive(Debug, Clone)]
pub struct InputSpec {
    pub identifier: String,
    pub name: String,
    pub analog: bool,
    pub relative: bool,
    pub range: InputValueRange,
}

impl InputSpec {
    /// A digital button accepting the value `1.0` when pressed.
    pub fn digital_button(identifier: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            name: name.into(),
            analog: false,
            relative: false,
            range: InputValueRange::digital(1.0),
        }
    }

    /// An absolute analog axis over `[-1, 1]`.
    pub fn analog_axis(identifier: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            name: name.into(),
            analog: true,
            relative: false,
            range: InputValueRange::analog_span(-1.0, 1.0),
        }
    }
}

struct DeviceInner {
    name: String,
    identifier: String,
    kind: DeviceKind,
    inputs: Vec<Input>,
}

/// A physical input device and its cached input catalog.
#[derive(Clone)]
pub struct InputDevice {
    inner: Arc<DeviceInner>,
}

impl InputDevice {
    /// Builds a device whose identifier is fingerprinted from its kind, name and
    /// sorted input identifiers.
    pub fn new(name: impl Into<String>, kind: DeviceKind, inputs: Vec<InputSpec>) -> Self {
        let name = name.into();
        let identifier = fingerprint(
            kind,
            &name,
            inputs.iter().map(|spec| spec.identifier.as_str()),
        );
        Self::with_identifier(identifier, name, kind, inputs)
    }

    /// Builds a device with an explicit identifier, for backends that derive
    /// identity from richer native data.
    pub fn with_identifier(
        identifier: impl Into<String>,
        name: impl Into<String>,
        kind: DeviceKind,
        inputs: Vec<InputSpec>,
    ) -> Self {
        let identifier = identifier.into();
        let inputs = inputs
            .into_iter()
            .map(|spec| Input {
                inner: Arc::new(InputInner {
                    device_identifier: identifier.clone(),
                    identifier: spec.identifier,
                    name: spec.name,
                    analog: spec.analog,
                    relative: spec.relative,
                    range: spec.range,
                }),
            })
            .collect();
        Self {
            inner: Arc::new(DeviceInner {
                name: name.into(),
                identifier,
                kind,
                inputs,
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn identifier(&self) -> &str {
        &self.inner.identifier
    }

    pub fn kind(&self) -> DeviceKind {
        self.inner.kind
    }

    /// The ordered input catalog, enumerated once for the device's lifetime.
    pub fn inputs(&self) -> &[Input] {
        &self.inner.inputs
    }

    pub fn input_with_identifier(&self, identifier: &str) -> Option<Input> {
        self.inner
            .inputs
            .iter()
            .find(|input| input.identifier() == identifier)
            .cloned()
    }
}

impl PartialEq for InputDevice {
    fn eq(&self, other: &Self) -> bool {
        self.identifier() == other.identifier()
    }
}

impl Eq for InputDevice {}

impl Hash for InputDevice {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identifier().hash(state);
    }
}

impl std::fmt::Debug for InputDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InputDevice")
            .field("name", &self.name())
            .field("identifier", &self.identifier())
            .field("kind", &self.kind())
            .field("inputs", &self.inputs().len())
            .finish()
    }
}

impl std::fmt::Display for InputDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name(), self.identifier())
    }
}

/// Derives a stable device identifier from kind, name and sorted input identifiers.
///
/// The same physical unit yields the same fingerprint across process restarts;
/// units with differing names or catalogs yield distinct fingerprints.
pub fn fingerprint<'a>(
    kind: DeviceKind,
    name: &str,
    input_identifiers: impl Iterator<Item = &'a str>,
) -> String {
    let mut ids: Vec<&str> = input_identifiers.collect();
    ids.sort_unstable();
    let mut hasher = DefaultHasher::new();
    kind.hash(&mut hasher);
    name.hash(&mut hasher);
    for id in ids {
        id.hash(&mut hasher);
    }
    format!("dev-{:016x}", hasher.finish())
}

struct InputInner {
    device_identifier: String,
    identifier: String,
    name: String,
    analog: bool,
    relative: bool,
    range: InputValueRange,
}

/// One input (button, axis, ...) of a device.
#[derive(Clone)]
pub struct Input {
    inner: Arc<InputInner>,
}

impl Input {
    pub fn device_identifier(&self) -> &str {
        &self.inner.device_identifier
    }

    pub fn identifier(&self) -> &str {
        &self.inner.identifier
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn is_analog(&self) -> bool {
        self.inner.analog
    }

    pub fn is_digital(&self) -> bool {
        !self.inner.analog
    }

    pub fn is_relative(&self) -> bool {
        self.inner.relative
    }

    pub fn is_absolute(&self) -> bool {
        !self.inner.relative
    }

    pub fn value_range(&self) -> InputValueRange {
        self.inner.range
    }
}

impl PartialEq for Input {
    fn eq(&self, other: &Self) -> bool {
        self.device_identifier() == other.device_identifier()
            && self.identifier() == other.identifier()
    }
}

impl Eq for Input {}

impl Hash for Input {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.device_identifier().hash(state);
        self.identifier().hash(state);
    }
}

impl std::fmt::Debug for Input {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Input")
            .field("device", &self.device_identifier())
            .field("identifier", &self.identifier())
            .field("name", &self.name())
            .field("analog", &self.is_analog())
            .finish()
    }
}

impl std::fmt::Display for Input {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} [{}, {}]",
            self.name(),
            if self.is_digital() { "digital" } else { "analog" },
            if self.is_absolute() {
                "absolute"
            } else {
                "relative"
            },
        )
    }
}
