//! Device and input filters.
//!
//! Filters are cheap-clone predicate values. Backends provide the default
//! "explicit user gesture" input filter through
//! [`InputEventSource::user_gesture_filter`](super::source::InputEventSource::user_gesture_filter).

use std::collections::HashSet;
use std::sync::Arc;

use super::{DeviceKind, Input, InputDevice};

/// Predicate over input devices.
#[derive(Clone)]
pub struct DeviceFilter(Arc<dyn Fn(&InputDevice) -> bool + Send + Sync>);

impl DeviceFilter {
    pub fn accept_all() -> Self {
        Self(Arc::new(|_| true))
    }

    pub fn of_kind(kind: DeviceKind) -> Self {
        Self(Arc::new(move |device| device.kind() == kind))
    }

    /// Sticks and gamepads, the usual candidates for command binding.
    pub fn stick_or_gamepad() -> Self {
        Self(Arc::new(|device| {
            matches!(device.kind(), DeviceKind::Stick | DeviceKind::Gamepad)
        }))
    }

    pub fn with_identifier(identifier: impl Into<String>) -> Self {
        let identifier = identifier.into();
        Self(Arc::new(move |device| device.identifier() == identifier))
    }

    pub fn custom(predicate: impl Fn(&InputDevice) -> bool + Send + Sync + 'static) -> Self {
        Self(Arc::new(predicate))
    }

    pub fn accepts(&self, device: &InputDevice) -> bool {
        (self.0)(device)
    }
}

impl Default for DeviceFilter {
    fn default() -> Self {
        Self::accept_all()
    }
}

impl std::fmt::Debug for DeviceFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("DeviceFilter(..)")
    }
}

/// Predicate over inputs.
#[derive(Clone)]
pub struct InputFilter(Arc<dyn Fn(&Input) -> bool + Send + Sync>);

impl InputFilter {
    pub fn accept_all() -> Self {
        Self(Arc::new(|_| true))
    }

    /// Rejects inputs whose identifier is in `identifiers`; accepts the rest.
    /// Used by backends to exclude ambient-noise channels from discovery.
    pub fn excluding_identifiers(identifiers: impl IntoIterator<Item = String>) -> Self {
        let excluded: HashSet<String> = identifiers.into_iter().collect();
        Self(Arc::new(move |input| !excluded.contains(input.identifier())))
    }

    pub fn custom(predicate: impl Fn(&Input) -> bool + Send + Sync + 'static) -> Self {
        Self(Arc::new(predicate))
    }

    pub fn accepts(&self, input: &Input) -> bool {
        (self.0)(input)
    }
}

impl Default for InputFilter {
    fn default() -> Self {
        Self::accept_all()
    }
}

impl std::fmt::Debug for InputFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("InputFilter(..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::InputSpec;

    fn pad() -> InputDevice {
        InputDevice::new(
            "Pad",
            DeviceKind::Gamepad,
            vec![
                InputSpec::digital_button("button.a", "A"),
                InputSpec::analog_axis("axis.noise", "Noise"),
            ],
        )
    }

    #[test]
    fn kind_filters_discriminate() {
        let device = pad();
        assert!(DeviceFilter::of_kind(DeviceKind::Gamepad).accepts(&device));
        assert!(!DeviceFilter::of_kind(DeviceKind::Keyboard).accepts(&device));
        assert!(DeviceFilter::stick_or_gamepad().accepts(&device));
        assert!(DeviceFilter::with_identifier(device.identifier()).accepts(&device));
    }

    #[test]
    fn exclusion_filter_drops_listed_inputs() {
        let device = pad();
        let filter = InputFilter::excluding_identifiers(["axis.noise".to_string()]);
        assert!(filter.accepts(&device.input_with_identifier("button.a").unwrap()));
        assert!(!filter.accepts(&device.input_with_identifier("axis.noise").unwrap()));
    }
}
