//! Declarative input bindings.

use crate::device::{Input, InputEvent, InputValueRange};
use crate::gateway::InputEventGateway;

/// "This input on this device, accepted within this range, fires the command."
///
/// Selectors are plain data: they name device and input by identifier so they
/// survive serialization and device reconnects. Equality is device + input +
/// firing range; the input name is carried for presentation only.
#[derive(Debug, Clone)]
pub struct GatedInputSelector {
    device_identifier: String,
    input_identifier: String,
    input_name: String,
    firing_range: InputValueRange,
}

impl GatedInputSelector {
    /// # Panics
    ///
    /// Panics on empty device or input identifiers.
    pub fn new(
        device_identifier: impl Into<String>,
        input_identifier: impl Into<String>,
        input_name: impl Into<String>,
        firing_range: InputValueRange,
    ) -> Self {
        let device_identifier = device_identifier.into();
        let input_identifier = input_identifier.into();
        assert!(
            !device_identifier.is_empty(),
            "selector device identifier must not be empty"
        );
        assert!(
            !input_identifier.is_empty(),
            "selector input identifier must not be empty"
        );
        Self {
            device_identifier,
            input_identifier,
            input_name: input_name.into(),
            firing_range,
        }
    }

    /// A selector binding the input behind `event` to `firing_range`.
    pub fn for_event(event: &InputEvent, firing_range: InputValueRange) -> Self {
        Self::new(
            event.device_identifier(),
            event.input().identifier(),
            event.input().name(),
            firing_range,
        )
    }

    pub fn device_identifier(&self) -> &str {
        &self.device_identifier
    }

    pub fn input_identifier(&self) -> &str {
        &self.input_identifier
    }

    pub fn input_name(&self) -> &str {
        &self.input_name
    }

    pub fn firing_range(&self) -> InputValueRange {
        self.firing_range
    }

    pub(crate) fn with_firing_range(&self, firing_range: InputValueRange) -> Self {
        Self {
            firing_range,
            ..self.clone()
        }
    }

    /// Looks the bound input up through the gateway's current source.
    pub fn resolve_input(&self, gateway: &InputEventGateway) -> Option<Input> {
        gateway.input_with_identifier(&self.device_identifier, &self.input_identifier)
    }
}

impl PartialEq for GatedInputSelector {
    fn eq(&self, other: &Self) -> bool {
        self.device_identifier == other.device_identifier
            && self.input_identifier == other.input_identifier
            && self.firing_range == other.firing_range
    }
}

impl std::fmt::Display for GatedInputSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({}) {}",
            self.input_name, self.input_identifier, self.firing_range
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_ignores_the_display_name() {
        let range = InputValueRange::digital(1.0);
        let a = GatedInputSelector::new("dev-1", "button.a", "A", range);
        let b = GatedInputSelector::new("dev-1", "button.a", "South button", range);
        assert_eq!(a, b);
    }

    #[test]
    fn equality_discriminates_range_and_input() {
        let a = GatedInputSelector::new("dev-1", "axis.x", "X", InputValueRange::digital(1.0));
        let other_range = GatedInputSelector::new(
            "dev-1",
            "axis.x",
            "X",
            InputValueRange::analog(0.4, 1.0).unwrap(),
        );
        let other_input =
            GatedInputSelector::new("dev-1", "axis.y", "Y", InputValueRange::digital(1.0));
        assert_ne!(a, other_range);
        assert_ne!(a, other_input);
    }
}
