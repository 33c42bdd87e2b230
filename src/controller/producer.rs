//! Command producers - processors that turn raw input values into command
//! notifications.
//!
//! [`CommandValueProducer`] forwards every value change. [`GatedCommandProducer`]
//! runs the two-state gate (idle/firing) that debounces a continuous signal into
//! discrete fire/release transitions, with an optional fast-release policy for
//! self-centering analog axes.

use std::sync::Mutex;
use tracing::trace;

use super::command::InputCommand;
use super::context::InputEventProcessor;
use super::controller::InputController;
use crate::device::{InputEvent, InputValueRange};

/// Default accepted value for digital firing ranges.
pub const DEFAULT_FIRING_VALUE: f32 = 1.0;

/// Default decline from the recent peak that triggers a fast release,
/// in normalized axis units.
pub const DEFAULT_FAST_RELEASE_DELTA: f32 = 0.02;

/// Forwards raw values as command value-changed notifications.
pub struct CommandValueProducer {
    command: InputCommand,
}

impl CommandValueProducer {
    pub fn new(command: InputCommand) -> Self {
        Self { command }
    }
}

impl InputEventProcessor for CommandValueProducer {
    fn process(&self, event: &InputEvent, controller: &InputController) {
        controller.notify_command_value(&self.command, event.value());
    }

    fn command(&self) -> Option<&InputCommand> {
        Some(&self.command)
    }
}

struct Gate {
    firing: bool,
    pivot: f32,
}

/// The gating state machine for one (input, command) binding.
///
/// Standard policy: the command fires while the value sits inside the firing
/// range and releases when it leaves. Fast-release policy (analog inputs, with
/// the controller's fast-release mode on) tracks a decaying pivot just below the
/// recent peak; a decline of `fast_release_delta` from that peak releases the
/// command without waiting for the value to fall out of the range, cutting
/// perceived latency on self-centering sticks used as directional pads.
pub struct GatedCommandProducer {
    command: InputCommand,
    firing_range: InputValueRange,
    fast_release_delta: f32,
    gate: Mutex<Gate>,
}

impl GatedCommandProducer {
    pub fn new(command: InputCommand, firing_range: InputValueRange) -> Self {
        let pivot = initial_pivot(firing_range);
        Self {
            command,
            firing_range,
            fast_release_delta: DEFAULT_FAST_RELEASE_DELTA,
            gate: Mutex::new(Gate {
                firing: false,
                pivot,
            }),
        }
    }

    /// A producer gated on the digital "on" value.
    pub fn digital(command: InputCommand) -> Self {
        Self::new(command, InputValueRange::digital(DEFAULT_FIRING_VALUE))
    }

    pub fn with_fast_release_delta(mut self, delta: f32) -> Self {
        self.fast_release_delta = delta;
        self
    }

    pub fn firing_range(&self) -> InputValueRange {
        self.firing_range
    }

    pub fn is_firing(&self) -> bool {
        self.gate.lock().expect("gate poisoned").firing
    }

    /// Whether the firing range sits on the positive side of the axis. The
    /// pivot is always tracked on positive values; negative-side ranges are
    /// mirrored.
    fn is_positive_axis(&self) -> bool {
        self.firing_range.min_value() >= 0.0
    }

    fn initial_pivot(&self) -> f32 {
        initial_pivot(self.firing_range)
    }

    fn maximum_pivot(&self) -> f32 {
        if self.is_positive_axis() {
            self.firing_range.max_value()
        } else {
            -self.firing_range.min_value()
        }
    }

    fn process_standard(&self, event: &InputEvent, controller: &InputController) {
        let transition = {
            let mut gate = self.gate.lock().expect("gate poisoned");
            let was_firing = gate.firing;
            gate.firing = self.firing_range.contains(event.value());
            match (was_firing, gate.firing) {
                (false, true) => Some(true),
                (true, false) => Some(false),
                _ => None,
            }
        };
        match transition {
            Some(true) => controller.fire_command(&self.command),
            Some(false) => controller.release_command(&self.command),
            None => {}
        }
    }

    fn process_fast_release(&self, event: &InputEvent, controller: &InputController) {
        let value = if self.is_positive_axis() {
            event.value()
        } else {
            -event.value()
        };
        let delta = self.fast_release_delta;
        let floor = self.initial_pivot();
        let transition = {
            let mut gate = self.gate.lock().expect("gate poisoned");
            if !gate.firing {
                if value >= gate.pivot {
                    gate.firing = true;
                    gate.pivot = (value - delta).max(floor);
                    Some(true)
                } else {
                    // Idle: the pivot decays toward the floor as the value falls.
                    gate.pivot = gate.pivot.min(value + delta).max(floor);
                    None
                }
            } else if value < gate.pivot {
                gate.firing = false;
                gate.pivot = (value + delta).min(self.maximum_pivot());
                Some(false)
            } else {
                // Firing and rising: the pivot follows just below the peak.
                gate.pivot = (value - delta).max(gate.pivot);
                None
            }
        };
        match transition {
            Some(true) => {
                trace!(command = self.command.identifier(), value, "fast-release fire");
                controller.fire_command(&self.command);
            }
            Some(false) => {
                trace!(command = self.command.identifier(), value, "fast-release release");
                controller.release_command(&self.command);
            }
            None => {}
        }
    }
}

fn initial_pivot(range: InputValueRange) -> f32 {
    if range.min_value() >= 0.0 {
        range.min_value()
    } else {
        -range.max_value()
    }
}

impl InputEventProcessor for GatedCommandProducer {
    fn init(&self, _controller: &InputController) {
        let mut gate = self.gate.lock().expect("gate poisoned");
        gate.firing = false;
        gate.pivot = self.initial_pivot();
    }

    fn process(&self, event: &InputEvent, controller: &InputController) {
        if event.input().is_digital() || !controller.is_fast_releasing() {
            self.process_standard(event, controller);
        } else {
            self.process_fast_release(event, controller);
        }
    }

    fn exit(&self, controller: &InputController) {
        let was_firing = {
            let mut gate = self.gate.lock().expect("gate poisoned");
            gate.pivot = self.initial_pivot();
            std::mem::replace(&mut gate.firing, false)
        };
        if was_firing {
            controller.release_command(&self.command);
        }
    }

    fn command(&self) -> Option<&InputCommand> {
        Some(&self.command)
    }
}
