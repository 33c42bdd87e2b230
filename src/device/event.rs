//! Timestamped input events.

use chrono::{DateTime, Local};

use super::Input;

/// A point-in-time snapshot of one input's value.
///
/// Events are owned and freshly allocated per poll cycle; consumers may retain
/// them freely. Cloning is cheap, the input handle is shared.
#[derive(Debug, Clone)]
pub struct InputEvent {
    input: Input,
    value: f32,
    timestamp: DateTime<Local>,
}

impl InputEvent {
    /// An event stamped with the current time.
    pub fn new(input: Input, value: f32) -> Self {
        Self::at(input, value, Local::now())
    }

    /// An event with an explicit creation timestamp, for sources that read
    /// hardware timestamps.
    pub fn at(input: Input, value: f32, timestamp: DateTime<Local>) -> Self {
        Self {
            input,
            value,
            timestamp,
        }
    }

    pub fn input(&self) -> &Input {
        &self.input
    }

    pub fn device_identifier(&self) -> &str {
        self.input.device_identifier()
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn timestamp(&self) -> DateTime<Local> {
        self.timestamp
    }
}

impl std::fmt::Display for InputEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} = {}", self.input.name(), self.value)
    }
}
