//! The device backend boundary.

use super::{Input, InputDevice, InputEvent, InputFilter};

/// A polled source of input devices and their events.
///
/// Implementations wrap a native device layer (see
/// [`GilrsEventSource`](crate::backend::GilrsEventSource)) or synthesize events
/// for testing. The contract:
///
/// - [`poll_events`](Self::poll_events) is non-blocking and returns only events
///   accumulated since the previous call. Callers serialize polling; a source is
///   never polled concurrently from two threads.
/// - Device and input handles are cached: the same physical unit yields the same
///   [`InputDevice`] (and identifier) across calls, until a
///   [`rescan`](Self::rescan) observes its disappearance.
pub trait InputEventSource: Send + Sync {
    /// The currently known devices.
    fn devices(&self) -> Vec<InputDevice>;

    /// Drains all events that occurred since the previous poll.
    fn poll_events(&self) -> Vec<InputEvent>;

    /// Refreshes the device list. Cached identity is invalidated only for
    /// devices that disappeared.
    fn rescan(&self);

    /// The backend's definition of "explicit user gesture" inputs, excluding
    /// channels that report ambient noise (force, velocity, acceleration
    /// feedback and the like).
    fn user_gesture_filter(&self) -> InputFilter {
        InputFilter::accept_all()
    }

    fn device_with_identifier(&self, identifier: &str) -> Option<InputDevice> {
        self.devices()
            .into_iter()
            .find(|device| device.identifier() == identifier)
    }

    fn input_with_identifier(
        &self,
        device_identifier: &str,
        input_identifier: &str,
    ) -> Option<Input> {
        self.device_with_identifier(device_identifier)?
            .input_with_identifier(input_identifier)
    }
}
