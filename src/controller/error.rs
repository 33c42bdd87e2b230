//! Error definitions for the controller module.

use thiserror::Error;

use crate::device::RangeError;

/// Recoverable configuration errors raised while wiring a controller.
///
/// Each variant names the identifier that could not be resolved, so a host can
/// prompt for reconnection or fix its configuration. A device that is merely
/// disconnected right now surfaces as [`ControllerError::DeviceNotFound`] too;
/// retrying after reconnection is expected to succeed.
#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("no input device with identifier '{0}' is connected")]
    DeviceNotFound(String),

    #[error("device '{device}' has no input with identifier '{input}'")]
    InputNotFound { device: String, input: String },

    #[error("no context with identifier '{0}' was added to this controller")]
    ContextNotFound(String),

    #[error(transparent)]
    Range(#[from] RangeError),
}
