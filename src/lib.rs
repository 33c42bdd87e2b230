//! opengate - a gated command layer for physical input devices.
//!
//! Turns raw, noisy, high-frequency polled signals from joysticks, gamepads,
//! buttons and axes into clean application-level "command fired / command
//! released" events, and lets a user assign physical inputs to commands at
//! runtime through an interactive discovery flow.
//!
//! # Architecture
//!
//! ```text
//! backend (gilrs) ──► gateway ──► controller ──► command listeners
//!   (poll/rescan)      (pump,       (contexts,     (fire/release/value)
//!                      fan-out)      gating)
//!                         │             └── repeat scheduler (auto-repeat)
//!                         └──► tuner ──► interactive assignment ──► config
//! ```
//!
//! Everything is explicitly constructed and injected; the usual composition
//! root looks like:
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use opengate::backend::GilrsEventSource;
//! use opengate::controller::{CommandRepeater, ControllerKind, InputCommand, InputController};
//! use opengate::gateway::InputEventGateway;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let source = Arc::new(GilrsEventSource::new()?);
//! let gateway = InputEventGateway::with_source(source);
//! let repeater = CommandRepeater::new();
//!
//! let device = gateway.devices().into_iter().next().expect("a gamepad");
//! let controller = InputController::new(
//!     "Player 1",
//!     ControllerKind::Gated,
//!     device,
//!     &gateway,
//!     &repeater,
//!     None,
//! );
//! controller.setup_gated_button(InputCommand::new("fire"), "button.south")?;
//! # Ok(())
//! # }
//! ```

pub mod assign;
pub mod backend;
pub mod controller;
pub mod device;
pub mod gateway;
pub mod listeners;
pub mod tuner;

pub use assign::{AssignmentListener, InteractiveAssignment, RequiredCommands};
pub use controller::{
    CommandRepeater, ControllerConfiguration, ControllerError, ControllerKind, ControllerSettings,
    GatedInputSelector, InputCommand, InputCommandGroup, InputController, InputControllerListener,
};
pub use device::{
    DeviceFilter, DeviceKind, Input, InputDevice, InputEvent, InputEventSource, InputFilter,
    InputSpec, InputValueRange, RangeError,
};
pub use gateway::InputEventGateway;
pub use listeners::InputEventListener;
pub use tuner::{InputTuner, TunerListener};
