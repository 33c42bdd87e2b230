//! Controller subsystem - from device events to application commands.
//!
//! ```text
//! Gateway ──► InputController ──► ControllerContext ──► producers ──► listeners
//!                  │                  (routing table)      (gating)
//!                  └── CommandRepeater (auto-repeat cadence)
//! ```
//!
//! A controller composes a device binding, swappable routing contexts, a gating
//! policy and an auto-repeat hookup. Command vocabularies (plain vs joystick
//! flavored) are data, not subclasses.

pub mod command;
pub mod config;
pub mod context;
pub mod controller;
pub mod error;
pub mod joystick;
pub mod producer;
pub mod repeat;
pub mod selector;
pub mod trace;

pub use command::{InputCommand, InputCommandGroup};
pub use config::{CommandBinding, ConfigError, ContextConfiguration, ControllerConfiguration};
pub use context::{ControllerContext, InputEventProcessor};
pub use controller::{ControllerKind, ControllerSettings, InputController, InputControllerListener};
pub use error::ControllerError;
pub use producer::{
    CommandValueProducer, GatedCommandProducer, DEFAULT_FAST_RELEASE_DELTA, DEFAULT_FIRING_VALUE,
};
pub use repeat::CommandRepeater;
pub use selector::GatedInputSelector;
pub use trace::CommandTraceLogger;
