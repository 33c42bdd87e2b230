//! Controller configuration - the serializable description of a fully wired
//! controller, and the builder that turns it back into a live one.
//!
//! The logical schema (persisted as TOML):
//!
//! ```toml
//! controller_kind = "gated"
//! controller_name = "Player 1"
//! device_id = "dev-0123456789abcdef"
//! concurrent_firing = true
//! fast_releasing = true
//!
//! [[contexts]]
//! context_id = "in-game"
//!
//! [[contexts.commands]]
//! command_id = "fire"
//! command_name = "Fire"
//! input_id = "button.south"
//! input_name = "South button"
//! firing_range_low = 1.0
//! # firing_range_high present => analog range; absent => digital single value
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use super::command::InputCommand;
use super::controller::{ControllerKind, ControllerSettings, InputController};
use super::error::ControllerError;
use super::repeat::CommandRepeater;
use super::selector::GatedInputSelector;
use crate::device::{InputValueRange, RangeError};
use crate::gateway::InputEventGateway;

/// Errors raised while parsing, serializing or materializing a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Controller(#[from] ControllerError),

    #[error(transparent)]
    Range(#[from] RangeError),

    #[error("could not parse controller configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("could not serialize controller configuration: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// One command binding within a context configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandBinding {
    pub command_id: String,
    pub command_name: String,
    pub input_id: String,
    pub input_name: String,
    pub firing_range_low: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub firing_range_high: Option<f32>,
}

impl CommandBinding {
    pub fn new(command: &InputCommand, selector: &GatedInputSelector) -> Self {
        let range = selector.firing_range();
        Self {
            command_id: command.identifier().to_string(),
            command_name: command.name().to_string(),
            input_id: selector.input_identifier().to_string(),
            input_name: selector.input_name().to_string(),
            firing_range_low: range.min_value(),
            firing_range_high: range.is_analog().then(|| range.max_value()),
        }
    }

    pub fn command(&self) -> InputCommand {
        InputCommand::named(self.command_name.clone(), self.command_id.clone())
    }

    /// The firing range: low only is a digital single value, low and high an
    /// analog interval. Inverted analog bounds are rejected.
    pub fn firing_range(&self) -> Result<InputValueRange, RangeError> {
        match self.firing_range_high {
            Some(high) => InputValueRange::analog(self.firing_range_low, high),
            None => Ok(InputValueRange::digital(self.firing_range_low)),
        }
    }

    pub fn selector(&self, device_identifier: &str) -> Result<GatedInputSelector, RangeError> {
        Ok(GatedInputSelector::new(
            device_identifier,
            self.input_id.clone(),
            self.input_name.clone(),
            self.firing_range()?,
        ))
    }
}

/// One context and its command bindings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextConfiguration {
    pub context_id: String,
    #[serde(default)]
    pub commands: Vec<CommandBinding>,
}

impl ContextConfiguration {
    pub fn new(context_id: impl Into<String>) -> Self {
        Self {
            context_id: context_id.into(),
            commands: Vec::new(),
        }
    }
}

fn default_true() -> bool {
    true
}

/// The complete serializable description of one controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControllerConfiguration {
    pub controller_kind: ControllerKind,
    pub controller_name: String,
    pub device_id: String,
    #[serde(default = "default_true")]
    pub concurrent_firing: bool,
    #[serde(default = "default_true")]
    pub fast_releasing: bool,
    #[serde(default)]
    pub contexts: Vec<ContextConfiguration>,
}

impl ControllerConfiguration {
    pub fn new(
        controller_kind: ControllerKind,
        controller_name: impl Into<String>,
        device_id: impl Into<String>,
    ) -> Self {
        Self {
            controller_kind,
            controller_name: controller_name.into(),
            device_id: device_id.into(),
            concurrent_firing: true,
            fast_releasing: true,
            contexts: Vec::new(),
        }
    }

    pub fn add_context(&mut self, context: ContextConfiguration) {
        self.contexts.push(context);
    }

    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Materializes the configuration into a live controller against `gateway`.
    ///
    /// Every context becomes a [`ControllerContext`](super::ControllerContext)
    /// with gated commands per binding; the last configured context ends up
    /// current. Missing devices or inputs surface as [`ControllerError`]
    /// values naming the identifier.
    pub fn build(
        &self,
        gateway: &InputEventGateway,
        repeater: &CommandRepeater,
    ) -> Result<InputController, ConfigError> {
        let settings = ControllerSettings {
            concurrent_firing: self.concurrent_firing,
            fast_releasing: self.fast_releasing,
            ..ControllerSettings::default()
        };
        let controller = InputController::for_device_identifier(
            self.controller_name.clone(),
            self.controller_kind,
            &self.device_id,
            gateway,
            repeater,
            Some(settings),
        )?;
        for context_configuration in &self.contexts {
            let context =
                super::context::ControllerContext::new(context_configuration.context_id.clone());
            controller.add_and_switch_context(context);
            for binding in &context_configuration.commands {
                controller.setup_gated_command(
                    binding.command(),
                    &binding.input_id,
                    binding.firing_range()?,
                )?;
            }
        }
        info!(
            controller = self.controller_name.as_str(),
            device = self.device_id.as_str(),
            contexts = self.contexts.len(),
            "controller built from configuration"
        );
        Ok(controller)
    }
}
