//! Tracing-backed controller listener, handy while dialing in bindings.

use tracing::info;

use super::command::InputCommand;
use super::controller::{InputController, InputControllerListener};

/// Logs every fire/release transition of a controller through `tracing`.
/// Value changes are logged only when enabled, they are high-frequency.
#[derive(Debug, Default)]
pub struct CommandTraceLogger {
    log_values: bool,
}

impl CommandTraceLogger {
    pub fn new() -> Self {
        Self { log_values: false }
    }

    pub fn with_values() -> Self {
        Self { log_values: true }
    }
}

impl InputControllerListener for CommandTraceLogger {
    fn command_fired(&self, controller: &InputController, command: &InputCommand, auto_repeat: bool) {
        info!(
            controller = controller.name(),
            command = command.identifier(),
            auto_repeat,
            "fired"
        );
    }

    fn command_released(&self, controller: &InputController, command: &InputCommand) {
        info!(
            controller = controller.name(),
            command = command.identifier(),
            "released"
        );
    }

    fn command_value_changed(
        &self,
        controller: &InputController,
        command: &InputCommand,
        value: f32,
    ) {
        if self.log_values {
            info!(
                controller = controller.name(),
                command = command.identifier(),
                value,
                "value changed"
            );
        }
    }
}
