//! The joystick command vocabulary.
//!
//! A preset set of directional and action commands for stick-style controllers.
//! This is plain composition: any controller can carry these commands, the
//! vocabulary just fixes identifiers and display names so configurations and
//! assignment sessions agree on them.

use super::command::{InputCommand, InputCommandGroup};

pub fn up() -> InputCommand {
    InputCommand::named("Up", "joystick.up")
}

pub fn down() -> InputCommand {
    InputCommand::named("Down", "joystick.down")
}

pub fn left() -> InputCommand {
    InputCommand::named("Left", "joystick.left")
}

pub fn right() -> InputCommand {
    InputCommand::named("Right", "joystick.right")
}

pub fn primary_fire() -> InputCommand {
    InputCommand::named("Fire", "joystick.fire")
}

pub fn secondary_fire() -> InputCommand {
    InputCommand::named("Secondary fire", "joystick.fire2")
}

pub fn start() -> InputCommand {
    InputCommand::named("Start", "joystick.start")
}

pub fn select() -> InputCommand {
    InputCommand::named("Select", "joystick.select")
}

/// The four directions. Within the group each direction must map to a distinct
/// physical input during interactive assignment.
pub fn directional_group() -> InputCommandGroup {
    InputCommandGroup::with_members("joystick-directions", [up(), down(), left(), right()])
}

/// The action buttons.
pub fn action_group() -> InputCommandGroup {
    InputCommandGroup::with_members(
        "joystick-actions",
        [primary_fire(), secondary_fire(), start(), select()],
    )
}

/// The full standard vocabulary, directions first.
pub fn standard_groups() -> Vec<InputCommandGroup> {
    vec![directional_group(), action_group()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vocabulary_identifiers_are_distinct() {
        let groups = standard_groups();
        let mut seen = std::collections::HashSet::new();
        for group in &groups {
            for command in group.members() {
                assert!(
                    seen.insert(command.identifier().to_string()),
                    "duplicate command identifier {}",
                    command.identifier()
                );
            }
        }
        assert_eq!(seen.len(), 8);
    }
}
