//! Application-level commands and command groups.

use std::hash::{Hash, Hasher};

/// A named, identifiable application command.
///
/// Identity is the identifier alone; display name and description are
/// presentation data.
#[derive(Debug, Clone)]
pub struct InputCommand {
    identifier: String,
    name: String,
    description: Option<String>,
}

impl InputCommand {
    /// A command whose display name equals its identifier.
    ///
    /// # Panics
    ///
    /// Panics on an empty identifier; that is a programming error, not a
    /// recoverable condition.
    pub fn new(identifier: impl Into<String>) -> Self {
        let identifier = identifier.into();
        Self::named(identifier.clone(), identifier)
    }

    /// A command with separate display name and identifier.
    ///
    /// # Panics
    ///
    /// Panics when either is empty.
    pub fn named(name: impl Into<String>, identifier: impl Into<String>) -> Self {
        let name = name.into();
        let identifier = identifier.into();
        assert!(!name.is_empty(), "command name must not be empty");
        assert!(!identifier.is_empty(), "command identifier must not be empty");
        Self {
            identifier,
            name,
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

impl PartialEq for InputCommand {
    fn eq(&self, other: &Self) -> bool {
        self.identifier == other.identifier
    }
}

impl Eq for InputCommand {}

impl Hash for InputCommand {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identifier.hash(state);
    }
}

impl std::fmt::Display for InputCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

/// An ordered, duplicate-free set of commands.
///
/// A command may belong to several groups. During interactive assignment each
/// group enforces that its members are bound to distinct physical inputs.
#[derive(Debug, Clone)]
pub struct InputCommandGroup {
    name: String,
    members: Vec<InputCommand>,
}

impl InputCommandGroup {
    /// # Panics
    ///
    /// Panics on an empty group name.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        assert!(!name.is_empty(), "group name must not be empty");
        Self {
            name,
            members: Vec::new(),
        }
    }

    pub fn with_members(
        name: impl Into<String>,
        members: impl IntoIterator<Item = InputCommand>,
    ) -> Self {
        let mut group = Self::new(name);
        for member in members {
            group.add_member(member);
        }
        group
    }

    /// Appends `command` unless already a member.
    pub fn add_member(&mut self, command: InputCommand) {
        if !self.has_member(&command) {
            self.members.push(command);
        }
    }

    pub fn has_member(&self, command: &InputCommand) -> bool {
        self.members.contains(command)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn members(&self) -> &[InputCommand] {
        &self.members
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_is_the_identifier() {
        let plain = InputCommand::new("fire");
        let renamed = InputCommand::named("Fire!", "fire").with_description("primary weapon");
        assert_eq!(plain, renamed);
        assert_eq!(renamed.description(), Some("primary weapon"));
    }

    #[test]
    fn groups_keep_members_unique_and_ordered() {
        let mut group = InputCommandGroup::new("movement");
        group.add_member(InputCommand::new("up"));
        group.add_member(InputCommand::new("down"));
        group.add_member(InputCommand::new("up"));
        assert_eq!(group.members().len(), 2);
        assert_eq!(group.members()[0].identifier(), "up");
        assert_eq!(group.members()[1].identifier(), "down");
    }

    #[test]
    #[should_panic(expected = "command identifier must not be empty")]
    fn empty_identifier_is_fatal() {
        let _ = InputCommand::named("ok", "");
    }
}
