//! Interactive assignment: group exclusivity, device locking, cursor walk,
//! submit gating.

mod common;

use common::{scripted_gateway, test_pad};
use opengate::assign::{InteractiveAssignment, RequiredCommands};
use opengate::controller::{GatedInputSelector, InputCommand, InputCommandGroup};
use opengate::device::InputValueRange;
use std::time::Duration;

fn command(id: &str) -> InputCommand {
    InputCommand::new(id)
}

fn selector(device_id: &str, input_id: &str) -> GatedInputSelector {
    GatedInputSelector::new(
        device_id,
        input_id,
        input_id,
        InputValueRange::digital(1.0),
    )
}

/// Groups: A = [left, right, shared], B = [shared, other].
fn exclusivity_session() -> (InteractiveAssignment, String) {
    let (_source, gateway) = scripted_gateway(vec![test_pad()]);
    let device_id = gateway.devices().remove(0).identifier().to_string();
    let group_a = InputCommandGroup::with_members(
        "a",
        [command("left"), command("right"), command("shared")],
    );
    let group_b = InputCommandGroup::with_members("b", [command("shared"), command("other")]);
    let session = InteractiveAssignment::new(&gateway, vec![group_a, group_b], None, None);
    (session, device_id)
}

#[tokio::test]
async fn commands_are_deduplicated_across_groups_in_order() {
    let (session, _) = exclusivity_session();
    let identifiers: Vec<&str> = session
        .unique_commands()
        .iter()
        .map(|command| command.identifier())
        .collect();
    assert_eq!(identifiers, vec!["left", "right", "shared", "other"]);
}

#[tokio::test]
async fn fellow_group_members_reject_a_taken_input() {
    let (session, device_id) = exclusivity_session();
    let taken = selector(&device_id, "button.south");

    assert!(session.propose_assignment(taken.clone()));
    assert!(session.is_command_assigned(&command("left")));

    // "right" shares group A with "left": same physical input is rejected.
    session.move_to_command(&command("right"));
    assert!(!session.propose_assignment(taken.clone()));
    assert!(!session.is_command_assigned(&command("right")));

    // "other" shares no group with "left": reuse is allowed.
    session.move_to_command(&command("other"));
    assert!(session.propose_assignment(taken.clone()));
    assert!(session.is_command_assigned(&command("other")));
}

#[tokio::test]
async fn first_assignment_locks_the_device() {
    let (session, device_id) = exclusivity_session();

    assert!(session.propose_assignment(selector(&device_id, "button.south")));
    assert_eq!(session.device_identifier(), Some(device_id.clone()));

    // A different device is rejected for the rest of the session.
    session.move_to_command(&command("right"));
    assert!(!session.propose_assignment(selector("dev-other", "button.east")));

    // Same device, different input: fine.
    assert!(session.propose_assignment(selector(&device_id, "button.east")));
}

#[tokio::test]
async fn clearing_the_last_assignment_releases_the_device_lock() {
    let (session, device_id) = exclusivity_session();
    assert!(session.propose_assignment(selector(&device_id, "button.south")));

    session.move_to_command(&command("left"));
    session.clear_current_command_assignment();
    assert!(!session.has_assignments());
    assert_eq!(session.device_identifier(), None);

    // A different device may now open the session.
    assert!(session.propose_assignment(selector("dev-other", "button.east")));
    assert_eq!(session.device_identifier(), Some("dev-other".to_string()));
}

#[tokio::test]
async fn identical_reassignment_is_a_no_op() {
    let (session, device_id) = exclusivity_session();
    let binding = selector(&device_id, "button.south");
    assert!(session.propose_assignment(binding.clone()));
    session.move_to_command(&command("left"));
    assert!(!session.propose_assignment(binding));
}

#[tokio::test]
async fn cursor_rolls_wrap_and_respect_required_commands() {
    let (_source, gateway) = scripted_gateway(vec![test_pad()]);
    let device_id = gateway.devices().remove(0).identifier().to_string();
    let group = InputCommandGroup::with_members(
        "main",
        [command("up"), command("down"), command("fire")],
    );
    let session = InteractiveAssignment::new(&gateway, vec![group], None, None).with_required(
        RequiredCommands::from_identifiers(["up".to_string(), "down".to_string()]),
    );

    // Rolling forward from the last command cannot land on end while required
    // commands are missing.
    session.move_to_last_command();
    session.roll_to_next_command();
    assert_eq!(
        session.current_command().unwrap().identifier(),
        "up",
        "end unreachable, wraps to the first command"
    );

    assert!(session.propose_assignment(selector(&device_id, "button.south")));
    assert_eq!(session.current_command().unwrap().identifier(), "down");

    assert!(session.propose_assignment(selector(&device_id, "button.east")));
    // Auto-advance lands on the next unassigned command.
    assert_eq!(session.current_command().unwrap().identifier(), "fire");

    // With every required command assigned, rolling from the last position
    // reaches the end.
    session.roll_to_next_command();
    assert!(session.is_at_end());
    assert!(session.current_command().is_none());

    session.roll_to_next_command();
    assert_eq!(session.current_command().unwrap().identifier(), "up");

    // Rolling backward from the first command reaches the end too, now that
    // every required command is assigned.
    session.roll_to_previous_command();
    assert!(session.is_at_end());
    session.roll_to_previous_command();
    assert_eq!(session.current_command().unwrap().identifier(), "fire");
}

#[tokio::test]
async fn joystick_vocabulary_walks_like_any_command_set() {
    let (_source, gateway) = scripted_gateway(vec![test_pad()]);
    let device_id = gateway.devices().remove(0).identifier().to_string();
    let session = InteractiveAssignment::new(
        &gateway,
        opengate::controller::joystick::standard_groups(),
        None,
        None,
    );

    assert_eq!(session.unique_commands().len(), 8);
    assert_eq!(
        session.current_command().unwrap().identifier(),
        "joystick.up"
    );

    assert!(session.propose_assignment(selector(&device_id, "button.north")));
    assert_eq!(
        session.current_command().unwrap().identifier(),
        "joystick.down"
    );

    // Directions exclude each other's inputs; an action command may reuse one.
    assert!(!session.propose_assignment(selector(&device_id, "button.north")));
    session.move_to_command(&opengate::controller::joystick::primary_fire());
    assert!(session.propose_assignment(selector(&device_id, "button.north")));
}

#[tokio::test(start_paused = true)]
async fn submit_requires_end_position_required_commands_and_a_quiet_tuner() {
    let (source, gateway) = scripted_gateway(vec![test_pad()]);
    let device = gateway.devices().remove(0);
    let device_id = device.identifier().to_string();
    let group = InputCommandGroup::with_members(
        "main",
        [command("up"), command("down"), command("fire")],
    );
    let session = InteractiveAssignment::new(&gateway, vec![group], None, None).with_required(
        RequiredCommands::from_identifiers(["up".to_string(), "down".to_string()]),
    );

    assert!(!session.can_submit(), "stopped session cannot submit");
    session.start_interaction();
    assert!(!session.can_submit(), "tuner opens in a silence wait");

    // Let the opening silence pass.
    tokio::time::sleep(Duration::from_millis(500)).await;

    assert!(session.propose_assignment(selector(&device_id, "button.south")));
    assert!(session.propose_assignment(selector(&device_id, "button.east")));
    assert!(!session.can_submit(), "not at the end position yet");

    session.move_to_end();
    assert!(session.can_submit(), "optional command may stay unassigned");
    assert!(session.submit());

    // A tuner-driven capture re-arms the silence debounce and blocks submit
    // until quiet.
    session.move_to_command(&command("fire"));
    let north = device.input_with_identifier("button.north").unwrap();
    source.push_value(&north, 1.0);
    gateway.poll_externally();
    assert!(session.is_command_assigned(&command("fire")));
    session.move_to_end();
    assert!(!session.can_submit(), "mid-silence-wait blocks submit");

    tokio::time::sleep(Duration::from_millis(400)).await;
    assert!(session.can_submit());
    session.stop_interaction();
}

#[tokio::test(start_paused = true)]
async fn tuned_gestures_assign_to_the_current_command() {
    let (source, gateway) = scripted_gateway(vec![test_pad()]);
    let device = gateway.devices().remove(0);
    let group = InputCommandGroup::with_members("main", [command("up"), command("down")]);
    let session = InteractiveAssignment::new(&gateway, vec![group], None, None);

    session.start_interaction();
    tokio::time::sleep(Duration::from_millis(500)).await;

    // Push the X axis hard: tuned as the positive half-range for "up".
    let axis = device.input_with_identifier("axis.x").unwrap();
    source.push_value(&axis, 0.9);
    gateway.poll_externally();

    let assignment = session.assignment_of(&command("up")).expect("assigned");
    let threshold = 1.0 - opengate::tuner::DEFAULT_ANALOG_SENSITIVITY;
    assert_eq!(
        assignment.firing_range(),
        InputValueRange::analog(threshold, 1.0).unwrap()
    );
    assert_eq!(session.current_command().unwrap().identifier(), "down");

    // The trailing gesture is debounced, not captured for "down".
    source.push_value(&axis, 0.95);
    gateway.poll_externally();
    assert!(!session.is_command_assigned(&command("down")));

    session.stop_interaction();
}

#[tokio::test]
async fn build_emits_one_context_per_group_with_assigned_members_only() {
    let (session, device_id) = exclusivity_session();
    assert!(session.propose_assignment(selector(&device_id, "button.south")));
    session.move_to_command(&command("shared"));
    assert!(session.propose_assignment(selector(&device_id, "button.north")));

    let configuration = session.with_controller_name("Test rig").build();
    assert_eq!(configuration.device_id, device_id);
    assert_eq!(configuration.controller_name, "Test rig");
    assert_eq!(configuration.contexts.len(), 2);

    let context_a = &configuration.contexts[0];
    assert_eq!(context_a.context_id, "a");
    let bound: Vec<&str> = context_a
        .commands
        .iter()
        .map(|binding| binding.command_id.as_str())
        .collect();
    assert_eq!(bound, vec!["left", "shared"]);

    let context_b = &configuration.contexts[1];
    assert_eq!(context_b.context_id, "b");
    assert_eq!(context_b.commands.len(), 1);
    assert_eq!(context_b.commands[0].command_id, "shared");
}

#[tokio::test]
async fn reset_to_seeds_assignments_and_rolls_to_first_unassigned() {
    let (session, device_id) = exclusivity_session();
    assert!(session.propose_assignment(selector(&device_id, "button.south")));
    session.move_to_command(&command("right"));
    assert!(session.propose_assignment(selector(&device_id, "button.east")));
    let configuration = session.build();

    let (fresh, _) = exclusivity_session();
    fresh.reset_to(&configuration);
    assert!(fresh.is_command_assigned(&command("left")));
    assert!(fresh.is_command_assigned(&command("right")));
    assert_eq!(fresh.device_identifier(), Some(device_id));
    assert_eq!(fresh.current_command().unwrap().identifier(), "shared");
}

#[tokio::test]
async fn sensitivity_changes_follow_into_analog_assignments() {
    let (session, device_id) = exclusivity_session();
    let analog = GatedInputSelector::new(
        &device_id,
        "axis.x",
        "X axis",
        InputValueRange::analog(0.4, 1.0).unwrap(),
    );
    assert!(session.propose_assignment(analog));

    session.change_analog_sensitivity(0.25).unwrap();
    let updated = session.assignment_of(&command("left")).unwrap();
    assert_eq!(
        updated.firing_range(),
        InputValueRange::analog(0.75, 1.0).unwrap()
    );
}
