//! Configuration round trips and controller materialization.

mod common;

use common::{scripted_gateway, test_pad, CommandRecorder};
use opengate::controller::{
    CommandBinding, CommandRepeater, ContextConfiguration, ControllerConfiguration,
    ControllerError, ControllerKind, InputControllerListener,
};
use std::sync::Arc;

fn pad_configuration(device_id: &str) -> ControllerConfiguration {
    let mut configuration =
        ControllerConfiguration::new(ControllerKind::Gated, "Player 1", device_id);
    let mut in_game = ContextConfiguration::new("in-game");
    in_game.commands.push(CommandBinding {
        command_id: "fire".into(),
        command_name: "Fire".into(),
        input_id: "button.south".into(),
        input_name: "South button".into(),
        firing_range_low: 1.0,
        firing_range_high: None,
    });
    in_game.commands.push(CommandBinding {
        command_id: "right".into(),
        command_name: "Right".into(),
        input_id: "axis.x".into(),
        input_name: "X axis".into(),
        firing_range_low: 0.5,
        firing_range_high: Some(1.0),
    });
    let mut menu = ContextConfiguration::new("menu");
    menu.commands.push(CommandBinding {
        command_id: "confirm".into(),
        command_name: "Confirm".into(),
        input_id: "button.south".into(),
        input_name: "South button".into(),
        firing_range_low: 1.0,
        firing_range_high: None,
    });
    configuration.add_context(in_game);
    configuration.add_context(menu);
    configuration
}

#[tokio::test]
async fn missing_device_surfaces_as_a_named_configuration_error() {
    let (_source, gateway) = scripted_gateway(vec![test_pad()]);
    let repeater = CommandRepeater::new();
    let configuration = pad_configuration("dev-unplugged");

    let error = configuration.build(&gateway, &repeater).unwrap_err();
    assert!(
        error.to_string().contains("dev-unplugged"),
        "error must name the missing device, got: {error}"
    );
    match error {
        opengate::controller::ConfigError::Controller(ControllerError::DeviceNotFound(id)) => {
            assert_eq!(id, "dev-unplugged");
        }
        other => panic!("unexpected error kind: {other:?}"),
    }
}

#[tokio::test]
async fn built_controllers_route_events_per_the_configuration() {
    let (source, gateway) = scripted_gateway(vec![test_pad()]);
    let repeater = CommandRepeater::new();
    let device = gateway.devices().remove(0);
    let configuration = pad_configuration(device.identifier());

    let controller = configuration.build(&gateway, &repeater).unwrap();
    assert_eq!(controller.name(), "Player 1");
    assert_eq!(
        controller.context_identifiers(),
        vec!["in-game".to_string(), "menu".to_string()]
    );
    // The last configured context ends up current.
    assert_eq!(controller.current_context().unwrap().identifier(), "menu");

    let recorder = CommandRecorder::new();
    controller.add_listener(recorder.clone() as Arc<dyn InputControllerListener>);

    let south = device.input_with_identifier("button.south").unwrap();
    source.push_value(&south, 1.0);
    gateway.poll_externally();
    let fires = recorder.fires();
    assert_eq!(fires.len(), 1);
    assert_eq!(fires[0].0, "confirm", "the menu context is active");

    // Switching contexts swaps the command vocabulary.
    controller.switch_context("in-game").unwrap();
    source.push_value(&south, 0.0);
    source.push_value(&south, 1.0);
    gateway.poll_externally();
    let fires = recorder.fires();
    assert_eq!(fires.last().unwrap().0, "fire");

    controller.dispose();
}

#[tokio::test]
async fn unknown_input_in_configuration_names_the_identifier() {
    let (_source, gateway) = scripted_gateway(vec![test_pad()]);
    let repeater = CommandRepeater::new();
    let device = gateway.devices().remove(0);

    let mut configuration =
        ControllerConfiguration::new(ControllerKind::Gated, "P1", device.identifier());
    let mut context = ContextConfiguration::new("main");
    context.commands.push(CommandBinding {
        command_id: "fire".into(),
        command_name: "Fire".into(),
        input_id: "button.missing".into(),
        input_name: "Missing".into(),
        firing_range_low: 1.0,
        firing_range_high: None,
    });
    configuration.add_context(context);

    let error = configuration.build(&gateway, &repeater).unwrap_err();
    assert!(error.to_string().contains("button.missing"));
}

#[tokio::test]
async fn toml_round_trip_then_build() {
    let (_source, gateway) = scripted_gateway(vec![test_pad()]);
    let repeater = CommandRepeater::new();
    let device = gateway.devices().remove(0);
    let configuration = pad_configuration(device.identifier());

    let text = configuration.to_toml().unwrap();
    let parsed = ControllerConfiguration::from_toml(&text).unwrap();
    assert_eq!(parsed, configuration);

    let controller = parsed.build(&gateway, &repeater).unwrap();
    assert_eq!(controller.kind(), ControllerKind::Gated);
    assert!(controller.is_concurrent_firing());
    assert!(controller.is_fast_releasing());
    controller.dispose();
}

#[tokio::test]
async fn disposed_controllers_stop_receiving_events() {
    let (source, gateway) = scripted_gateway(vec![test_pad()]);
    let repeater = CommandRepeater::new();
    let device = gateway.devices().remove(0);
    let configuration = pad_configuration(device.identifier());
    let controller = configuration.build(&gateway, &repeater).unwrap();

    let recorder = CommandRecorder::new();
    controller.add_listener(recorder.clone() as Arc<dyn InputControllerListener>);
    controller.dispose();

    let south = device.input_with_identifier("button.south").unwrap();
    source.push_value(&south, 1.0);
    gateway.poll_externally();
    assert_eq!(recorder.fires().len(), 0);
}
