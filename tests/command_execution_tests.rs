//! End-to-end command execution against the mock controller

mod common;

use common::hydrated_harness;
use crestron_home_core::intent::{
    ClimateAction, CommandAction, LightAction, MediaAction, StatusKind, TargetHints,
};
use crestron_home_core::mock::RecordedCommand;
use crestron_home_core::model::{ThermostatMode, MAX_LIGHT_LEVEL};

#[tokio::test]
async fn kitchen_brightness_skips_lights_already_there() {
    let h = hydrated_harness().await;
    let action = CommandAction::Light {
        action: LightAction::SetBrightness { brightness: 50 },
        target: TargetHints::room("Kitchen"),
    };

    let executed = h
        .core
        .submit_command("set kitchen lights to 50%", &action)
        .await
        .unwrap();

    // l2 already sits at 50%; only the other two kitchen lights change
    assert_eq!(executed.response, "Set 2 lights in Kitchen to 50% brightness.");
    assert_eq!(executed.details.total_devices, 3);
    assert_eq!(executed.details.changed_devices, 2);
    assert!(executed.details.failed_devices.is_empty());

    let commands = h.client.commands();
    assert_eq!(commands.len(), 2);
    assert!(h.client.commands_for("l2").is_empty());
    assert!(matches!(
        h.client.commands_for("l1")[0],
        RecordedCommand::Light {
            level: Some(32768),
            is_on: Some(true),
            ..
        }
    ));

    let topology = h.core.topology().await;
    let pendant = topology.lights.iter().find(|l| l.id == "l1").unwrap();
    assert!(pendant.is_on);
    assert_eq!(pendant.level, 32768);
}

#[tokio::test]
async fn zero_match_reports_and_dispatches_nothing() {
    let h = hydrated_harness().await;
    let action = CommandAction::Light {
        action: LightAction::Off,
        target: TargetHints::room("Garage"),
    };

    let executed = h.core.submit_command("garage lights off", &action).await.unwrap();
    assert_eq!(
        executed.response,
        "I couldn't find any lights matching \"Garage\"."
    );
    assert_eq!(executed.details.total_devices, 0);
    assert!(executed.snapshots.is_empty());
    assert!(h.client.commands().is_empty());
}

#[tokio::test]
async fn already_on_is_a_no_op() {
    let h = hydrated_harness().await;
    let action = CommandAction::Light {
        action: LightAction::On,
        target: TargetHints::room("Master Bedroom"),
    };

    let executed = h.core.submit_command("bedroom lights on", &action).await.unwrap();
    assert_eq!(
        executed.response,
        "All 1 lights in Master Bedroom were already on."
    );
    assert!(executed.snapshots.is_empty());
    assert!(h.client.commands().is_empty());
}

#[tokio::test]
async fn single_device_gets_singular_phrasing() {
    let h = hydrated_harness().await;
    let action = CommandAction::Light {
        action: LightAction::On,
        target: TargetHints {
            room: Some("Kitchen".to_string()),
            device_name: Some("Pendant".to_string()),
            ..TargetHints::default()
        },
    };

    let executed = h.core.submit_command("pendant on", &action).await.unwrap();
    assert_eq!(executed.response, "Turned on Kitchen Pendant.");
    assert_eq!(
        h.client.commands(),
        vec![RecordedCommand::Light {
            id: "l1".to_string(),
            level: Some(MAX_LIGHT_LEVEL),
            is_on: Some(true),
        }]
    );
}

#[tokio::test]
async fn area_alias_resolves_to_floor() {
    let h = hydrated_harness().await;
    let action = CommandAction::Light {
        action: LightAction::Off,
        target: TargetHints::area("upstairs"),
    };

    let executed = h.core.submit_command("upstairs off", &action).await.unwrap();
    // l4 is the only upstairs light and it is on
    assert_eq!(executed.response, "Turned off Bedside Lamp.");
    assert_eq!(h.client.commands_for("l4").len(), 1);
}

#[tokio::test]
async fn setter_failure_lands_in_failed_devices() {
    let h = hydrated_harness().await;
    h.client.fail_device("l1");
    let action = CommandAction::Light {
        action: LightAction::On,
        target: TargetHints::room("Kitchen"),
    };

    let executed = h.core.submit_command("kitchen on", &action).await.unwrap();
    // Response stays optimistic; the failure is recorded in the details
    assert_eq!(executed.response, "Turned on 2 of 3 lights in Kitchen.");
    assert_eq!(executed.details.failed_devices, vec!["l1".to_string()]);
}

#[tokio::test]
async fn climate_set_temperature() {
    let h = hydrated_harness().await;
    let action = CommandAction::Climate {
        action: ClimateAction::SetTemperature { temperature: 72.0 },
        target: TargetHints::room("Kitchen"),
    };

    let executed = h.core.submit_command("kitchen to 72", &action).await.unwrap();
    assert_eq!(executed.response, "Set 1 thermostat in Kitchen to 72°F.");

    // t3 is off, so both setpoints move
    assert_eq!(
        h.client.commands_for("t3"),
        vec![RecordedCommand::ThermostatSetPoint {
            id: "t3".to_string(),
            heat: Some(72.0),
            cool: Some(72.0),
        }]
    );
    let topology = h.core.topology().await;
    let kitchen = topology.thermostats.iter().find(|t| t.id == "t3").unwrap();
    assert_eq!(kitchen.heat_set_point, 72.0);
}

#[tokio::test]
async fn climate_mode_change_drives_mode_setter() {
    let h = hydrated_harness().await;
    let action = CommandAction::Climate {
        action: ClimateAction::SetMode {
            mode: ThermostatMode::Cool,
        },
        target: TargetHints::room("Kitchen"),
    };

    let executed = h.core.submit_command("kitchen to cool", &action).await.unwrap();
    assert_eq!(executed.response, "Set 1 thermostat in Kitchen to cool mode.");
    assert_eq!(
        h.client.commands_for("t3"),
        vec![RecordedCommand::ThermostatMode {
            id: "t3".to_string(),
            mode: ThermostatMode::Cool,
        }]
    );
}

#[tokio::test]
async fn media_volume_and_source() {
    let h = hydrated_harness().await;

    let volume = CommandAction::Media {
        action: MediaAction::SetVolume { volume: 50 },
        target: TargetHints::room("Living Room"),
    };
    let executed = h.core.submit_command("volume 50", &volume).await.unwrap();
    assert_eq!(executed.response, "Set volume to 50% in 1 media room.");
    assert_eq!(
        h.client.commands_for("m1"),
        vec![RecordedCommand::MediaVolume {
            id: "m1".to_string(),
            volume_percent: 50,
        }]
    );

    let source = CommandAction::Media {
        action: MediaAction::SelectSource {
            source: "apple tv".to_string(),
        },
        target: TargetHints::room("Living Room"),
    };
    let executed = h.core.submit_command("switch to apple tv", &source).await.unwrap();
    assert_eq!(executed.response, "Switched 1 media room to apple tv.");
    assert_eq!(
        h.client.commands_for("m1").last().unwrap(),
        &RecordedCommand::MediaSource {
            id: "m1".to_string(),
            provider_id: "p2".to_string(),
        }
    );
}

#[tokio::test]
async fn scene_recall_by_name() {
    let h = hydrated_harness().await;
    let action = CommandAction::Scene {
        scene_name: "cooking".to_string(),
        room: Some("Kitchen".to_string()),
    };

    let executed = h.core.submit_command("start cooking scene", &action).await.unwrap();
    assert_eq!(executed.response, "Recalled the Cooking scene.");
    assert_eq!(
        h.client.commands(),
        vec![RecordedCommand::SceneRecall {
            id: "s2".to_string()
        }]
    );
    // Scenes are not undoable
    assert!(executed.snapshots.is_empty());
}

#[tokio::test]
async fn unknown_scene_reports_not_found() {
    let h = hydrated_harness().await;
    let action = CommandAction::Scene {
        scene_name: "Party".to_string(),
        room: None,
    };
    let executed = h.core.submit_command("party scene", &action).await.unwrap();
    assert_eq!(executed.response, "I couldn't find a scene named \"Party\".");
    assert!(h.client.commands().is_empty());
}

#[tokio::test]
async fn status_query_lists_lit_lights() {
    let h = hydrated_harness().await;
    let action = CommandAction::Status {
        kind: StatusKind::Lights,
        target: TargetHints::room("Kitchen"),
    };

    let executed = h.core.submit_command("kitchen light status", &action).await.unwrap();
    assert_eq!(
        executed.response,
        "1 of 3 lights on in Kitchen:\n• Kitchen Island (50%)"
    );
    assert!(h.client.commands().is_empty());
    assert!(executed.snapshots.is_empty());
}

#[tokio::test]
async fn whole_house_status_breaks_down_by_area() {
    let h = hydrated_harness().await;
    let action = CommandAction::Status {
        kind: StatusKind::Lights,
        target: TargetHints::all(),
    };

    let executed = h.core.submit_command("light status", &action).await.unwrap();
    let lines: Vec<&str> = executed.response.lines().collect();
    assert_eq!(lines[0], "2 of 5 lights are on:");
    assert!(lines.contains(&"• 2nd Floor: 1 lights - Master Bedroom (1)"));
    assert!(lines.contains(&"• 1st Floor: 1 lights - Kitchen (1)"));
}

#[tokio::test]
async fn door_lock_patches_cache_and_dispatches() {
    let h = hydrated_harness().await;
    let ok = h.core.set_door_lock("d1", false).await.unwrap();
    assert!(ok);
    assert_eq!(
        h.client.commands(),
        vec![RecordedCommand::DoorLock {
            id: "d1".to_string(),
            is_locked: false,
        }]
    );
    let topology = h.core.topology().await;
    assert!(!topology.door_locks[0].is_locked);
}
