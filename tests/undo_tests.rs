//! Undo snapshot capture and replay

mod common;

use common::hydrated_harness;
use crestron_home_core::intent::{CommandAction, LightAction, MediaAction, TargetHints};
use crestron_home_core::mock::RecordedCommand;
use uuid::Uuid;

#[tokio::test]
async fn undo_restores_previous_light_state() {
    let h = hydrated_harness().await;
    let action = CommandAction::Light {
        action: LightAction::Off,
        target: TargetHints::room("Kitchen"),
    };

    // Only l2 is on, so only l2 is snapshotted
    let executed = h.core.submit_command("kitchen off", &action).await.unwrap();
    assert_eq!(executed.snapshots.len(), 1);

    let topology = h.core.topology().await;
    let island = topology.lights.iter().find(|l| l.id == "l2").unwrap();
    assert!(!island.is_on);
    assert_eq!(island.level, 0);

    let undone = h.core.undo_command(executed.id).await.unwrap();
    assert!(undone);

    // Replay dispatched the prior level and power state
    assert_eq!(
        h.client.commands_for("l2").last().unwrap(),
        &RecordedCommand::Light {
            id: "l2".to_string(),
            level: Some(32768),
            is_on: Some(true),
        }
    );
    let topology = h.core.topology().await;
    let island = topology.lights.iter().find(|l| l.id == "l2").unwrap();
    assert!(island.is_on);
    assert_eq!(island.level, 32768);
}

#[tokio::test]
async fn undo_is_single_shot() {
    let h = hydrated_harness().await;
    let action = CommandAction::Light {
        action: LightAction::Off,
        target: TargetHints::room("Kitchen"),
    };
    let executed = h.core.submit_command("kitchen off", &action).await.unwrap();

    assert!(h.core.undo_command(executed.id).await.unwrap());
    let replays_after_first = h.client.commands().len();

    // Second undo is a no-op
    assert!(!h.core.undo_command(executed.id).await.unwrap());
    assert_eq!(h.client.commands().len(), replays_after_first);
}

#[tokio::test]
async fn concurrent_undo_replays_at_most_once() {
    let h = hydrated_harness().await;
    let action = CommandAction::Light {
        action: LightAction::Off,
        target: TargetHints::room("Kitchen"),
    };
    let executed = h.core.submit_command("kitchen off", &action).await.unwrap();
    let dispatched_before = h.client.commands().len();

    // Only one of the two racing undos may claim the snapshots and replay
    let (first, second) = tokio::join!(
        h.core.undo_command(executed.id),
        h.core.undo_command(executed.id),
    );
    assert!(first.unwrap() ^ second.unwrap());
    assert_eq!(h.client.commands().len(), dispatched_before + 1);
}

#[tokio::test]
async fn undo_of_unknown_command_is_refused() {
    let h = hydrated_harness().await;
    assert!(!h.core.undo_command(Uuid::new_v4()).await.unwrap());
    assert!(h.client.commands().is_empty());
}

#[tokio::test]
async fn read_only_command_has_nothing_to_undo() {
    let h = hydrated_harness().await;
    let action = CommandAction::Light {
        action: LightAction::On,
        target: TargetHints::room("Master Bedroom"),
    };
    // Already on, nothing changed, nothing snapshotted
    let executed = h.core.submit_command("bedroom on", &action).await.unwrap();
    assert!(!h.core.undo_command(executed.id).await.unwrap());
}

#[tokio::test]
async fn failed_replay_leaves_command_undoable() {
    let h = hydrated_harness().await;
    let action = CommandAction::Light {
        action: LightAction::Off,
        target: TargetHints::room("Kitchen"),
    };
    let executed = h.core.submit_command("kitchen off", &action).await.unwrap();

    h.client.fail_device("l2");
    assert!(!h.core.undo_command(executed.id).await.unwrap());

    // The command is not marked undone, so its snapshots survive
    let kept = h.core.history().get(executed.id).await.unwrap();
    assert!(!kept.undone);
    assert_eq!(kept.snapshots.len(), 1);
}

#[tokio::test]
async fn media_undo_restores_volume_and_source() {
    let h = hydrated_harness().await;
    let action = CommandAction::Media {
        action: MediaAction::SelectSource {
            source: "Apple TV".to_string(),
        },
        target: TargetHints::room("Living Room"),
    };
    let executed = h.core.submit_command("apple tv", &action).await.unwrap();

    let topology = h.core.topology().await;
    assert_eq!(
        topology.media_rooms[0].current_provider_id.as_deref(),
        Some("p2")
    );

    assert!(h.core.undo_command(executed.id).await.unwrap());
    let topology = h.core.topology().await;
    assert_eq!(
        topology.media_rooms[0].current_provider_id.as_deref(),
        Some("p1")
    );
    assert_eq!(
        h.client.commands_for("m1").last().unwrap(),
        &RecordedCommand::MediaSource {
            id: "m1".to_string(),
            provider_id: "p1".to_string(),
        }
    );
}
