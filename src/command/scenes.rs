//! Scene recall execution
//!
//! Scene recall has no per-device inverse on the processor, so no snapshots
//! are captured and a recalled scene cannot be undone.

use super::{CommandExecutor, FamilyOutcome};
use crate::history::CommandDetails;
use crate::matching::find_scene;
use crate::model::TopologySnapshot;

pub(super) async fn execute(
    executor: &CommandExecutor,
    scene_name: &str,
    room: Option<&str>,
    topology: &TopologySnapshot,
) -> FamilyOutcome {
    let Some(scene) = find_scene(scene_name, room, topology) else {
        return FamilyOutcome::read_only(
            format!("I couldn't find a scene named \"{scene_name}\"."),
            CommandDetails {
                total_devices: 0,
                changed_devices: 0,
                target: room.unwrap_or("the whole house").to_string(),
                failed_devices: Vec::new(),
            },
        );
    };

    let recalled = executor
        .client()
        .recall_scene(&scene.id)
        .await
        .unwrap_or(false);

    let mut details = CommandDetails {
        total_devices: 1,
        changed_devices: 1,
        target: room.unwrap_or("the whole house").to_string(),
        failed_devices: Vec::new(),
    };
    if !recalled {
        details.failed_devices.push(scene.id.clone());
    }

    FamilyOutcome::read_only(format!("Recalled the {} scene.", scene.name), details)
}
