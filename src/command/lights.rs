//! Light command execution

use super::{response, CommandExecutor, FamilyOutcome};
use crate::history::{CommandDetails, DeviceStateSnapshot};
use crate::intent::{LightAction, TargetHints};
use crate::matching::matching_lights;
use crate::model::{level_to_percent, percent_to_level, Light, TopologySnapshot, MAX_LIGHT_LEVEL};
use futures::future::join_all;

/// Target level and power state an action drives a light to
fn requested_state(action: &LightAction) -> (u16, bool) {
    match action {
        LightAction::On => (MAX_LIGHT_LEVEL, true),
        LightAction::Off => (0, false),
        LightAction::SetBrightness { brightness } => {
            let level = percent_to_level(*brightness);
            (level, level > 0)
        }
    }
}

/// Whether the action would actually change this light
fn would_change(action: &LightAction, light: &Light) -> bool {
    match action {
        LightAction::On => !light.is_on,
        LightAction::Off => light.is_on,
        LightAction::SetBrightness { brightness } => level_to_percent(light.level) != *brightness,
    }
}

pub(super) async fn execute(
    executor: &CommandExecutor,
    action: &LightAction,
    target: &TargetHints,
    topology: &TopologySnapshot,
) -> FamilyOutcome {
    let matched = matching_lights(target, topology);
    let changed: Vec<&Light> = matched
        .iter()
        .copied()
        .filter(|light| would_change(action, light))
        .collect();

    let mut details = CommandDetails {
        total_devices: matched.len(),
        changed_devices: changed.len(),
        target: target.describe(),
        failed_devices: Vec::new(),
    };

    if matched.is_empty() {
        return FamilyOutcome::read_only(response::light_response(action, target, &matched, &changed), details);
    }

    // Capture before any mutation
    let snapshots: Vec<DeviceStateSnapshot> = changed
        .iter()
        .map(|light| DeviceStateSnapshot::Light {
            id: light.id.clone(),
            level: light.level,
            is_on: light.is_on,
        })
        .collect();

    let (level, is_on) = requested_state(action);

    // Optimistic patches first, then the remote fan-out
    for light in &changed {
        executor
            .cache()
            .update_light(&light.id, |l| {
                l.level = level;
                l.is_on = is_on;
            })
            .await;
    }

    let dispatches = changed.iter().map(|light| {
        let client = executor.client();
        async move {
            client
                .set_light(&light.id, Some(level), Some(is_on))
                .await
                .unwrap_or(false)
        }
    });
    let results = join_all(dispatches).await;

    details.failed_devices = changed
        .iter()
        .zip(&results)
        .filter(|(_, ok)| !**ok)
        .map(|(light, _)| light.id.clone())
        .collect();

    FamilyOutcome {
        response: response::light_response(action, target, &matched, &changed),
        snapshots,
        details,
    }
}
