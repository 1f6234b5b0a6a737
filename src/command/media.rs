//! Media room command execution

use super::{response, CommandExecutor, FamilyOutcome};
use crate::history::{CommandDetails, DeviceStateSnapshot};
use crate::intent::{MediaAction, TargetHints};
use crate::matching::{fuzzy_match, matching_media_rooms};
use crate::model::{MediaRoom, TopologySnapshot};
use futures::future::join_all;

/// Resolve a source hint against a media room's available providers
fn resolve_provider<'a>(media_room: &'a MediaRoom, source: &str) -> Option<&'a str> {
    media_room
        .available_providers
        .iter()
        .find(|p| fuzzy_match(source, &p.name))
        .map(|p| p.id.as_str())
}

fn would_change(action: &MediaAction, media_room: &MediaRoom) -> bool {
    match action {
        MediaAction::PowerOn => !media_room.is_powered_on,
        MediaAction::PowerOff => media_room.is_powered_on,
        MediaAction::SetVolume { volume } => media_room.volume_percent != *volume,
        MediaAction::Mute => !media_room.is_muted,
        MediaAction::Unmute => media_room.is_muted,
        MediaAction::SelectSource { source } => match resolve_provider(media_room, source) {
            Some(provider_id) => media_room.current_provider_id.as_deref() != Some(provider_id),
            // A zone that doesn't offer the source is left alone
            None => false,
        },
    }
}

pub(super) async fn execute(
    executor: &CommandExecutor,
    action: &MediaAction,
    target: &TargetHints,
    topology: &TopologySnapshot,
) -> FamilyOutcome {
    let matched = matching_media_rooms(target, topology);
    let changed: Vec<&MediaRoom> = matched
        .iter()
        .copied()
        .filter(|m| would_change(action, m))
        .collect();

    let mut details = CommandDetails {
        total_devices: matched.len(),
        changed_devices: changed.len(),
        target: response::climate_target(target),
        failed_devices: Vec::new(),
    };

    if matched.is_empty() {
        return FamilyOutcome::read_only(
            response::media_response(action, target, &matched, &changed),
            details,
        );
    }

    let snapshots: Vec<DeviceStateSnapshot> = changed
        .iter()
        .map(|m| DeviceStateSnapshot::MediaRoom {
            id: m.id.clone(),
            is_powered_on: m.is_powered_on,
            volume_percent: m.volume_percent,
            is_muted: m.is_muted,
            current_provider_id: m.current_provider_id.clone(),
        })
        .collect();

    for media_room in &changed {
        let action = action.clone();
        let provider = match &action {
            MediaAction::SelectSource { source } => {
                resolve_provider(media_room, source).map(str::to_string)
            }
            _ => None,
        };
        executor
            .cache()
            .update_media_room(&media_room.id, |m| match action {
                MediaAction::PowerOn => m.is_powered_on = true,
                MediaAction::PowerOff => m.is_powered_on = false,
                MediaAction::SetVolume { volume } => m.volume_percent = volume,
                MediaAction::Mute => m.is_muted = true,
                MediaAction::Unmute => m.is_muted = false,
                MediaAction::SelectSource { .. } => m.current_provider_id = provider,
            })
            .await;
    }

    let dispatches = changed.iter().map(|media_room| {
        let client = executor.client();
        async move {
            match action {
                MediaAction::PowerOn => client
                    .set_media_room_power(&media_room.id, true)
                    .await
                    .unwrap_or(false),
                MediaAction::PowerOff => client
                    .set_media_room_power(&media_room.id, false)
                    .await
                    .unwrap_or(false),
                MediaAction::SetVolume { volume } => client
                    .set_media_room_volume(&media_room.id, *volume)
                    .await
                    .unwrap_or(false),
                MediaAction::Mute => client
                    .set_media_room_mute(&media_room.id, true)
                    .await
                    .unwrap_or(false),
                MediaAction::Unmute => client
                    .set_media_room_mute(&media_room.id, false)
                    .await
                    .unwrap_or(false),
                MediaAction::SelectSource { source } => match resolve_provider(media_room, source) {
                    Some(provider_id) => client
                        .set_media_room_source(&media_room.id, provider_id)
                        .await
                        .unwrap_or(false),
                    None => false,
                },
            }
        }
    });
    let results = join_all(dispatches).await;

    details.failed_devices = changed
        .iter()
        .zip(&results)
        .filter(|(_, ok)| !**ok)
        .map(|(m, _)| m.id.clone())
        .collect();

    FamilyOutcome {
        response: response::media_response(action, target, &matched, &changed),
        snapshots,
        details,
    }
}
