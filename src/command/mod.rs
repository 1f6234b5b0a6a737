//! Command executor
//!
//! Applies a structured intent to the matched devices: resolve targets, skip
//! devices already at the requested value, capture undo snapshots, dispatch
//! the remote setters concurrently, patch the cache optimistically, and
//! produce a deterministic natural-language summary.

pub mod climate;
pub mod lights;
pub mod media;
pub mod response;
pub mod scenes;
pub mod status;

use crate::cache::DeviceCache;
use crate::client::ControllerClient;
use crate::error::Result;
use crate::history::{CommandDetails, CommandHistory, DeviceStateSnapshot, ExecutedCommand};
use crate::intent::CommandAction;
use crate::model::TopologySnapshot;
use futures::future::join_all;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Result of executing one action family
pub(crate) struct FamilyOutcome {
    pub response: String,
    pub snapshots: Vec<DeviceStateSnapshot>,
    pub details: CommandDetails,
}

impl FamilyOutcome {
    /// Outcome for a read-only or zero-match command
    pub(crate) fn read_only(response: String, details: CommandDetails) -> Self {
        Self {
            response,
            snapshots: Vec::new(),
            details,
        }
    }
}

/// Outcome of an undo attempt
#[derive(Debug, Clone, PartialEq)]
pub struct UndoOutcome {
    pub success: bool,
    pub message: String,
}

impl UndoOutcome {
    fn nothing_to_undo() -> Self {
        Self {
            success: false,
            message: "No undo data available for this command.".to_string(),
        }
    }
}

/// Executes structured intents against the controller and the cache
pub struct CommandExecutor {
    client: Arc<dyn ControllerClient>,
    cache: Arc<DeviceCache>,
    history: Arc<CommandHistory>,
}

impl CommandExecutor {
    /// Create an executor over the given collaborators
    pub fn new(
        client: Arc<dyn ControllerClient>,
        cache: Arc<DeviceCache>,
        history: Arc<CommandHistory>,
    ) -> Self {
        Self {
            client,
            cache,
            history,
        }
    }

    /// Execute one intent and record it in the history
    pub async fn submit(&self, input: &str, action: &CommandAction) -> Result<ExecutedCommand> {
        let topology = self.cache.snapshot().await;
        let outcome = self.dispatch(action, &topology).await;

        let command = ExecutedCommand {
            id: Uuid::new_v4(),
            input: input.to_string(),
            response: outcome.response,
            snapshots: outcome.snapshots,
            details: outcome.details,
            undone: false,
            undo_pending: false,
            executed_at: chrono::Utc::now(),
        };

        info!(
            command = %command.id,
            changed = command.details.changed_devices,
            total = command.details.total_devices,
            "executed command"
        );
        if !command.details.failed_devices.is_empty() {
            warn!(
                command = %command.id,
                failed = ?command.details.failed_devices,
                "some device setters reported failure"
            );
        }

        self.history.record(command.clone()).await;
        Ok(command)
    }

    async fn dispatch(&self, action: &CommandAction, topology: &TopologySnapshot) -> FamilyOutcome {
        match action {
            CommandAction::Light { action, target } => {
                lights::execute(self, action, target, topology).await
            }
            CommandAction::Climate { action, target } => {
                climate::execute(self, action, target, topology).await
            }
            CommandAction::Media { action, target } => {
                media::execute(self, action, target, topology).await
            }
            CommandAction::Scene { scene_name, room } => {
                scenes::execute(self, scene_name, room.as_deref(), topology).await
            }
            CommandAction::Status { kind, target } => {
                status::execute(*kind, target, topology)
            }
        }
    }

    /// Undo a previously executed command by replaying its snapshots
    ///
    /// Replays run through the same setter dispatch path as commands, with
    /// snapshot capture skipped. The claim on the command is taken atomically,
    /// so concurrent undo attempts replay at most once; the command is marked
    /// undone only when every replay dispatch succeeded, and repeated undo is
    /// a no-op.
    pub async fn undo(&self, command_id: Uuid) -> Result<UndoOutcome> {
        let Some(snapshots) = self.history.claim_for_undo(command_id).await else {
            return Ok(UndoOutcome::nothing_to_undo());
        };

        let replays = snapshots.iter().map(|snapshot| self.replay(snapshot));
        let results = join_all(replays).await;

        let failed: Vec<&str> = snapshots
            .iter()
            .zip(&results)
            .filter(|(_, ok)| !**ok)
            .map(|(s, _)| s.device_id())
            .collect();

        self.history.finish_undo(command_id, failed.is_empty()).await;

        if failed.is_empty() {
            info!(command = %command_id, devices = snapshots.len(), "command undone");
            Ok(UndoOutcome {
                success: true,
                message: format!("Undid the last command ({} devices restored).", snapshots.len()),
            })
        } else {
            warn!(command = %command_id, failed = ?failed, "undo dispatch failed");
            Ok(UndoOutcome {
                success: false,
                message: "Failed to undo command.".to_string(),
            })
        }
    }

    /// Replay one snapshot's previous values to the controller and the cache
    async fn replay(&self, snapshot: &DeviceStateSnapshot) -> bool {
        match snapshot {
            DeviceStateSnapshot::Light { id, level, is_on } => {
                self.cache
                    .update_light(id, |light| {
                        light.level = *level;
                        light.is_on = *is_on;
                    })
                    .await;
                self.client
                    .set_light(id, Some(*level), Some(*is_on))
                    .await
                    .unwrap_or(false)
            }
            DeviceStateSnapshot::Thermostat {
                id,
                mode,
                heat_set_point,
                cool_set_point,
                fan_mode,
            } => {
                self.cache
                    .update_thermostat(id, |t| {
                        t.mode = *mode;
                        t.heat_set_point = *heat_set_point;
                        t.cool_set_point = *cool_set_point;
                        t.fan_mode = *fan_mode;
                    })
                    .await;
                let mode_ok = self
                    .client
                    .set_thermostat_mode(id, *mode)
                    .await
                    .unwrap_or(false);
                let points_ok = self
                    .client
                    .set_thermostat_set_point(id, Some(*heat_set_point), Some(*cool_set_point))
                    .await
                    .unwrap_or(false);
                let fan_ok = self
                    .client
                    .set_thermostat_fan_mode(id, *fan_mode)
                    .await
                    .unwrap_or(false);
                mode_ok && points_ok && fan_ok
            }
            DeviceStateSnapshot::MediaRoom {
                id,
                is_powered_on,
                volume_percent,
                is_muted,
                current_provider_id,
            } => {
                self.cache
                    .update_media_room(id, |m| {
                        m.is_powered_on = *is_powered_on;
                        m.volume_percent = *volume_percent;
                        m.is_muted = *is_muted;
                        m.current_provider_id = current_provider_id.clone();
                    })
                    .await;
                let power_ok = self
                    .client
                    .set_media_room_power(id, *is_powered_on)
                    .await
                    .unwrap_or(false);
                let volume_ok = self
                    .client
                    .set_media_room_volume(id, *volume_percent)
                    .await
                    .unwrap_or(false);
                let mute_ok = self
                    .client
                    .set_media_room_mute(id, *is_muted)
                    .await
                    .unwrap_or(false);
                let source_ok = match current_provider_id {
                    Some(provider) => self
                        .client
                        .set_media_room_source(id, provider)
                        .await
                        .unwrap_or(false),
                    None => true,
                };
                power_ok && volume_ok && mute_ok && source_ok
            }
        }
    }

    pub(crate) fn client(&self) -> &dyn ControllerClient {
        self.client.as_ref()
    }

    pub(crate) fn cache(&self) -> &DeviceCache {
        self.cache.as_ref()
    }
}
