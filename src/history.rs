//! Executed-command history and per-device undo snapshots
//!
//! Every mutating command records, per device it touched, exactly the fields
//! the action family can mutate. Undo replays those values through the
//! executor; a command can be undone at most once and the history itself is
//! a bounded in-memory window.

use crate::model::{FanMode, ThermostatMode};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Pre-mutation state for one device, tagged by device family
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum DeviceStateSnapshot {
    #[serde(rename_all = "camelCase")]
    Light { id: String, level: u16, is_on: bool },
    #[serde(rename_all = "camelCase")]
    Thermostat {
        id: String,
        mode: ThermostatMode,
        heat_set_point: f64,
        cool_set_point: f64,
        fan_mode: FanMode,
    },
    #[serde(rename_all = "camelCase")]
    MediaRoom {
        id: String,
        is_powered_on: bool,
        volume_percent: u8,
        is_muted: bool,
        current_provider_id: Option<String>,
    },
}

impl DeviceStateSnapshot {
    /// Id of the device this snapshot belongs to
    pub fn device_id(&self) -> &str {
        match self {
            DeviceStateSnapshot::Light { id, .. } => id,
            DeviceStateSnapshot::Thermostat { id, .. } => id,
            DeviceStateSnapshot::MediaRoom { id, .. } => id,
        }
    }
}

/// Aggregate numbers behind a command's response text
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandDetails {
    /// Devices the hints resolved to
    pub total_devices: usize,
    /// Subset whose state actually changed
    pub changed_devices: usize,
    /// Human-readable target description
    pub target: String,
    /// Devices whose remote setter reported failure
    #[serde(default)]
    pub failed_devices: Vec<String>,
}

/// One executed command with everything needed to undo it
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutedCommand {
    pub id: Uuid,
    /// Raw input the intent was parsed from
    pub input: String,
    /// Deterministic natural-language summary
    pub response: String,
    /// Ordered pre-mutation snapshots, one per changed device
    pub snapshots: Vec<DeviceStateSnapshot>,
    pub details: CommandDetails,
    pub undone: bool,
    /// An undo replay is in flight; the command cannot be claimed again
    /// until the replay reports back
    #[serde(skip, default)]
    pub undo_pending: bool,
    pub executed_at: chrono::DateTime<chrono::Utc>,
}

/// Bounded FIFO of executed commands
pub struct CommandHistory {
    capacity: usize,
    commands: Mutex<VecDeque<ExecutedCommand>>,
}

impl CommandHistory {
    /// Create a history with the given capacity
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            commands: Mutex::new(VecDeque::new()),
        }
    }

    /// Record a command, evicting the oldest entry when full
    pub async fn record(&self, command: ExecutedCommand) {
        let mut commands = self.commands.lock().await;
        if commands.len() >= self.capacity {
            commands.pop_front();
        }
        commands.push_back(command);
    }

    /// Look up a command by id
    pub async fn get(&self, id: Uuid) -> Option<ExecutedCommand> {
        let commands = self.commands.lock().await;
        commands.iter().find(|c| c.id == id).cloned()
    }

    /// Claim a command for undo and hand back its snapshots
    ///
    /// The claim is taken under the history lock, so of any number of
    /// concurrent undo attempts exactly one gets the snapshots; the rest see
    /// None. Also None when the command is unknown, already undone, or
    /// captured nothing. The claim is released by [`finish_undo`].
    ///
    /// [`finish_undo`]: CommandHistory::finish_undo
    pub async fn claim_for_undo(&self, id: Uuid) -> Option<Vec<DeviceStateSnapshot>> {
        let mut commands = self.commands.lock().await;
        let command = commands.iter_mut().find(|c| c.id == id)?;
        if command.undone || command.undo_pending || command.snapshots.is_empty() {
            return None;
        }
        command.undo_pending = true;
        Some(command.snapshots.clone())
    }

    /// Release a claim taken by [`claim_for_undo`]; marks the command undone
    /// on success, otherwise leaves it claimable again
    ///
    /// [`claim_for_undo`]: CommandHistory::claim_for_undo
    pub async fn finish_undo(&self, id: Uuid, success: bool) {
        let mut commands = self.commands.lock().await;
        if let Some(command) = commands.iter_mut().find(|c| c.id == id) {
            command.undo_pending = false;
            if success {
                command.undone = true;
            }
        }
    }

    /// Most recent command that can still be undone
    pub async fn last_undoable(&self) -> Option<ExecutedCommand> {
        let commands = self.commands.lock().await;
        commands
            .iter()
            .rev()
            .find(|c| !c.undone && !c.undo_pending && !c.snapshots.is_empty())
            .cloned()
    }

    /// Number of retained commands
    pub async fn len(&self) -> usize {
        self.commands.lock().await.len()
    }

    /// Whether the history is empty
    pub async fn is_empty(&self) -> bool {
        self.commands.lock().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(input: &str) -> ExecutedCommand {
        ExecutedCommand {
            id: Uuid::new_v4(),
            input: input.to_string(),
            response: String::new(),
            snapshots: vec![DeviceStateSnapshot::Light {
                id: "l1".to_string(),
                level: 0,
                is_on: false,
            }],
            details: CommandDetails::default(),
            undone: false,
            undo_pending: false,
            executed_at: chrono::Utc::now(),
        }
    }

    #[tokio::test]
    async fn capped_history_evicts_oldest() {
        let history = CommandHistory::new(2);
        let first = command("one");
        let first_id = first.id;
        history.record(first).await;
        history.record(command("two")).await;
        history.record(command("three")).await;

        assert_eq!(history.len().await, 2);
        assert!(history.get(first_id).await.is_none());
    }

    #[tokio::test]
    async fn undo_is_single_shot() {
        let history = CommandHistory::new(10);
        let cmd = command("turn on the lights");
        let id = cmd.id;
        history.record(cmd).await;

        assert!(history.claim_for_undo(id).await.is_some());
        history.finish_undo(id, true).await;

        // Second attempt finds nothing to undo
        assert!(history.claim_for_undo(id).await.is_none());
    }

    #[tokio::test]
    async fn only_one_claim_wins_while_a_replay_is_in_flight() {
        let history = CommandHistory::new(10);
        let cmd = command("turn on the lights");
        let id = cmd.id;
        history.record(cmd).await;

        assert!(history.claim_for_undo(id).await.is_some());
        // A second claimant before the replay reports back gets nothing
        assert!(history.claim_for_undo(id).await.is_none());
        assert!(history.last_undoable().await.is_none());

        // A failed replay releases the claim
        history.finish_undo(id, false).await;
        assert!(history.claim_for_undo(id).await.is_some());
    }

    #[tokio::test]
    async fn commands_without_snapshots_are_not_undoable() {
        let history = CommandHistory::new(10);
        let mut cmd = command("status");
        cmd.snapshots.clear();
        let id = cmd.id;
        history.record(cmd).await;

        assert!(history.claim_for_undo(id).await.is_none());
        assert!(history.last_undoable().await.is_none());
    }
}
