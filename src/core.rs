//! Top-level control core wiring
//!
//! Owns the cache, executor, history, and pairing coordinator and exposes
//! the upward interface consumed by the host: submit, undo, poll, and read
//! access to the current topology.

use crate::cache::DeviceCache;
use crate::client::{AuthClient, ControllerClient};
use crate::command::{CommandExecutor, UndoOutcome};
use crate::config::CoreConfig;
use crate::error::Result;
use crate::history::{CommandHistory, ExecutedCommand};
use crate::intent::CommandAction;
use crate::model::TopologySnapshot;
use crate::pairing::{PairingCoordinator, ThermostatPair};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Command-resolution and state-reconciliation core
pub struct ControlCore {
    cache: Arc<DeviceCache>,
    history: Arc<CommandHistory>,
    executor: CommandExecutor,
    coordinator: PairingCoordinator,
    client: Arc<dyn ControllerClient>,
    auth: Arc<dyn AuthClient>,
}

impl ControlCore {
    /// Wire up a core over the controller and auth collaborators
    pub fn new(
        config: &CoreConfig,
        client: Arc<dyn ControllerClient>,
        auth: Arc<dyn AuthClient>,
    ) -> Self {
        let cache = Arc::new(DeviceCache::new());
        let history = Arc::new(CommandHistory::new(config.history_capacity));
        let executor = CommandExecutor::new(client.clone(), cache.clone(), history.clone());
        let coordinator = PairingCoordinator::new(client.clone(), cache.clone());
        Self {
            cache,
            history,
            executor,
            coordinator,
            client,
            auth,
        }
    }

    /// Execute one structured intent
    pub async fn submit_command(
        &self,
        input: &str,
        action: &CommandAction,
    ) -> Result<ExecutedCommand> {
        self.executor.submit(input, action).await
    }

    /// Undo a previously executed command; true when it was undone
    pub async fn undo_command(&self, command_id: Uuid) -> Result<bool> {
        let outcome: UndoOutcome = self.executor.undo(command_id).await?;
        debug!(command = %command_id, success = outcome.success, "{}", outcome.message);
        Ok(outcome.success)
    }

    /// Run one reconciliation poll; true when fresh data was merged
    ///
    /// A successful merge is followed by the floor-heat satisfaction pass.
    pub async fn poll_once(&self) -> Result<bool> {
        let updated = self
            .cache
            .poll_once(self.client.as_ref(), self.auth.as_ref())
            .await?;
        if updated {
            self.coordinator.check_satisfaction().await;
        }
        Ok(updated)
    }

    /// Current cached topology
    pub async fn topology(&self) -> TopologySnapshot {
        self.cache.snapshot().await
    }

    /// Current thermostat pairs
    pub async fn thermostat_pairs(&self) -> Vec<ThermostatPair> {
        self.coordinator.pairs().await
    }

    /// Lock or unlock a door, patching the cache optimistically
    pub async fn set_door_lock(&self, id: &str, is_locked: bool) -> Result<bool> {
        self.cache
            .update_door_lock(id, |lock| lock.is_locked = is_locked)
            .await;
        Ok(self
            .client
            .set_door_lock(id, is_locked)
            .await
            .unwrap_or(false))
    }

    /// Shared cache handle, for hosts that hydrate persisted state
    pub fn cache(&self) -> &Arc<DeviceCache> {
        &self.cache
    }

    /// Command history handle
    pub fn history(&self) -> &Arc<CommandHistory> {
        &self.history
    }

    /// Pairing coordinator handle
    pub fn coordinator(&self) -> &PairingCoordinator {
        &self.coordinator
    }
}
