//! Thermostat pairing coordinator
//!
//! Couples a room's primary climate device with its optional auxiliary
//! floor-heat device into one constrained state machine. Floor heat only
//! supports heat/off, and must not run while the primary system is not
//! calling for heat.

use crate::cache::DeviceCache;
use crate::client::ControllerClient;
use crate::error::Result;
use crate::model::{
    is_floor_heat, is_temperature_satisfied, Room, Thermostat, ThermostatMode,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A room's coordinated thermostat pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThermostatPair {
    pub room_id: String,
    pub room_name: String,
    pub main: Thermostat,
    pub floor_heat: Option<Thermostat>,
}

/// The mode floor heat is driven to when the main thermostat changes mode
pub fn derived_floor_heat_mode(main_mode: ThermostatMode) -> ThermostatMode {
    if main_mode == ThermostatMode::Heat {
        ThermostatMode::Heat
    } else {
        ThermostatMode::Off
    }
}

/// Clamp a requested floor-heat mode to its supported set {heat, off}
pub fn clamp_floor_heat_mode(mode: ThermostatMode) -> ThermostatMode {
    if mode == ThermostatMode::Heat {
        ThermostatMode::Heat
    } else {
        ThermostatMode::Off
    }
}

/// Group thermostats sharing a room into pairs
///
/// A room with a single thermostat is its own trivial pair; thermostats
/// without a room assignment are skipped.
pub fn pair_thermostats(thermostats: &[Thermostat], rooms: &[Room]) -> Vec<ThermostatPair> {
    let mut by_room: BTreeMap<String, Vec<&Thermostat>> = BTreeMap::new();
    for thermostat in thermostats {
        let Some(room_id) = &thermostat.room_id else {
            continue;
        };
        by_room.entry(room_id.clone()).or_default().push(thermostat);
    }

    let mut pairs = Vec::new();
    for (room_id, room_thermostats) in by_room {
        let room_name = rooms
            .iter()
            .find(|r| r.id == room_id)
            .map(|r| r.name.clone())
            .unwrap_or_else(|| format!("Room {room_id}"));

        let floor_heat = room_thermostats.iter().find(|t| is_floor_heat(t)).copied();
        let main = room_thermostats.iter().find(|t| !is_floor_heat(t)).copied();

        match (main, floor_heat) {
            (Some(main), floor_heat) => pairs.push(ThermostatPair {
                room_id,
                room_name,
                main: main.clone(),
                floor_heat: floor_heat.cloned(),
            }),
            // Room only has floor heat; treat it as the main
            (None, Some(floor_heat)) => pairs.push(ThermostatPair {
                room_id,
                room_name,
                main: floor_heat.clone(),
                floor_heat: None,
            }),
            (None, None) => {}
        }
    }
    pairs
}

/// Drives coordinated mode changes and the satisfaction auto-shutoff
pub struct PairingCoordinator {
    client: Arc<dyn ControllerClient>,
    cache: Arc<DeviceCache>,
}

impl PairingCoordinator {
    /// Create a coordinator over the given collaborators
    pub fn new(client: Arc<dyn ControllerClient>, cache: Arc<DeviceCache>) -> Self {
        Self { client, cache }
    }

    /// Current pairs derived from the cached topology
    pub async fn pairs(&self) -> Vec<ThermostatPair> {
        let topology = self.cache.snapshot().await;
        pair_thermostats(&topology.thermostats, &topology.rooms)
    }

    /// Coordinated mode change driven from the main thermostat
    ///
    /// Floor heat follows deterministically (heat iff main heats). Both
    /// setters are dispatched in parallel; with a floor-heat present, success
    /// requires both.
    pub async fn set_room_mode(&self, pair: &ThermostatPair, mode: ThermostatMode) -> Result<bool> {
        let floor_mode = derived_floor_heat_mode(mode);

        self.cache
            .update_thermostat(&pair.main.id, |t| t.mode = mode)
            .await;
        if let Some(floor) = &pair.floor_heat {
            self.cache
                .update_thermostat(&floor.id, |t| t.mode = floor_mode)
                .await;
        }

        match &pair.floor_heat {
            Some(floor) => {
                let (main_ok, floor_ok) = tokio::join!(
                    self.client.set_thermostat_mode(&pair.main.id, mode),
                    self.client.set_thermostat_mode(&floor.id, floor_mode),
                );
                Ok(main_ok.unwrap_or(false) && floor_ok.unwrap_or(false))
            }
            None => Ok(self
                .client
                .set_thermostat_mode(&pair.main.id, mode)
                .await
                .unwrap_or(false)),
        }
    }

    /// Reverse coordination: the user toggles floor heat directly
    ///
    /// The requested mode is clamped to {heat, off}; turning floor heat on
    /// forces the main thermostat to heat as well.
    pub async fn set_floor_heat_mode(
        &self,
        pair: &ThermostatPair,
        mode: ThermostatMode,
    ) -> Result<bool> {
        let Some(floor) = &pair.floor_heat else {
            return Ok(false);
        };
        let effective = clamp_floor_heat_mode(mode);
        let drives_main = effective == ThermostatMode::Heat;

        self.cache
            .update_thermostat(&floor.id, |t| t.mode = effective)
            .await;
        if drives_main {
            self.cache
                .update_thermostat(&pair.main.id, |t| t.mode = ThermostatMode::Heat)
                .await;
        }

        if drives_main {
            let (floor_ok, main_ok) = tokio::join!(
                self.client.set_thermostat_mode(&floor.id, effective),
                self.client
                    .set_thermostat_mode(&pair.main.id, ThermostatMode::Heat),
            );
            Ok(floor_ok.unwrap_or(false) && main_ok.unwrap_or(false))
        } else {
            Ok(self
                .client
                .set_thermostat_mode(&floor.id, effective)
                .await
                .unwrap_or(false))
        }
    }

    /// Satisfaction auto-shutoff, run after every reconciliation poll
    ///
    /// For each pair with floor heat active while the main thermostat heats,
    /// floor heat is forced off once the main's measured temperature reaches
    /// its heat setpoint. Setter failures are left for the next poll pass.
    pub async fn check_satisfaction(&self) {
        for pair in self.pairs().await {
            let Some(floor) = &pair.floor_heat else {
                continue;
            };
            if pair.main.mode != ThermostatMode::Heat || floor.mode != ThermostatMode::Heat {
                continue;
            }
            if !is_temperature_satisfied(&pair.main) {
                continue;
            }

            info!(
                room = %pair.room_name,
                temp = pair.main.current_temp,
                set_point = pair.main.heat_set_point,
                "heat satisfied, shutting off floor heat"
            );
            self.cache
                .update_thermostat(&floor.id, |t| t.mode = ThermostatMode::Off)
                .await;
            match self
                .client
                .set_thermostat_mode(&floor.id, ThermostatMode::Off)
                .await
            {
                Ok(true) => debug!(floor = %floor.id, "floor heat off"),
                Ok(false) => warn!(floor = %floor.id, "floor heat shutoff rejected"),
                Err(e) => warn!(floor = %floor.id, "floor heat shutoff failed: {e}"),
            }
        }
    }
}
