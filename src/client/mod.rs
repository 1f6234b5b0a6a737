//! Collaborator traits for the remote controller and the auth layer
//!
//! The raw HTTP transport lives outside this crate; the core only depends on
//! these traits. Setters return `Ok(false)` when the processor rejects a
//! command — `Err` is reserved for transport-level failures, and callers
//! treat both as a per-device failure.

use crate::error::Result;
use crate::model::{Area, DeviceCollections, FanMode, Room, Scene, ThermostatMode};
use async_trait::async_trait;

/// Remote controller collaborator: per-type reads and per-device setters
#[async_trait]
pub trait ControllerClient: Send + Sync {
    /// Fetch all areas
    async fn get_areas(&self) -> Result<Vec<Area>>;

    /// Fetch all rooms
    async fn get_rooms(&self) -> Result<Vec<Room>>;

    /// Fetch all device collections in one call
    async fn get_devices(&self) -> Result<DeviceCollections>;

    /// Fetch all scenes
    async fn get_scenes(&self) -> Result<Vec<Scene>>;

    /// Set a light's level and/or power state
    async fn set_light(&self, id: &str, level: Option<u16>, is_on: Option<bool>) -> Result<bool>;

    /// Set a thermostat's heat and/or cool setpoint
    async fn set_thermostat_set_point(
        &self,
        id: &str,
        heat: Option<f64>,
        cool: Option<f64>,
    ) -> Result<bool>;

    /// Set a thermostat's operating mode
    async fn set_thermostat_mode(&self, id: &str, mode: ThermostatMode) -> Result<bool>;

    /// Set a thermostat's fan mode
    async fn set_thermostat_fan_mode(&self, id: &str, fan_mode: FanMode) -> Result<bool>;

    /// Power a media room on or off
    async fn set_media_room_power(&self, id: &str, is_powered_on: bool) -> Result<bool>;

    /// Set a media room's volume (0-100)
    async fn set_media_room_volume(&self, id: &str, volume_percent: u8) -> Result<bool>;

    /// Mute or unmute a media room
    async fn set_media_room_mute(&self, id: &str, is_muted: bool) -> Result<bool>;

    /// Select a media room's source/provider
    async fn set_media_room_source(&self, id: &str, provider_id: &str) -> Result<bool>;

    /// Recall a scene
    async fn recall_scene(&self, id: &str) -> Result<bool>;

    /// Lock or unlock a door
    async fn set_door_lock(&self, id: &str, is_locked: bool) -> Result<bool>;
}

/// Authentication collaborator
///
/// OAuth mechanics are out of scope; the core only ever asks for one refresh
/// attempt and reports when refresh is impossible.
#[async_trait]
pub trait AuthClient: Send + Sync {
    /// Attempt to refresh the session; returns whether it succeeded
    async fn refresh_auth(&self) -> Result<bool>;

    /// Mark the session invalid so the host can force a re-login
    async fn invalidate_auth(&self);
}
