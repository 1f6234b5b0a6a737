//! Domain model for the Crestron control core
//!
//! Flat device collections as returned by the processor's per-type routes.
//! All wire types use camelCase field names to match the controller payloads.

use serde::{Deserialize, Serialize};

/// Raw dimmer level ceiling used by the processor (16-bit)
pub const MAX_LIGHT_LEVEL: u16 = 65535;

/// A logical grouping of rooms (a floor or wing)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Area {
    pub id: String,
    pub name: String,
    /// Member room ids; order irrelevant
    #[serde(default)]
    pub room_ids: Vec<String>,
}

/// A named location containing zero or more devices
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub area_id: Option<String>,
    #[serde(default)]
    pub area_name: Option<String>,
}

/// Dimmable light load
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Light {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub room_id: Option<String>,
    /// Raw level, 0..=65535
    pub level: u16,
    pub is_on: bool,
}

/// Thermostat operating mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThermostatMode {
    Off,
    Heat,
    Cool,
    Auto,
}

impl ThermostatMode {
    /// Display name used in response text
    pub fn as_str(&self) -> &'static str {
        match self {
            ThermostatMode::Off => "off",
            ThermostatMode::Heat => "heat",
            ThermostatMode::Cool => "cool",
            ThermostatMode::Auto => "auto",
        }
    }
}

/// Thermostat fan mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FanMode {
    Auto,
    On,
}

/// Climate controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Thermostat {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub room_id: Option<String>,
    pub current_temp: f64,
    pub heat_set_point: f64,
    pub cool_set_point: f64,
    pub mode: ThermostatMode,
    pub fan_mode: FanMode,
}

/// A selectable media source/provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaProvider {
    pub id: String,
    pub name: String,
}

/// Audio/video zone
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaRoom {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub room_id: Option<String>,
    pub is_powered_on: bool,
    pub volume_percent: u8,
    pub is_muted: bool,
    #[serde(default)]
    pub current_provider_id: Option<String>,
    #[serde(default)]
    pub available_providers: Vec<MediaProvider>,
}

impl MediaRoom {
    /// Name of the currently selected provider, if any
    pub fn current_provider_name(&self) -> Option<&str> {
        let current = self.current_provider_id.as_deref()?;
        self.available_providers
            .iter()
            .find(|p| p.id == current)
            .map(|p| p.name.as_str())
    }
}

/// A pre-programmed combination of device states recallable as one action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub room_id: Option<String>,
}

/// Door lock
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoorLock {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub room_id: Option<String>,
    pub is_locked: bool,
    #[serde(default)]
    pub battery_level: Option<u8>,
}

/// Read-only sensor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sensor {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub room_id: Option<String>,
    pub kind: String,
    pub value: serde_json::Value,
}

/// Per-type device collections returned by one poll of the devices route
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceCollections {
    #[serde(default)]
    pub lights: Vec<Light>,
    #[serde(default)]
    pub thermostats: Vec<Thermostat>,
    #[serde(default)]
    pub media_rooms: Vec<MediaRoom>,
    #[serde(default)]
    pub door_locks: Vec<DoorLock>,
    #[serde(default)]
    pub sensors: Vec<Sensor>,
}

/// Point-in-time read view of the whole cached topology
///
/// Cloned out of the cache so matching and response generation never hold
/// cache locks across awaits.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopologySnapshot {
    pub areas: Vec<Area>,
    pub rooms: Vec<Room>,
    pub lights: Vec<Light>,
    pub thermostats: Vec<Thermostat>,
    pub media_rooms: Vec<MediaRoom>,
    pub scenes: Vec<Scene>,
    pub door_locks: Vec<DoorLock>,
    pub sensors: Vec<Sensor>,
}

impl TopologySnapshot {
    /// Resolve a room's display name by id
    pub fn room_name(&self, room_id: &str) -> Option<&str> {
        self.rooms
            .iter()
            .find(|r| r.id == room_id)
            .map(|r| r.name.as_str())
    }
}

/// Whether a thermostat is an auxiliary floor-heat unit
///
/// The processor exposes floor heat as a second thermostat in the same room;
/// the only distinguishing signal is the hardware label.
pub fn is_floor_heat(thermostat: &Thermostat) -> bool {
    let name = thermostat.name.to_lowercase();
    name.contains("floor") || name.contains("radiant")
}

/// Whether a thermostat's measured temperature has reached its heat setpoint
pub fn is_temperature_satisfied(thermostat: &Thermostat) -> bool {
    thermostat.current_temp >= thermostat.heat_set_point
}

/// Convert a raw 16-bit dimmer level to a 0-100 percentage
pub fn level_to_percent(level: u16) -> u8 {
    ((level as f64 / MAX_LIGHT_LEVEL as f64) * 100.0).round() as u8
}

/// Convert a 0-100 percentage to a raw 16-bit dimmer level
pub fn percent_to_level(percent: u8) -> u16 {
    let percent = percent.min(100) as f64;
    ((percent / 100.0) * MAX_LIGHT_LEVEL as f64).round() as u16
}
