//! Structured command intents
//!
//! Intents arrive pre-parsed from the host (natural-language parsing is not
//! this crate's job). Each action family carries the hints the matcher needs
//! plus the action-specific parameters.

use crate::model::ThermostatMode;
use serde::{Deserialize, Serialize};

/// Loose area/room/device-name hints attached to an intent
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TargetHints {
    #[serde(default)]
    pub area: Option<String>,
    #[serde(default)]
    pub room: Option<String>,
    #[serde(default)]
    pub device_name: Option<String>,
}

impl TargetHints {
    /// Hints targeting everything
    pub fn all() -> Self {
        Self::default()
    }

    /// Hints targeting a room by name
    pub fn room(name: impl Into<String>) -> Self {
        Self {
            room: Some(name.into()),
            ..Self::default()
        }
    }

    /// Hints targeting an area by name
    pub fn area(name: impl Into<String>) -> Self {
        Self {
            area: Some(name.into()),
            ..Self::default()
        }
    }

    /// Human-readable description of the target, used in response text
    pub fn describe(&self) -> String {
        match (&self.device_name, &self.room, &self.area) {
            (Some(device), Some(room), _) => format!("{device} in {room}"),
            (Some(device), None, _) => device.clone(),
            (None, Some(room), _) => room.clone(),
            (None, None, Some(area)) => area.clone(),
            (None, None, None) => "the whole house".to_string(),
        }
    }
}

/// Light action family
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum LightAction {
    On,
    Off,
    SetBrightness { brightness: u8 },
}

/// Climate action family
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ClimateAction {
    SetTemperature { temperature: f64 },
    SetMode { mode: ThermostatMode },
}

/// Media action family
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum MediaAction {
    PowerOn,
    PowerOff,
    SetVolume { volume: u8 },
    Mute,
    Unmute,
    SelectSource { source: String },
}

/// Device-type filter for status queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusKind {
    Lights,
    Climate,
    Media,
    All,
}

/// One structured command intent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "family", rename_all = "snake_case")]
pub enum CommandAction {
    Light {
        #[serde(flatten)]
        action: LightAction,
        #[serde(flatten)]
        target: TargetHints,
    },
    Climate {
        #[serde(flatten)]
        action: ClimateAction,
        #[serde(flatten)]
        target: TargetHints,
    },
    Media {
        #[serde(flatten)]
        action: MediaAction,
        #[serde(flatten)]
        target: TargetHints,
    },
    Scene {
        scene_name: String,
        #[serde(default)]
        room: Option<String>,
    },
    Status {
        kind: StatusKind,
        #[serde(flatten)]
        target: TargetHints,
    },
}
