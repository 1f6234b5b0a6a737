//! Mock implementations for testing
//!
//! In-memory controller and auth collaborators with configurable datasets,
//! recorded setter calls, per-device failure injection, and an "expired
//! session" mode where every collection comes back empty.

use crate::client::{AuthClient, ControllerClient};
use crate::error::{HomeError, Result};
use crate::model::{
    Area, DeviceCollections, FanMode, Room, Scene, ThermostatMode, TopologySnapshot,
};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// One recorded setter invocation
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCommand {
    Light {
        id: String,
        level: Option<u16>,
        is_on: Option<bool>,
    },
    ThermostatSetPoint {
        id: String,
        heat: Option<f64>,
        cool: Option<f64>,
    },
    ThermostatMode {
        id: String,
        mode: ThermostatMode,
    },
    ThermostatFanMode {
        id: String,
        fan_mode: FanMode,
    },
    MediaPower {
        id: String,
        is_powered_on: bool,
    },
    MediaVolume {
        id: String,
        volume_percent: u8,
    },
    MediaMute {
        id: String,
        is_muted: bool,
    },
    MediaSource {
        id: String,
        provider_id: String,
    },
    SceneRecall {
        id: String,
    },
    DoorLock {
        id: String,
        is_locked: bool,
    },
}

impl RecordedCommand {
    /// Id of the device the command targeted
    pub fn device_id(&self) -> &str {
        match self {
            RecordedCommand::Light { id, .. }
            | RecordedCommand::ThermostatSetPoint { id, .. }
            | RecordedCommand::ThermostatMode { id, .. }
            | RecordedCommand::ThermostatFanMode { id, .. }
            | RecordedCommand::MediaPower { id, .. }
            | RecordedCommand::MediaVolume { id, .. }
            | RecordedCommand::MediaMute { id, .. }
            | RecordedCommand::MediaSource { id, .. }
            | RecordedCommand::SceneRecall { id }
            | RecordedCommand::DoorLock { id, .. } => id,
        }
    }
}

/// Mock controller client for testing
#[derive(Default)]
pub struct MockControllerClient {
    dataset: Mutex<TopologySnapshot>,
    commands: Mutex<Vec<RecordedCommand>>,
    /// Device ids whose setters report failure
    failing: Mutex<HashSet<String>>,
    /// When set, every getter returns empty (expired session behavior)
    expired: Arc<AtomicBool>,
    /// When set, every getter returns a connection error
    offline: AtomicBool,
    poll_count: AtomicUsize,
}

impl MockControllerClient {
    /// Create an empty mock
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock preloaded with a dataset
    pub fn with_dataset(dataset: TopologySnapshot) -> Self {
        Self {
            dataset: Mutex::new(dataset),
            ..Self::default()
        }
    }

    /// Replace the dataset
    pub fn set_dataset(&self, dataset: TopologySnapshot) {
        *self.dataset.lock().unwrap() = dataset;
    }

    /// Make a device's setters report failure
    pub fn fail_device(&self, id: &str) {
        self.failing.lock().unwrap().insert(id.to_string());
    }

    /// Switch expired-session behavior on or off
    pub fn set_expired(&self, expired: bool) {
        self.expired.store(expired, Ordering::SeqCst);
    }

    /// Make every getter fail at the transport level
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Shared expired flag, for wiring into [`MockAuthClient::restoring`]
    pub fn expired_flag(&self) -> Arc<AtomicBool> {
        self.expired.clone()
    }

    /// All recorded setter calls, in dispatch order
    pub fn commands(&self) -> Vec<RecordedCommand> {
        self.commands.lock().unwrap().clone()
    }

    /// Recorded setter calls against one device
    pub fn commands_for(&self, id: &str) -> Vec<RecordedCommand> {
        self.commands
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.device_id() == id)
            .cloned()
            .collect()
    }

    /// Number of poll cycles observed
    pub fn poll_count(&self) -> usize {
        self.poll_count.load(Ordering::SeqCst)
    }

    fn record(&self, command: RecordedCommand) -> Result<bool> {
        let ok = !self
            .failing
            .lock()
            .unwrap()
            .contains(command.device_id());
        self.commands.lock().unwrap().push(command);
        Ok(ok)
    }

    fn is_expired(&self) -> bool {
        self.expired.load(Ordering::SeqCst)
    }

    fn check_online(&self) -> Result<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(HomeError::connection("controller unreachable"));
        }
        Ok(())
    }
}

#[async_trait]
impl ControllerClient for MockControllerClient {
    async fn get_areas(&self) -> Result<Vec<Area>> {
        self.poll_count.fetch_add(1, Ordering::SeqCst);
        self.check_online()?;
        if self.is_expired() {
            return Ok(Vec::new());
        }
        Ok(self.dataset.lock().unwrap().areas.clone())
    }

    async fn get_rooms(&self) -> Result<Vec<Room>> {
        self.check_online()?;
        if self.is_expired() {
            return Ok(Vec::new());
        }
        Ok(self.dataset.lock().unwrap().rooms.clone())
    }

    async fn get_devices(&self) -> Result<DeviceCollections> {
        self.check_online()?;
        if self.is_expired() {
            return Ok(DeviceCollections::default());
        }
        let dataset = self.dataset.lock().unwrap();
        Ok(DeviceCollections {
            lights: dataset.lights.clone(),
            thermostats: dataset.thermostats.clone(),
            media_rooms: dataset.media_rooms.clone(),
            door_locks: dataset.door_locks.clone(),
            sensors: dataset.sensors.clone(),
        })
    }

    async fn get_scenes(&self) -> Result<Vec<Scene>> {
        self.check_online()?;
        if self.is_expired() {
            return Ok(Vec::new());
        }
        Ok(self.dataset.lock().unwrap().scenes.clone())
    }

    async fn set_light(&self, id: &str, level: Option<u16>, is_on: Option<bool>) -> Result<bool> {
        self.record(RecordedCommand::Light {
            id: id.to_string(),
            level,
            is_on,
        })
    }

    async fn set_thermostat_set_point(
        &self,
        id: &str,
        heat: Option<f64>,
        cool: Option<f64>,
    ) -> Result<bool> {
        self.record(RecordedCommand::ThermostatSetPoint {
            id: id.to_string(),
            heat,
            cool,
        })
    }

    async fn set_thermostat_mode(&self, id: &str, mode: ThermostatMode) -> Result<bool> {
        self.record(RecordedCommand::ThermostatMode {
            id: id.to_string(),
            mode,
        })
    }

    async fn set_thermostat_fan_mode(&self, id: &str, fan_mode: FanMode) -> Result<bool> {
        self.record(RecordedCommand::ThermostatFanMode {
            id: id.to_string(),
            fan_mode,
        })
    }

    async fn set_media_room_power(&self, id: &str, is_powered_on: bool) -> Result<bool> {
        self.record(RecordedCommand::MediaPower {
            id: id.to_string(),
            is_powered_on,
        })
    }

    async fn set_media_room_volume(&self, id: &str, volume_percent: u8) -> Result<bool> {
        self.record(RecordedCommand::MediaVolume {
            id: id.to_string(),
            volume_percent,
        })
    }

    async fn set_media_room_mute(&self, id: &str, is_muted: bool) -> Result<bool> {
        self.record(RecordedCommand::MediaMute {
            id: id.to_string(),
            is_muted,
        })
    }

    async fn set_media_room_source(&self, id: &str, provider_id: &str) -> Result<bool> {
        self.record(RecordedCommand::MediaSource {
            id: id.to_string(),
            provider_id: provider_id.to_string(),
        })
    }

    async fn recall_scene(&self, id: &str) -> Result<bool> {
        self.record(RecordedCommand::SceneRecall { id: id.to_string() })
    }

    async fn set_door_lock(&self, id: &str, is_locked: bool) -> Result<bool> {
        self.record(RecordedCommand::DoorLock {
            id: id.to_string(),
            is_locked,
        })
    }
}

/// Mock auth client for testing
pub struct MockAuthClient {
    succeed: bool,
    refreshes: AtomicUsize,
    invalidated: AtomicBool,
    /// Expired flag cleared on a successful refresh
    restore: Option<Arc<AtomicBool>>,
}

impl MockAuthClient {
    /// Auth client whose refresh always succeeds or always fails
    pub fn new(succeed: bool) -> Self {
        Self {
            succeed,
            refreshes: AtomicUsize::new(0),
            invalidated: AtomicBool::new(false),
            restore: None,
        }
    }

    /// Successful refreshes also clear the given expired flag, simulating a
    /// renewed session making data visible again
    pub fn restoring(expired_flag: Arc<AtomicBool>) -> Self {
        Self {
            succeed: true,
            refreshes: AtomicUsize::new(0),
            invalidated: AtomicBool::new(false),
            restore: Some(expired_flag),
        }
    }

    /// Number of refresh attempts observed
    pub fn refresh_count(&self) -> usize {
        self.refreshes.load(Ordering::SeqCst)
    }

    /// Whether the session was invalidated
    pub fn was_invalidated(&self) -> bool {
        self.invalidated.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AuthClient for MockAuthClient {
    async fn refresh_auth(&self) -> Result<bool> {
        self.refreshes.fetch_add(1, Ordering::SeqCst);
        if self.succeed {
            if let Some(flag) = &self.restore {
                flag.store(false, Ordering::SeqCst);
            }
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn invalidate_auth(&self) {
        self.invalidated.store(true, Ordering::SeqCst);
    }
}
