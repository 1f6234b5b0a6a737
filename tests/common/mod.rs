//! Shared fixtures for the integration test suite
//!
//! Builds a small two-floor house dataset and wires a [`ControlCore`] over
//! the bundled mocks.

#![allow(dead_code)]

use crestron_home_core::config::CoreConfig;
use crestron_home_core::mock::{MockAuthClient, MockControllerClient};
use crestron_home_core::model::{
    Area, DoorLock, FanMode, Light, MediaProvider, MediaRoom, Room, Scene, Thermostat,
    ThermostatMode, TopologySnapshot, MAX_LIGHT_LEVEL,
};
use crestron_home_core::ControlCore;
use std::sync::Arc;

pub fn light(id: &str, name: &str, room_id: &str, level: u16, is_on: bool) -> Light {
    Light {
        id: id.to_string(),
        name: name.to_string(),
        room_id: Some(room_id.to_string()),
        level,
        is_on,
    }
}

pub fn thermostat(
    id: &str,
    name: &str,
    room_id: &str,
    current_temp: f64,
    heat_set_point: f64,
    mode: ThermostatMode,
) -> Thermostat {
    Thermostat {
        id: id.to_string(),
        name: name.to_string(),
        room_id: Some(room_id.to_string()),
        current_temp,
        heat_set_point,
        cool_set_point: 76.0,
        mode,
        fan_mode: FanMode::Auto,
    }
}

pub fn media_room(id: &str, name: &str, room_id: &str, is_powered_on: bool) -> MediaRoom {
    MediaRoom {
        id: id.to_string(),
        name: name.to_string(),
        room_id: Some(room_id.to_string()),
        is_powered_on,
        volume_percent: 30,
        is_muted: false,
        current_provider_id: Some("p1".to_string()),
        available_providers: vec![
            MediaProvider {
                id: "p1".to_string(),
                name: "Sonos".to_string(),
            },
            MediaProvider {
                id: "p2".to_string(),
                name: "Apple TV".to_string(),
            },
        ],
    }
}

/// Two floors, four rooms, a handful of devices per type
///
/// The kitchen has three lights with one already at 50%; the master bedroom
/// has an HVAC/floor-heat thermostat pair.
pub fn house_dataset() -> TopologySnapshot {
    TopologySnapshot {
        areas: vec![
            Area {
                id: "a1".to_string(),
                name: "2nd Floor".to_string(),
                room_ids: vec!["r1".to_string(), "r2".to_string()],
            },
            Area {
                id: "a2".to_string(),
                name: "1st Floor".to_string(),
                room_ids: vec!["r3".to_string(), "r4".to_string()],
            },
        ],
        rooms: vec![
            Room {
                id: "r1".to_string(),
                name: "Master Bedroom".to_string(),
                area_id: Some("a1".to_string()),
                area_name: Some("2nd Floor".to_string()),
            },
            Room {
                id: "r2".to_string(),
                name: "Master Bathroom".to_string(),
                area_id: Some("a1".to_string()),
                area_name: Some("2nd Floor".to_string()),
            },
            Room {
                id: "r3".to_string(),
                name: "Kitchen".to_string(),
                area_id: Some("a2".to_string()),
                area_name: Some("1st Floor".to_string()),
            },
            Room {
                id: "r4".to_string(),
                name: "Living Room".to_string(),
                area_id: Some("a2".to_string()),
                area_name: Some("1st Floor".to_string()),
            },
        ],
        lights: vec![
            light("l1", "Kitchen Pendant", "r3", 0, false),
            light("l2", "Kitchen Island", "r3", 32768, true),
            light("l3", "Kitchen Cans", "r3", 0, false),
            light("l4", "Bedside Lamp", "r1", MAX_LIGHT_LEVEL, true),
            light("l5", "Living Room Sconces", "r4", 0, false),
        ],
        thermostats: vec![
            thermostat("t1", "Master HVAC", "r1", 70.0, 72.0, ThermostatMode::Heat),
            thermostat(
                "t2",
                "Master Floor Heat",
                "r1",
                70.0,
                72.0,
                ThermostatMode::Heat,
            ),
            thermostat("t3", "Kitchen", "r3", 71.0, 70.0, ThermostatMode::Off),
        ],
        media_rooms: vec![
            media_room("m1", "Living Room Audio", "r4", true),
            media_room("m2", "Master Audio", "r1", false),
        ],
        scenes: vec![
            Scene {
                id: "s1".to_string(),
                name: "Good Night".to_string(),
                room_id: None,
            },
            Scene {
                id: "s2".to_string(),
                name: "Cooking".to_string(),
                room_id: Some("r3".to_string()),
            },
        ],
        door_locks: vec![DoorLock {
            id: "d1".to_string(),
            name: "Front Door".to_string(),
            room_id: None,
            is_locked: true,
            battery_level: Some(80),
        }],
        sensors: Vec::new(),
    }
}

pub struct TestHarness {
    pub core: ControlCore,
    pub client: Arc<MockControllerClient>,
    pub auth: Arc<MockAuthClient>,
}

/// Core over a preloaded mock controller, cache already hydrated
pub async fn hydrated_harness() -> TestHarness {
    let client = Arc::new(MockControllerClient::with_dataset(house_dataset()));
    let auth = Arc::new(MockAuthClient::new(true));
    let core = ControlCore::new(&CoreConfig::default(), client.clone(), auth.clone());
    core.cache().hydrate(house_dataset()).await;
    TestHarness { core, client, auth }
}

/// Core over an empty cache; polls fill it from the mock dataset
pub fn cold_harness(client: Arc<MockControllerClient>, auth: Arc<MockAuthClient>) -> ControlCore {
    ControlCore::new(&CoreConfig::default(), client, auth)
}
