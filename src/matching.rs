//! Topology index and device matcher
//!
//! Resolves loose area/room/device-name hints into concrete device sets.
//! Matching is a fixed cascade of strategies tried in order — exact, then
//! substring either direction, then a canonical alias table — with the first
//! qualifying rule winning. No edit-distance scoring; the cascade order is a
//! business rule, not an optimization.

use crate::intent::TargetHints;
use crate::model::{Area, Light, MediaRoom, Room, Scene, Thermostat, TopologySnapshot};

/// Canonical name variations seen across the room registry and hardware
/// labels. Keyed by the canonical substring in the target name.
const NAME_VARIATIONS: &[(&str, &[&str])] = &[
    ("2nd floor", &["second floor", "2nd", "upstairs"]),
    ("1st floor", &["first floor", "1st", "main floor"]),
    ("lower level", &["basement", "lower", "downstairs"]),
    ("master suite", &["master", "primary suite"]),
    ("master bedroom", &["master bed", "primary bedroom"]),
];

/// Fuzzy match an input against a target name
///
/// Case-insensitive; true on exact equality, substring containment in either
/// direction, or an alias-table hit.
pub fn fuzzy_match(input: &str, target: &str) -> bool {
    let input = input.to_lowercase();
    let input = input.trim();
    let target = target.to_lowercase();
    let target = target.trim();

    if input == target {
        return true;
    }

    if target.contains(input) || input.contains(target) {
        return true;
    }

    for (canonical, alternates) in NAME_VARIATIONS {
        if target.contains(canonical) && alternates.iter().any(|alt| input.contains(alt)) {
            return true;
        }
    }

    false
}

/// Find an area by name, or None
pub fn find_area<'a>(area_name: Option<&str>, areas: &'a [Area]) -> Option<&'a Area> {
    let area_name = area_name?;
    areas.iter().find(|area| fuzzy_match(area_name, &area.name))
}

/// Find a room by name, or None
pub fn find_room<'a>(room_name: Option<&str>, rooms: &'a [Room]) -> Option<&'a Room> {
    let room_name = room_name?;
    rooms.iter().find(|room| fuzzy_match(room_name, &room.name))
}

/// Whether a device's room id falls inside an area
fn room_in_area(room_id: Option<&str>, area: &Area) -> bool {
    match room_id {
        Some(room_id) => area.room_ids.iter().any(|id| id == room_id),
        None => false,
    }
}

/// Lights matching the area/room/device-name hints
pub fn matching_lights<'a>(hints: &TargetHints, topology: &'a TopologySnapshot) -> Vec<&'a Light> {
    let mut matched: Vec<&Light> = topology.lights.iter().collect();

    if let Some(room_hint) = hints.room.as_deref() {
        if let Some(room) = find_room(Some(room_hint), &topology.rooms) {
            matched.retain(|light| light.room_id.as_deref() == Some(room.id.as_str()));
        } else {
            // Fall back to fuzzy-matching the hint against each light's
            // resolved room name
            matched.retain(|light| {
                light
                    .room_id
                    .as_deref()
                    .and_then(|id| topology.room_name(id))
                    .map(|name| fuzzy_match(room_hint, name))
                    .unwrap_or(false)
            });
        }
    } else if let Some(area_hint) = hints.area.as_deref() {
        if let Some(area) = find_area(Some(area_hint), &topology.areas) {
            matched.retain(|light| room_in_area(light.room_id.as_deref(), area));
        }
    }

    if let Some(name_hint) = hints.device_name.as_deref() {
        matched.retain(|light| fuzzy_match(name_hint, &light.name));
    }

    matched
}

/// Thermostats matching the area/room hints
///
/// Thermostat hardware labels often drift from the room registry, so a room
/// hint gets a third strategy: fuzzy-matching the hint directly against each
/// thermostat's own name.
pub fn matching_thermostats<'a>(
    hints: &TargetHints,
    topology: &'a TopologySnapshot,
) -> Vec<&'a Thermostat> {
    let thermostats = &topology.thermostats;

    if let Some(room_hint) = hints.room.as_deref() {
        if let Some(room) = find_room(Some(room_hint), &topology.rooms) {
            let by_room_id: Vec<&Thermostat> = thermostats
                .iter()
                .filter(|t| t.room_id.as_deref() == Some(room.id.as_str()))
                .collect();
            if !by_room_id.is_empty() {
                return by_room_id;
            }
        }

        let by_room_name: Vec<&Thermostat> = thermostats
            .iter()
            .filter(|t| {
                t.room_id
                    .as_deref()
                    .and_then(|id| topology.room_name(id))
                    .map(|name| fuzzy_match(room_hint, name))
                    .unwrap_or(false)
            })
            .collect();
        if !by_room_name.is_empty() {
            return by_room_name;
        }

        // e.g. "Master Bedroom" matches "Master Suite Thermostat"
        return thermostats
            .iter()
            .filter(|t| fuzzy_match(room_hint, &t.name))
            .collect();
    }

    if let Some(area_hint) = hints.area.as_deref() {
        if let Some(area) = find_area(Some(area_hint), &topology.areas) {
            let by_area: Vec<&Thermostat> = thermostats
                .iter()
                .filter(|t| room_in_area(t.room_id.as_deref(), area))
                .collect();
            if !by_area.is_empty() {
                return by_area;
            }

            let by_name: Vec<&Thermostat> = thermostats
                .iter()
                .filter(|t| fuzzy_match(area_hint, &t.name))
                .collect();
            if !by_name.is_empty() {
                return by_name;
            }
        }
    }

    thermostats.iter().collect()
}

/// Media rooms matching the area/room hints
pub fn matching_media_rooms<'a>(
    hints: &TargetHints,
    topology: &'a TopologySnapshot,
) -> Vec<&'a MediaRoom> {
    let media_rooms = &topology.media_rooms;

    if let Some(room_hint) = hints.room.as_deref() {
        if let Some(room) = find_room(Some(room_hint), &topology.rooms) {
            return media_rooms
                .iter()
                .filter(|m| m.room_id.as_deref() == Some(room.id.as_str()))
                .collect();
        }
        return media_rooms
            .iter()
            .filter(|m| {
                m.room_id
                    .as_deref()
                    .and_then(|id| topology.room_name(id))
                    .map(|name| fuzzy_match(room_hint, name))
                    .unwrap_or(false)
            })
            .collect();
    }

    if let Some(area_hint) = hints.area.as_deref() {
        if let Some(area) = find_area(Some(area_hint), &topology.areas) {
            return media_rooms
                .iter()
                .filter(|m| room_in_area(m.room_id.as_deref(), area))
                .collect();
        }
    }

    media_rooms.iter().collect()
}

/// Find a scene by name, preferring scenes from the hinted room
pub fn find_scene<'a>(
    scene_name: &str,
    room_name: Option<&str>,
    topology: &'a TopologySnapshot,
) -> Option<&'a Scene> {
    if let Some(room) = find_room(room_name, &topology.rooms) {
        let room_scene = topology.scenes.iter().find(|s| {
            s.room_id.as_deref() == Some(room.id.as_str()) && fuzzy_match(scene_name, &s.name)
        });
        if room_scene.is_some() {
            return room_scene;
        }
    }

    topology
        .scenes
        .iter()
        .find(|s| fuzzy_match(scene_name, &s.name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FanMode, ThermostatMode};

    fn room(id: &str, name: &str, area_id: Option<&str>) -> Room {
        Room {
            id: id.to_string(),
            name: name.to_string(),
            area_id: area_id.map(str::to_string),
            area_name: None,
        }
    }

    fn light(id: &str, name: &str, room_id: Option<&str>) -> Light {
        Light {
            id: id.to_string(),
            name: name.to_string(),
            room_id: room_id.map(str::to_string),
            level: 0,
            is_on: false,
        }
    }

    fn thermostat(id: &str, name: &str, room_id: Option<&str>) -> Thermostat {
        Thermostat {
            id: id.to_string(),
            name: name.to_string(),
            room_id: room_id.map(str::to_string),
            current_temp: 70.0,
            heat_set_point: 70.0,
            cool_set_point: 75.0,
            mode: ThermostatMode::Auto,
            fan_mode: FanMode::Auto,
        }
    }

    fn topology() -> TopologySnapshot {
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
                    room_ids: vec!["r3".to_string()],
                },
            ],
            rooms: vec![
                room("r1", "Master Bedroom", Some("a1")),
                room("r2", "Guest Room", Some("a1")),
                room("r3", "Kitchen", Some("a2")),
            ],
            lights: vec![
                light("l1", "Master Pendant", Some("r1")),
                light("l2", "Guest Lamp", Some("r2")),
                light("l3", "Kitchen Cans", Some("r3")),
                light("l4", "Orphan Sconce", None),
            ],
            thermostats: vec![
                thermostat("t1", "Master Suite HVAC", Some("r1")),
                thermostat("t2", "Kitchen", Some("r3")),
            ],
            ..TopologySnapshot::default()
        }
    }

    #[test]
    fn fuzzy_match_cascade() {
        // exact
        assert!(fuzzy_match("Kitchen", "kitchen"));
        // substring either direction
        assert!(fuzzy_match("kitchen", "Kitchen Cans"));
        assert!(fuzzy_match("the kitchen lights", "Kitchen"));
        // alias table
        assert!(fuzzy_match("upstairs", "2nd Floor"));
        assert!(fuzzy_match("downstairs", "Lower Level"));
        // no match
        assert!(!fuzzy_match("garage", "Kitchen"));
    }

    #[test]
    fn room_hint_beats_area_hint() {
        let topology = topology();
        let hints = TargetHints {
            area: Some("2nd Floor".to_string()),
            room: Some("Kitchen".to_string()),
            device_name: None,
        };
        let matched = matching_lights(&hints, &topology);
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].id, "l3");
    }

    #[test]
    fn area_hint_via_alias() {
        let topology = topology();
        let matched = matching_lights(&TargetHints::area("upstairs"), &topology);
        let ids: Vec<&str> = matched.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["l1", "l2"]);
    }

    #[test]
    fn no_hints_matches_everything() {
        let topology = topology();
        assert_eq!(matching_lights(&TargetHints::all(), &topology).len(), 4);
    }

    #[test]
    fn device_name_filter_stacks_on_room() {
        let topology = topology();
        let hints = TargetHints {
            room: Some("Master Bedroom".to_string()),
            device_name: Some("pendant".to_string()),
            area: None,
        };
        let matched = matching_lights(&hints, &topology);
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].id, "l1");
    }

    #[test]
    fn unknown_room_yields_empty_not_error() {
        let topology = topology();
        assert!(matching_lights(&TargetHints::room("Garage"), &topology).is_empty());
    }

    #[test]
    fn thermostat_name_fallback() {
        let topology = topology();
        // "Master Bedroom" resolves to room r1, and t1 lives there
        let matched = matching_thermostats(&TargetHints::room("Master Bedroom"), &topology);
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].id, "t1");

        // A hint that misses the registry but matches the hardware label
        let matched = matching_thermostats(&TargetHints::room("Master Suite"), &topology);
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].id, "t1");
    }

    #[test]
    fn scene_prefers_hinted_room() {
        let mut topology = topology();
        topology.scenes = vec![
            Scene {
                id: "s1".to_string(),
                name: "Evening".to_string(),
                room_id: Some("r1".to_string()),
            },
            Scene {
                id: "s2".to_string(),
                name: "Evening".to_string(),
                room_id: Some("r3".to_string()),
            },
        ];
        let scene = find_scene("evening", Some("Kitchen"), &topology);
        assert_eq!(scene.map(|s| s.id.as_str()), Some("s2"));

        let scene = find_scene("evening", None, &topology);
        assert_eq!(scene.map(|s| s.id.as_str()), Some("s1"));
    }
}
