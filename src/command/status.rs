//! Read-only status reports
//!
//! Produces a multi-line report over the cached topology. No snapshots are
//! captured and nothing is dispatched to the controller.

use super::FamilyOutcome;
use crate::history::CommandDetails;
use crate::intent::{StatusKind, TargetHints};
use crate::matching::{matching_lights, matching_media_rooms, matching_thermostats};
use crate::model::{level_to_percent, Light, ThermostatMode, TopologySnapshot};

const MAX_LISTED_LIGHTS: usize = 10;

fn light_is_on(light: &Light) -> bool {
    light.is_on || light.level > 0
}

pub(super) fn execute(
    kind: StatusKind,
    target: &TargetHints,
    topology: &TopologySnapshot,
) -> FamilyOutcome {
    let mut parts: Vec<String> = Vec::new();
    let mut total = 0usize;

    if matches!(kind, StatusKind::Lights | StatusKind::All) {
        total += lights_section(&mut parts, target, topology);
    }
    if matches!(kind, StatusKind::Climate | StatusKind::All) {
        total += climate_section(&mut parts, target, topology);
    }
    if matches!(kind, StatusKind::Media | StatusKind::All) {
        total += media_section(&mut parts, target, topology);
    }

    FamilyOutcome::read_only(
        parts.join("\n"),
        CommandDetails {
            total_devices: total,
            changed_devices: 0,
            target: target.describe(),
            failed_devices: Vec::new(),
        },
    )
}

/// Whole-house light queries break down by area; targeted queries list the
/// individual lights that are on.
fn lights_section(
    parts: &mut Vec<String>,
    target: &TargetHints,
    topology: &TopologySnapshot,
) -> usize {
    if target.area.is_none() && target.room.is_none() {
        let all_lights = &topology.lights;
        let on: Vec<&Light> = all_lights.iter().filter(|l| light_is_on(l)).collect();

        if on.is_empty() {
            parts.push(format!(
                "All {} lights in the house are off.",
                all_lights.len()
            ));
        } else {
            parts.push(format!(
                "{} of {} lights are on:",
                on.len(),
                all_lights.len()
            ));
            for area in &topology.areas {
                let area_on: Vec<&Light> = on
                    .iter()
                    .copied()
                    .filter(|l| {
                        l.room_id
                            .as_deref()
                            .map(|id| area.room_ids.iter().any(|r| r == id))
                            .unwrap_or(false)
                    })
                    .collect();
                if area_on.is_empty() {
                    continue;
                }

                let mut room_counts: Vec<(String, usize)> = Vec::new();
                for light in &area_on {
                    let Some(name) = light.room_id.as_deref().and_then(|id| topology.room_name(id))
                    else {
                        continue;
                    };
                    match room_counts.iter_mut().find(|(n, _)| n == name) {
                        Some((_, count)) => *count += 1,
                        None => room_counts.push((name.to_string(), 1)),
                    }
                }
                let room_details = room_counts
                    .iter()
                    .map(|(name, count)| format!("{name} ({count})"))
                    .collect::<Vec<_>>()
                    .join(", ");
                parts.push(format!(
                    "• {}: {} lights - {room_details}",
                    area.name,
                    area_on.len()
                ));
            }
        }
        return all_lights.len();
    }

    let target_desc = target
        .room
        .clone()
        .or_else(|| target.area.clone())
        .unwrap_or_else(|| "the whole house".to_string());
    let matched = matching_lights(target, topology);
    let on: Vec<&Light> = matched.iter().copied().filter(|l| light_is_on(l)).collect();

    if on.is_empty() {
        parts.push(format!(
            "All {} lights in {target_desc} are off.",
            matched.len()
        ));
    } else {
        parts.push(format!(
            "{} of {} lights on in {target_desc}:",
            on.len(),
            matched.len()
        ));
        for light in on.iter().take(MAX_LISTED_LIGHTS) {
            let brightness = if light.level > 0 {
                level_to_percent(light.level)
            } else {
                100
            };
            parts.push(format!("• {} ({brightness}%)", light.name));
        }
        if on.len() > MAX_LISTED_LIGHTS {
            parts.push(format!("• ...and {} more", on.len() - MAX_LISTED_LIGHTS));
        }
    }
    matched.len()
}

fn climate_section(
    parts: &mut Vec<String>,
    target: &TargetHints,
    topology: &TopologySnapshot,
) -> usize {
    let target_desc = target
        .room
        .clone()
        .or_else(|| target.area.clone())
        .unwrap_or_else(|| "the house".to_string());
    let thermostats = matching_thermostats(target, topology);
    if thermostats.is_empty() {
        return 0;
    }

    if let [t] = thermostats.as_slice() {
        let set_point_info = match t.mode {
            ThermostatMode::Heat => format!("set to {}°F", t.heat_set_point),
            ThermostatMode::Cool => format!("set to {}°F", t.cool_set_point),
            ThermostatMode::Auto => {
                format!("heat: {}°F, cool: {}°F", t.heat_set_point, t.cool_set_point)
            }
            ThermostatMode::Off => "off".to_string(),
        };
        parts.push(format!(
            "{}: {}°F, {} mode, {set_point_info}",
            t.name,
            t.current_temp,
            t.mode.as_str()
        ));
    } else {
        let avg = (thermostats.iter().map(|t| t.current_temp).sum::<f64>()
            / thermostats.len() as f64)
            .round();
        parts.push(format!("Climate in {target_desc} (avg {avg}°F):"));
        for t in &thermostats {
            parts.push(format!(
                "• {}: {}°F ({})",
                t.name,
                t.current_temp,
                t.mode.as_str()
            ));
        }
    }
    thermostats.len()
}

fn media_section(
    parts: &mut Vec<String>,
    target: &TargetHints,
    topology: &TopologySnapshot,
) -> usize {
    let media_rooms = matching_media_rooms(target, topology);
    if media_rooms.is_empty() {
        return 0;
    }

    let playing: Vec<_> = media_rooms
        .iter()
        .copied()
        .filter(|m| m.is_powered_on)
        .collect();
    if playing.is_empty() {
        parts.push(format!("All {} media rooms are off.", media_rooms.len()));
    } else {
        parts.push(format!("{} media rooms playing:", playing.len()));
        for m in &playing {
            match m.current_provider_name() {
                Some(source) => parts.push(format!("• {} - {source}", m.name)),
                None => parts.push(format!("• {}", m.name)),
            }
        }
    }
    media_rooms.len()
}
