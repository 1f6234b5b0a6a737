//! Deterministic natural-language response generation
//!
//! Phrasing is fixed so identical intents against identical state always
//! produce identical text: singular phrasing when exactly one device matched
//! and changed, "<changed> of <total>" otherwise, and an explicit
//! "couldn't find" message for zero matches. Numeric parameters are echoed
//! verbatim.

use crate::intent::{ClimateAction, LightAction, MediaAction, TargetHints};
use crate::model::{Light, MediaRoom, Thermostat};

fn plural(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

/// Target description used by climate and media responses
pub(crate) fn climate_target(target: &TargetHints) -> String {
    target
        .room
        .clone()
        .or_else(|| target.area.clone())
        .unwrap_or_else(|| "the whole house".to_string())
}

/// Response text for a light command
pub(crate) fn light_response(
    action: &LightAction,
    target: &TargetHints,
    matched: &[&Light],
    changed: &[&Light],
) -> String {
    let target_desc = target.describe();
    let total = matched.len();

    if total == 1 && changed.len() == 1 {
        let name = &changed[0].name;
        return match action {
            LightAction::On => format!("Turned on {name}."),
            LightAction::Off => format!("Turned off {name}."),
            LightAction::SetBrightness { brightness } => format!("Set {name} to {brightness}%."),
        };
    }

    if total == 0 {
        let missing = target.device_name.as_deref().unwrap_or(&target_desc);
        return format!("I couldn't find any lights matching \"{missing}\".");
    }

    match action {
        LightAction::On => {
            if changed.is_empty() {
                format!("All {total} lights in {target_desc} were already on.")
            } else {
                format!(
                    "Turned on {} of {total} lights in {target_desc}.",
                    changed.len()
                )
            }
        }
        LightAction::Off => {
            if changed.is_empty() {
                format!("All {total} lights in {target_desc} were already off.")
            } else {
                format!(
                    "Turned off {} of {total} lights in {target_desc}.",
                    changed.len()
                )
            }
        }
        LightAction::SetBrightness { brightness } => format!(
            "Set {} lights in {target_desc} to {brightness}% brightness.",
            changed.len()
        ),
    }
}

/// Response text for a climate command
pub(crate) fn climate_response(
    action: &ClimateAction,
    target: &TargetHints,
    matched: &[&Thermostat],
    changed: &[&Thermostat],
) -> String {
    let target_desc = climate_target(target);
    let count = changed.len();

    if matched.is_empty() {
        return format!("I couldn't find any thermostats in {target_desc}.");
    }

    match action {
        ClimateAction::SetTemperature { temperature } => format!(
            "Set {count} thermostat{} in {target_desc} to {temperature}°F.",
            plural(count)
        ),
        ClimateAction::SetMode { mode } => format!(
            "Set {count} thermostat{} in {target_desc} to {} mode.",
            plural(count),
            mode.as_str()
        ),
    }
}

/// Response text for a media command
pub(crate) fn media_response(
    action: &MediaAction,
    target: &TargetHints,
    matched: &[&MediaRoom],
    changed: &[&MediaRoom],
) -> String {
    let target_desc = climate_target(target);
    let count = changed.len();

    if matched.is_empty() {
        return format!("I couldn't find any media rooms in {target_desc}.");
    }

    match action {
        MediaAction::PowerOn => format!(
            "Powered on {count} media room{} in {target_desc}.",
            plural(count)
        ),
        MediaAction::PowerOff => format!(
            "Powered off {count} media room{} in {target_desc}.",
            plural(count)
        ),
        MediaAction::SetVolume { volume } => format!(
            "Set volume to {volume}% in {count} media room{}.",
            plural(count)
        ),
        MediaAction::Mute => format!(
            "Muted {count} media room{} in {target_desc}.",
            plural(count)
        ),
        MediaAction::Unmute => format!(
            "Unmuted {count} media room{} in {target_desc}.",
            plural(count)
        ),
        MediaAction::SelectSource { source } => format!(
            "Switched {count} media room{} to {source}.",
            plural(count)
        ),
    }
}
