//! Climate command execution

use super::{response, CommandExecutor, FamilyOutcome};
use crate::history::{CommandDetails, DeviceStateSnapshot};
use crate::intent::{ClimateAction, TargetHints};
use crate::matching::matching_thermostats;
use crate::model::{Thermostat, ThermostatMode, TopologySnapshot};
use futures::future::join_all;

/// Setpoint payload for a temperature change, chosen by the thermostat's
/// current mode: heat mode drives the heat setpoint, cool mode the cool
/// setpoint, anything else both.
fn set_point_payload(thermostat: &Thermostat, temperature: f64) -> (Option<f64>, Option<f64>) {
    match thermostat.mode {
        ThermostatMode::Heat => (Some(temperature), None),
        ThermostatMode::Cool => (None, Some(temperature)),
        _ => (Some(temperature), Some(temperature)),
    }
}

fn would_change(action: &ClimateAction, thermostat: &Thermostat) -> bool {
    match action {
        ClimateAction::SetTemperature { temperature } => {
            let (heat, cool) = set_point_payload(thermostat, *temperature);
            heat.is_some_and(|h| thermostat.heat_set_point != h)
                || cool.is_some_and(|c| thermostat.cool_set_point != c)
        }
        ClimateAction::SetMode { mode } => thermostat.mode != *mode,
    }
}

pub(super) async fn execute(
    executor: &CommandExecutor,
    action: &ClimateAction,
    target: &TargetHints,
    topology: &TopologySnapshot,
) -> FamilyOutcome {
    let matched = matching_thermostats(target, topology);
    let changed: Vec<&Thermostat> = matched
        .iter()
        .copied()
        .filter(|t| would_change(action, t))
        .collect();

    let mut details = CommandDetails {
        total_devices: matched.len(),
        changed_devices: changed.len(),
        target: response::climate_target(target),
        failed_devices: Vec::new(),
    };

    if matched.is_empty() {
        return FamilyOutcome::read_only(
            response::climate_response(action, target, &matched, &changed),
            details,
        );
    }

    let snapshots: Vec<DeviceStateSnapshot> = changed
        .iter()
        .map(|t| DeviceStateSnapshot::Thermostat {
            id: t.id.clone(),
            mode: t.mode,
            heat_set_point: t.heat_set_point,
            cool_set_point: t.cool_set_point,
            fan_mode: t.fan_mode,
        })
        .collect();

    for thermostat in &changed {
        match action {
            ClimateAction::SetTemperature { temperature } => {
                let (heat, cool) = set_point_payload(thermostat, *temperature);
                executor
                    .cache()
                    .update_thermostat(&thermostat.id, |t| {
                        if let Some(heat) = heat {
                            t.heat_set_point = heat;
                        }
                        if let Some(cool) = cool {
                            t.cool_set_point = cool;
                        }
                    })
                    .await;
            }
            ClimateAction::SetMode { mode } => {
                executor
                    .cache()
                    .update_thermostat(&thermostat.id, |t| t.mode = *mode)
                    .await;
            }
        }
    }

    let dispatches = changed.iter().map(|thermostat| {
        let client = executor.client();
        async move {
            match action {
                ClimateAction::SetTemperature { temperature } => {
                    let (heat, cool) = set_point_payload(thermostat, *temperature);
                    client
                        .set_thermostat_set_point(&thermostat.id, heat, cool)
                        .await
                        .unwrap_or(false)
                }
                ClimateAction::SetMode { mode } => client
                    .set_thermostat_mode(&thermostat.id, *mode)
                    .await
                    .unwrap_or(false),
            }
        }
    });
    let results = join_all(dispatches).await;

    details.failed_devices = changed
        .iter()
        .zip(&results)
        .filter(|(_, ok)| !**ok)
        .map(|(t, _)| t.id.clone())
        .collect();

    FamilyOutcome {
        response: response::climate_response(action, target, &matched, &changed),
        snapshots,
        details,
    }
}
