//! Reconciliation cache for device state
//!
//! Holds the last-known topology and device collections. Commands patch the
//! cache optimistically; every poll non-destructively merges fresh per-type
//! collections, and the poll unconditionally wins over optimistic patches —
//! that is the system's only conflict-resolution rule.
//!
//! A poll cycle that returns empty for every top-level collection is treated
//! as likely authentication expiry and triggers exactly one refresh-and-retry
//! behind a single-flight guard.

use crate::client::{AuthClient, ControllerClient};
use crate::error::Result;
use crate::model::{
    Area, DeviceCollections, DoorLock, Light, MediaRoom, Room, Scene, Sensor, Thermostat,
    TopologySnapshot,
};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Outcome of one fetch-and-merge pass
enum FetchOutcome {
    /// Collections merged and timestamp updated
    Merged,
    /// A poll was already in flight; nothing happened
    Skipped,
    /// Every top-level collection came back empty
    AllEmpty,
    /// Every fetch failed; nothing was merged
    Failed,
}

/// Last-known device state with poll reconciliation
pub struct DeviceCache {
    areas: RwLock<Vec<Area>>,
    rooms: RwLock<Vec<Room>>,
    lights: RwLock<Vec<Light>>,
    thermostats: RwLock<Vec<Thermostat>>,
    media_rooms: RwLock<Vec<MediaRoom>>,
    scenes: RwLock<Vec<Scene>>,
    door_locks: RwLock<Vec<DoorLock>>,
    sensors: RwLock<Vec<Sensor>>,

    last_update: RwLock<Option<DateTime<Utc>>>,
    error: RwLock<Option<String>>,

    /// In-flight poll guard; a re-entrant poll is skipped, never queued
    poll_in_flight: AtomicBool,
    /// Single-flight guard for the auth refresh path
    auth_refreshing: AtomicBool,
}

impl Default for DeviceCache {
    fn default() -> Self {
        Self {
            areas: RwLock::new(Vec::new()),
            rooms: RwLock::new(Vec::new()),
            lights: RwLock::new(Vec::new()),
            thermostats: RwLock::new(Vec::new()),
            media_rooms: RwLock::new(Vec::new()),
            scenes: RwLock::new(Vec::new()),
            door_locks: RwLock::new(Vec::new()),
            sensors: RwLock::new(Vec::new()),
            last_update: RwLock::new(None),
            error: RwLock::new(None),
            poll_in_flight: AtomicBool::new(false),
            auth_refreshing: AtomicBool::new(false),
        }
    }
}

impl DeviceCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Clone the current topology for matching and response generation
    pub async fn snapshot(&self) -> TopologySnapshot {
        TopologySnapshot {
            areas: self.areas.read().await.clone(),
            rooms: self.rooms.read().await.clone(),
            lights: self.lights.read().await.clone(),
            thermostats: self.thermostats.read().await.clone(),
            media_rooms: self.media_rooms.read().await.clone(),
            scenes: self.scenes.read().await.clone(),
            door_locks: self.door_locks.read().await.clone(),
            sensors: self.sensors.read().await.clone(),
        }
    }

    /// Restore a previously persisted topology (host-provided warm start)
    pub async fn hydrate(&self, topology: TopologySnapshot) {
        *self.areas.write().await = topology.areas;
        *self.rooms.write().await = topology.rooms;
        *self.lights.write().await = topology.lights;
        *self.thermostats.write().await = topology.thermostats;
        *self.media_rooms.write().await = topology.media_rooms;
        *self.scenes.write().await = topology.scenes;
        *self.door_locks.write().await = topology.door_locks;
        *self.sensors.write().await = topology.sensors;
    }

    /// Timestamp of the last successful merge
    pub async fn last_update(&self) -> Option<DateTime<Utc>> {
        *self.last_update.read().await
    }

    /// Current cache-level error, if any
    pub async fn error(&self) -> Option<String> {
        self.error.read().await.clone()
    }

    /// Run one poll cycle against the controller
    ///
    /// Returns `Ok(true)` when fresh data was merged. A re-entrant call while
    /// another poll is in flight returns `Ok(false)` immediately. Transport
    /// failures are recorded as the cache error and never clear cached data.
    pub async fn poll_once(
        &self,
        client: &dyn ControllerClient,
        auth: &dyn AuthClient,
    ) -> Result<bool> {
        match self.fetch_and_merge(client).await? {
            FetchOutcome::Merged => Ok(true),
            FetchOutcome::Skipped | FetchOutcome::Failed => Ok(false),
            FetchOutcome::AllEmpty => self.refresh_and_retry(client, auth).await,
        }
    }

    /// All collections empty: likely auth expiry, not an empty installation.
    /// Attempt exactly one refresh-and-retry behind the single-flight guard.
    async fn refresh_and_retry(
        &self,
        client: &dyn ControllerClient,
        auth: &dyn AuthClient,
    ) -> Result<bool> {
        if self
            .auth_refreshing
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("auth refresh already in flight, skipping");
            return Ok(false);
        }

        warn!("all collections empty, treating as expired session and refreshing auth");
        let refreshed = auth.refresh_auth().await.unwrap_or(false);
        self.auth_refreshing.store(false, Ordering::SeqCst);

        if !refreshed {
            auth.invalidate_auth().await;
            *self.error.write().await = Some("Session expired. Please log in again.".to_string());
            return Ok(false);
        }

        // One retry; a still-empty result merges nothing and stands as-is
        match self.fetch_and_merge(client).await? {
            FetchOutcome::Merged => Ok(true),
            _ => Ok(false),
        }
    }

    /// Fetch all collections concurrently and merge the non-empty ones
    async fn fetch_and_merge(&self, client: &dyn ControllerClient) -> Result<FetchOutcome> {
        if self
            .poll_in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("poll already in flight, skipping");
            return Ok(FetchOutcome::Skipped);
        }

        let outcome = self.fetch_and_merge_inner(client).await;
        self.poll_in_flight.store(false, Ordering::SeqCst);
        outcome
    }

    async fn fetch_and_merge_inner(&self, client: &dyn ControllerClient) -> Result<FetchOutcome> {
        let (areas_res, rooms_res, devices_res, scenes_res) = tokio::join!(
            client.get_areas(),
            client.get_rooms(),
            client.get_devices(),
            client.get_scenes(),
        );

        let any_ok = areas_res.is_ok()
            || rooms_res.is_ok()
            || devices_res.is_ok()
            || scenes_res.is_ok();

        let mut fetch_errors: Vec<String> = Vec::new();
        let mut record_error = |label: &str, e: &crate::error::HomeError| {
            warn!("{label} fetch failed: {e}");
            fetch_errors.push(format!("{label}: {e}"));
        };

        let areas = areas_res.unwrap_or_else(|e| {
            record_error("areas", &e);
            Vec::new()
        });
        let rooms = rooms_res.unwrap_or_else(|e| {
            record_error("rooms", &e);
            Vec::new()
        });
        let devices = devices_res.unwrap_or_else(|e| {
            record_error("devices", &e);
            DeviceCollections::default()
        });
        let scenes = scenes_res.unwrap_or_else(|e| {
            record_error("scenes", &e);
            Vec::new()
        });

        // Nothing fetched at all: keep the stale data and the old timestamp,
        // surface the failure as the cache error
        if !any_ok {
            *self.error.write().await = Some(fetch_errors.join("; "));
            return Ok(FetchOutcome::Failed);
        }

        // Auth expiry manifests as empty 200 responses, not transport errors;
        // do not run the heuristic over a failed fetch.
        let all_empty = areas.is_empty()
            && rooms.is_empty()
            && devices.lights.is_empty()
            && scenes.is_empty();
        if all_empty && fetch_errors.is_empty() {
            return Ok(FetchOutcome::AllEmpty);
        }

        let areas = link_areas_to_rooms(areas, &rooms);

        // Replace each collection only when the fetched version is non-empty,
        // so one failing endpoint cannot blank out good cached data.
        if !rooms.is_empty() {
            *self.rooms.write().await = rooms;
        }
        if !areas.is_empty() {
            *self.areas.write().await = areas;
        }
        if !devices.lights.is_empty() {
            *self.lights.write().await = devices.lights;
        }
        if !devices.thermostats.is_empty() {
            *self.thermostats.write().await = devices.thermostats;
        }
        if !devices.media_rooms.is_empty() {
            *self.media_rooms.write().await = devices.media_rooms;
        }
        if !devices.door_locks.is_empty() {
            *self.door_locks.write().await = devices.door_locks;
        }
        if !devices.sensors.is_empty() {
            *self.sensors.write().await = devices.sensors;
        }
        if !scenes.is_empty() {
            *self.scenes.write().await = scenes;
        }

        *self.last_update.write().await = Some(Utc::now());
        *self.error.write().await = if fetch_errors.is_empty() {
            None
        } else {
            Some(fetch_errors.join("; "))
        };

        Ok(FetchOutcome::Merged)
    }

    /// Optimistic per-field patch of a cached light
    pub async fn update_light(&self, id: &str, patch: impl FnOnce(&mut Light)) {
        let mut lights = self.lights.write().await;
        if let Some(light) = lights.iter_mut().find(|l| l.id == id) {
            patch(light);
        }
    }

    /// Optimistic per-field patch of a cached thermostat
    pub async fn update_thermostat(&self, id: &str, patch: impl FnOnce(&mut Thermostat)) {
        let mut thermostats = self.thermostats.write().await;
        if let Some(thermostat) = thermostats.iter_mut().find(|t| t.id == id) {
            patch(thermostat);
        }
    }

    /// Optimistic per-field patch of a cached media room
    pub async fn update_media_room(&self, id: &str, patch: impl FnOnce(&mut MediaRoom)) {
        let mut media_rooms = self.media_rooms.write().await;
        if let Some(media_room) = media_rooms.iter_mut().find(|m| m.id == id) {
            patch(media_room);
        }
    }

    /// Optimistic per-field patch of a cached door lock
    pub async fn update_door_lock(&self, id: &str, patch: impl FnOnce(&mut DoorLock)) {
        let mut door_locks = self.door_locks.write().await;
        if let Some(lock) = door_locks.iter_mut().find(|d| d.id == id) {
            patch(lock);
        }
    }
}

/// Ensure areas carry their member room ids
///
/// Some controller firmware returns bare areas and leaves the area linkage on
/// each room; in that case the membership lists are rebuilt from the rooms.
fn link_areas_to_rooms(mut areas: Vec<Area>, rooms: &[Room]) -> Vec<Area> {
    let any_linked = areas.iter().any(|a| !a.room_ids.is_empty());
    if any_linked || rooms.is_empty() {
        return areas;
    }

    let mut derived: HashMap<String, Area> = HashMap::new();
    let mut order: Vec<String> = Vec::new();
    for room in rooms {
        let (Some(area_id), Some(area_name)) = (&room.area_id, &room.area_name) else {
            continue;
        };
        let entry = derived.entry(area_id.clone()).or_insert_with(|| {
            order.push(area_id.clone());
            Area {
                id: area_id.clone(),
                name: area_name.clone(),
                room_ids: Vec::new(),
            }
        });
        entry.room_ids.push(room.id.clone());
    }

    if areas.is_empty() {
        return order
            .into_iter()
            .filter_map(|id| derived.remove(&id))
            .collect();
    }

    // Keep areas the endpoint knew about (possibly without rooms) and attach
    // the derived membership where ids line up.
    for area in &mut areas {
        if let Some(from_rooms) = derived.get(&area.id) {
            area.room_ids = from_rooms.room_ids.clone();
        }
    }
    areas
}
