#![allow(dead_code)]

use chrono::{DateTime, Duration, Utc};
use mapscan::common::Location;
use mapscan::config::{Config, DbBackend};
use mapscan::database::{Gym, ScannedLocation, Sighting, Stop, Store, StoreOptions, Team};
use serde_json::{Value, json};

pub async fn memory_store(options: StoreOptions) -> Store {
    Store::connect(
        &DbBackend::Sqlite {
            path: ":memory:".into(),
        },
        1,
        options,
    )
    .await
    .expect("in-memory store")
}

pub fn test_config() -> Config {
    Config::from_lookup(|key| match key {
        "DB_PATH" => Some(":memory:".to_string()),
        _ => None,
    })
    .expect("default config")
}

pub fn sighting(id: u64, kind_id: i64, lat: f64, lng: f64, disappear: DateTime<Utc>) -> Sighting {
    Sighting {
        encounter_id: Sighting::encode_encounter_id(id),
        spawnpoint_id: format!("sp{}", id),
        kind_id,
        latitude: lat,
        longitude: lng,
        disappear_time: disappear,
    }
}

pub fn stop(id: &str, lat: f64, lng: f64) -> Stop {
    Stop::new(
        id.to_string(),
        true,
        Location::new(lat, lng),
        Utc::now() - Duration::hours(1),
        None,
    )
}

pub fn gym(id: &str, team: Team, lat: f64, lng: f64) -> Gym {
    Gym {
        gym_id: id.to_string(),
        team_id: team,
        guard_kind_id: 59,
        gym_points: 1200,
        enabled: true,
        latitude: lat,
        longitude: lng,
        last_modified: Utc::now() - Duration::hours(1),
    }
}

pub fn scanned(lat: f64, lng: f64, at: DateTime<Utc>) -> ScannedLocation {
    ScannedLocation::new(Location::new(lat, lng), at)
}

/// 未来 ttl 毫秒后消失的野生精灵条目
pub fn creature_entry(encounter_id: u64, kind_id: i64, lat: f64, lng: f64, ttl_ms: i64) -> Value {
    json!({
        "encounter_id": encounter_id,
        "spawnpoint_id": format!("sp{}", encounter_id),
        "creature_data": {"kind_id": kind_id},
        "latitude": lat,
        "longitude": lng,
        "last_modified_timestamp_ms": Utc::now().timestamp_millis(),
        "time_till_hidden_ms": ttl_ms
    })
}

pub fn stop_entry(id: &str, lat: f64, lng: f64, lure: bool) -> Value {
    let mut entry = json!({
        "id": id,
        "type": 1,
        "enabled": true,
        "latitude": lat,
        "longitude": lng,
        "last_modified_timestamp_ms": Utc::now().timestamp_millis()
    });
    if lure {
        entry["lure_info"] = json!({
            "lure_expires_timestamp_ms": (Utc::now() + Duration::minutes(30)).timestamp_millis(),
            "active_creature_id": 129
        });
    }
    entry
}

pub fn gym_entry(id: &str, team: i64, lat: f64, lng: f64) -> Value {
    json!({
        "id": id,
        "enabled": true,
        "latitude": lat,
        "longitude": lng,
        "last_modified_timestamp_ms": Utc::now().timestamp_millis(),
        "owned_by_team": team,
        "guard_creature_id": 143,
        "points": 2000
    })
}

pub fn snapshot(cells: Vec<Value>) -> Value {
    json!({"responses": {"MAP_OBJECTS": {"cells": cells}}})
}
