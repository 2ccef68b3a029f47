// 快照解析
// 把一次扫描的原始快照转成各类实体，再按类型批量入库

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::raw::{
    FortKind, RawCell, RawFort, RawSnapshot, RawWildCreature, entry_id, fort_kind,
};
use crate::common::Location;
use crate::config::{Config, ParseFlags};
use crate::database::models::stop::Lure;
use crate::database::{Gym, ScannedLocation, Sighting, Stop, Store, Team};
use crate::error::{IngestError, ParseError};
use crate::utils::millis_to_utc;

/// 第一轮扫描的前 50 步不解析据点
const FORT_WARMUP_STEPS: u32 = 50;

/// 扫描进度，由扫描调度方提供
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScanStep {
    pub iteration_num: u32,
    pub step: u32,
    pub location: Location,
}

impl ScanStep {
    pub fn new(iteration_num: u32, step: u32, location: Location) -> Self {
        Self {
            iteration_num,
            step,
            location,
        }
    }

    /// 是否解析补给站和道馆
    pub fn forts_enabled(&self) -> bool {
        self.iteration_num > 0 || self.step > FORT_WARMUP_STEPS
    }
}

/// 一次解析的结果，只在本次调用内有效
#[derive(Debug)]
pub struct ParsedMap {
    /// 以原始遭遇ID为键
    pub sightings: HashMap<u64, Sighting>,
    pub stops: HashMap<String, Stop>,
    pub gyms: HashMap<String, Gym>,
    pub scanned: ScannedLocation,
    /// 解析失败的条目
    pub rejected: Vec<ParseError>,
}

#[derive(Debug, Clone, Copy)]
pub struct SnapshotParser {
    flags: ParseFlags,
    /// 有坏条目时整次调用失败
    strict: bool,
}

impl SnapshotParser {
    pub fn new(flags: ParseFlags, strict: bool) -> Self {
        Self { flags, strict }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.parse_flags, config.strict_parsing)
    }

    pub fn flags(&self) -> ParseFlags {
        self.flags
    }

    /// 只解析，不入库
    pub fn parse(
        &self,
        snapshot: &Value,
        scan: &ScanStep,
        now: DateTime<Utc>,
    ) -> Result<ParsedMap, ParseError> {
        let raw = RawSnapshot::deserialize_ref(snapshot)?;
        let flags = self.flags;
        let forts_enabled = scan.forts_enabled();

        let mut parsed = ParsedMap {
            sightings: HashMap::new(),
            stops: HashMap::new(),
            gyms: HashMap::new(),
            scanned: ScannedLocation::new(scan.location, now),
            rejected: Vec::new(),
        };

        for (cell_index, cell) in raw.responses.map_objects.cells.iter().enumerate() {
            let cell: RawCell = match entry(cell, "cell", cell_index, "s2_cell_id") {
                Ok(cell) => cell,
                Err(e) => {
                    parsed.rejected.push(e);
                    continue;
                }
            };

            if flags.sightings {
                for entry in &cell.wild_creatures {
                    match parse_sighting(entry, cell_index, now) {
                        Ok(Some((raw_id, sighting))) => {
                            parsed.sightings.insert(raw_id, sighting);
                        }
                        Ok(None) => {}
                        Err(e) => parsed.rejected.push(e),
                    }
                }
            }

            if !forts_enabled {
                continue;
            }

            for entry in &cell.forts {
                let result = match fort_kind(entry) {
                    FortKind::Stop if flags.stops => parse_stop(entry, cell_index)
                        .map(|stop| {
                            parsed.stops.insert(stop.stop_id.clone(), stop);
                        }),
                    FortKind::Gym if flags.gyms => parse_gym(entry, cell_index).map(|gym| {
                        parsed.gyms.insert(gym.gym_id.clone(), gym);
                    }),
                    _ => Ok(()),
                };
                if let Err(e) = result {
                    parsed.rejected.push(e);
                }
            }
        }

        Ok(parsed)
    }

    /// 解析并入库
    ///
    /// 每类实体一次批量写入，扫描位置总是会写入。
    pub async fn ingest(
        &self,
        store: &Store,
        snapshot: &Value,
        scan: &ScanStep,
    ) -> Result<ParsedMap, IngestError> {
        let flags = self.flags;
        let mut parsed = self.parse(snapshot, scan, Utc::now())?;

        if !parsed.rejected.is_empty() {
            if self.strict {
                return Err(parsed.rejected.swap_remove(0).into());
            }
            for e in &parsed.rejected {
                tracing::warn!("Skipping entry: {}", e);
            }
        }

        if flags.sightings && !parsed.sightings.is_empty() {
            tracing::info!("Upserting {} sightings", parsed.sightings.len());
            store.bulk_upsert(parsed.sightings.values()).await?;
        }

        if flags.stops && !parsed.stops.is_empty() {
            tracing::info!("Upserting {} stops", parsed.stops.len());
            store.bulk_upsert(parsed.stops.values()).await?;
        }

        if flags.gyms && !parsed.gyms.is_empty() {
            tracing::info!("Upserting {} gyms", parsed.gyms.len());
            store.bulk_upsert(parsed.gyms.values()).await?;
        }

        store.bulk_upsert([&parsed.scanned]).await?;

        Ok(parsed)
    }
}

impl RawSnapshot {
    fn deserialize_ref(snapshot: &Value) -> Result<Self, ParseError> {
        Self::deserialize(snapshot).map_err(ParseError::Shape)
    }
}

fn entry<T: DeserializeOwned>(
    value: &Value,
    kind: &'static str,
    cell: usize,
    id_field: &str,
) -> Result<T, ParseError> {
    T::deserialize(value).map_err(|source| ParseError::Entry {
        kind,
        cell,
        id: entry_id(value, id_field),
        source,
    })
}

fn timestamp(
    ms: i64,
    kind: &'static str,
    cell: usize,
    id: &str,
) -> Result<DateTime<Utc>, ParseError> {
    millis_to_utc(ms).ok_or_else(|| ParseError::Invalid {
        kind,
        cell,
        id: id.to_string(),
        reason: format!("timestamp {} out of range", ms),
    })
}

/// 已经消失的记录返回 None
fn parse_sighting(
    value: &Value,
    cell: usize,
    now: DateTime<Utc>,
) -> Result<Option<(u64, Sighting)>, ParseError> {
    let raw: RawWildCreature = entry(value, "sighting", cell, "encounter_id")?;
    let encounter_id = Sighting::encode_encounter_id(raw.encounter_id);
    let disappear_ms = raw
        .last_modified_timestamp_ms
        .saturating_add(raw.time_till_hidden_ms);
    let disappear_time = timestamp(disappear_ms, "sighting", cell, &encounter_id)?;

    if disappear_time <= now {
        tracing::debug!("Sighting {} already despawned, skipping", encounter_id);
        return Ok(None);
    }

    tracing::debug!(
        kind_id = raw.creature_data.kind_id,
        latitude = raw.latitude,
        longitude = raw.longitude,
        remaining_secs = (disappear_time - now).num_seconds(),
        "Sighting {}",
        encounter_id
    );

    Ok(Some((
        raw.encounter_id,
        Sighting {
            encounter_id,
            spawnpoint_id: raw.spawnpoint_id,
            kind_id: raw.creature_data.kind_id,
            latitude: raw.latitude,
            longitude: raw.longitude,
            disappear_time,
        },
    )))
}

fn parse_stop(value: &Value, cell: usize) -> Result<Stop, ParseError> {
    let raw: RawFort = entry(value, "stop", cell, "id")?;
    let last_modified = timestamp(raw.last_modified_timestamp_ms, "stop", cell, &raw.id)?;
    let lure = match raw.lure_info {
        Some(info) => Some(Lure {
            expiration: timestamp(info.lure_expires_timestamp_ms, "stop", cell, &raw.id)?,
            active_kind_id: info.active_creature_id,
        }),
        None => None,
    };

    Ok(Stop::new(
        raw.id,
        raw.enabled,
        Location::new(raw.latitude, raw.longitude),
        last_modified,
        lure,
    ))
}

fn parse_gym(value: &Value, cell: usize) -> Result<Gym, ParseError> {
    let raw: RawFort = entry(value, "gym", cell, "id")?;
    let last_modified = timestamp(raw.last_modified_timestamp_ms, "gym", cell, &raw.id)?;
    let team_id =
        Team::try_from(raw.owned_by_team.unwrap_or(0)).map_err(|reason| ParseError::Invalid {
            kind: "gym",
            cell,
            id: raw.id.clone(),
            reason,
        })?;

    Ok(Gym {
        gym_id: raw.id,
        team_id,
        guard_kind_id: raw.guard_creature_id.unwrap_or(0),
        gym_points: raw.points.unwrap_or(0),
        enabled: raw.enabled,
        latitude: raw.latitude,
        longitude: raw.longitude,
        last_modified,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        millis_to_utc(1_469_000_000_000).unwrap()
    }

    fn creature(encounter_id: u64, kind_id: i64, hidden_ms: i64) -> Value {
        json!({
            "encounter_id": encounter_id,
            "spawnpoint_id": "89c25a1",
            "creature_data": {"kind_id": kind_id},
            "latitude": 40.7589,
            "longitude": -73.9851,
            "last_modified_timestamp_ms": 1_469_000_000_000i64,
            "time_till_hidden_ms": hidden_ms
        })
    }

    fn snapshot(cells: Vec<Value>) -> Value {
        json!({"responses": {"MAP_OBJECTS": {"cells": cells}}})
    }

    fn forts_snapshot() -> Value {
        snapshot(vec![json!({
            "forts": [
                {
                    "id": "stop-lured", "type": 1, "enabled": true,
                    "latitude": 40.1, "longitude": -73.1,
                    "last_modified_timestamp_ms": 1_468_999_000_000i64,
                    "lure_info": {
                        "lure_expires_timestamp_ms": 1_469_001_800_000i64,
                        "active_creature_id": 129
                    }
                },
                {
                    "id": "stop-plain", "type": 1, "enabled": false,
                    "latitude": 40.2, "longitude": -73.2,
                    "last_modified_timestamp_ms": 1_468_999_000_000i64
                },
                {
                    "id": "gym-1", "enabled": true,
                    "latitude": 40.3, "longitude": -73.3,
                    "last_modified_timestamp_ms": 1_468_999_000_000i64,
                    "owned_by_team": 2, "guard_creature_id": 149, "points": 4000
                },
                {
                    "id": "other", "type": 2, "enabled": true,
                    "latitude": 40.4, "longitude": -73.4,
                    "last_modified_timestamp_ms": 1_468_999_000_000i64
                }
            ]
        })])
    }

    fn parser() -> SnapshotParser {
        SnapshotParser::new(ParseFlags::default(), true)
    }

    fn at(iteration_num: u32, step: u32) -> ScanStep {
        ScanStep::new(iteration_num, step, Location::new(40.0, -73.0))
    }

    #[test]
    fn disappear_time_is_last_modified_plus_hidden() {
        let parsed = parser()
            .parse(&snapshot(vec![json!({"wild_creatures": [creature(42, 16, 600_000)]})]), &at(0, 1), now())
            .unwrap();

        let sighting = &parsed.sightings[&42];
        assert_eq!(sighting.encounter_id, "42");
        assert_eq!(sighting.kind_id, 16);
        assert_eq!(sighting.disappear_time, now() + Duration::minutes(10));
    }

    #[test]
    fn despawned_sightings_are_dropped() {
        let cells = vec![json!({"wild_creatures": [creature(1, 16, -1), creature(2, 19, 0)]})];
        let parsed = parser().parse(&snapshot(cells), &at(0, 1), now()).unwrap();
        assert!(parsed.sightings.is_empty());
        assert!(parsed.rejected.is_empty());
    }

    #[test]
    fn forts_are_skipped_on_shallow_first_pass() {
        let parsed = parser().parse(&forts_snapshot(), &at(0, 10), now()).unwrap();
        assert!(parsed.stops.is_empty());
        assert!(parsed.gyms.is_empty());

        let parsed = parser().parse(&forts_snapshot(), &at(0, 50), now()).unwrap();
        assert!(parsed.stops.is_empty());

        let parsed = parser().parse(&forts_snapshot(), &at(0, 51), now()).unwrap();
        assert_eq!(parsed.stops.len(), 2);
        assert_eq!(parsed.gyms.len(), 1);

        let parsed = parser().parse(&forts_snapshot(), &at(1, 0), now()).unwrap();
        assert_eq!(parsed.stops.len(), 2);
        assert_eq!(parsed.gyms.len(), 1);
    }

    #[test]
    fn lure_fields_come_in_pairs() {
        let parsed = parser().parse(&forts_snapshot(), &at(1, 0), now()).unwrap();

        let lured = &parsed.stops["stop-lured"];
        assert_eq!(lured.active_kind_id, Some(129));
        assert_eq!(
            lured.lure_expiration,
            Some(millis_to_utc(1_469_001_800_000).unwrap())
        );

        let plain = &parsed.stops["stop-plain"];
        assert!(!plain.enabled);
        assert_eq!(plain.lure_expiration, None);
        assert_eq!(plain.active_kind_id, None);
    }

    #[test]
    fn gym_fields_and_defaults() {
        let parsed = parser().parse(&forts_snapshot(), &at(1, 0), now()).unwrap();
        let gym = &parsed.gyms["gym-1"];
        assert_eq!(gym.team_id, Team::Valor);
        assert_eq!(gym.guard_kind_id, 149);
        assert_eq!(gym.gym_points, 4000);

        let bare = snapshot(vec![json!({"forts": [{
            "id": "gym-2", "enabled": true, "latitude": 1.0, "longitude": 2.0,
            "last_modified_timestamp_ms": 1_468_999_000_000i64
        }]})]);
        let parsed = parser().parse(&bare, &at(1, 0), now()).unwrap();
        let gym = &parsed.gyms["gym-2"];
        assert_eq!(gym.team_id, Team::Uncontested);
        assert_eq!(gym.guard_kind_id, 0);
        assert_eq!(gym.gym_points, 0);
    }

    #[test]
    fn disabled_flags_skip_collection() {
        let flags = ParseFlags {
            sightings: false,
            stops: true,
            gyms: false,
        };
        let mut cells = vec![json!({"wild_creatures": [creature(7, 1, 60_000)]})];
        cells.push(forts_snapshot()["responses"]["MAP_OBJECTS"]["cells"][0].clone());

        let parsed = SnapshotParser::new(flags, true)
            .parse(&snapshot(cells), &at(1, 0), now())
            .unwrap();
        assert!(parsed.sightings.is_empty());
        assert_eq!(parsed.stops.len(), 2);
        assert!(parsed.gyms.is_empty());
    }

    #[test]
    fn malformed_entries_are_rejected_individually() {
        let broken = json!({"encounter_id": 9, "spawnpoint_id": "x"});
        let bad_team = json!({
            "id": "gym-bad", "enabled": true, "latitude": 1.0, "longitude": 2.0,
            "last_modified_timestamp_ms": 0, "owned_by_team": 5
        });
        let cells = vec![
            json!({"wild_creatures": [broken, creature(10, 25, 60_000)]}),
            json!({"forts": [bad_team]}),
        ];

        let parsed = parser().parse(&snapshot(cells), &at(1, 0), now()).unwrap();
        assert_eq!(parsed.sightings.len(), 1);
        assert!(parsed.gyms.is_empty());
        assert_eq!(parsed.rejected.len(), 2);
        assert!(matches!(
            parsed.rejected[0],
            ParseError::Entry { kind: "sighting", cell: 0, ref id, .. } if id == "9"
        ));
        assert!(matches!(
            parsed.rejected[1],
            ParseError::Invalid { kind: "gym", cell: 1, .. }
        ));
    }

    #[test]
    fn null_lists_and_bad_cells_do_not_sink_the_snapshot() {
        let cells = vec![
            json!({"wild_creatures": [creature(11, 16, 60_000)]}),
            json!({"wild_creatures": null, "forts": null}),
            json!({"wild_creatures": "oops"}),
            json!(null),
        ];

        let parsed = parser().parse(&snapshot(cells), &at(1, 0), now()).unwrap();
        assert_eq!(parsed.sightings.len(), 1);
        assert_eq!(parsed.rejected.len(), 2);
        assert!(matches!(parsed.rejected[0], ParseError::Entry { kind: "cell", cell: 2, .. }));
        assert!(matches!(parsed.rejected[1], ParseError::Entry { kind: "cell", cell: 3, .. }));
    }

    #[test]
    fn empty_snapshot_still_records_scan_location() {
        let parsed = parser().parse(&snapshot(vec![]), &at(0, 0), now()).unwrap();
        assert!(parsed.sightings.is_empty());
        assert_eq!(parsed.scanned.scanned_id, "40.0,-73.0");
        assert_eq!(parsed.scanned.last_modified, now());
    }

    #[test]
    fn wrong_shape_is_an_error() {
        let err = parser()
            .parse(&json!({"responses": {}}), &at(0, 0), now())
            .unwrap_err();
        assert!(matches!(err, ParseError::Shape(_)));
    }
}
