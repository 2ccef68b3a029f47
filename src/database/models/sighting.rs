// 野生精灵出现记录

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::any::AnyRow;
use sqlx::{FromRow, Row};

use super::{AnyQuery, MapRecord, decode_millis};
use crate::common::Location;
use crate::utils::utc_to_millis;

/// 一次出现记录，对应 sightings 表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sighting {
    /// 遭遇ID，上游是很大的整数，存成十进制字符串
    pub encounter_id: String,
    /// 刷新点ID
    pub spawnpoint_id: String,
    /// 种类ID
    pub kind_id: i64,
    pub latitude: f64,
    pub longitude: f64,
    /// 消失时间
    pub disappear_time: DateTime<Utc>,
}

impl Sighting {
    pub fn encode_encounter_id(raw: u64) -> String {
        raw.to_string()
    }
}

impl<'r> FromRow<'r, AnyRow> for Sighting {
    fn from_row(row: &'r AnyRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            encounter_id: row.try_get("encounter_id")?,
            spawnpoint_id: row.try_get("spawnpoint_id")?,
            kind_id: row.try_get("kind_id")?,
            latitude: row.try_get("latitude")?,
            longitude: row.try_get("longitude")?,
            disappear_time: decode_millis("disappear_time", row.try_get("disappear_time")?)?,
        })
    }
}

impl MapRecord for Sighting {
    const TABLE: &'static str = "sightings";
    const COLUMNS: &'static [&'static str] = &[
        "encounter_id",
        "spawnpoint_id",
        "kind_id",
        "latitude",
        "longitude",
        "disappear_time",
    ];

    fn key(&self) -> &str {
        &self.encounter_id
    }

    fn bind_values<'q>(&'q self, query: AnyQuery<'q>) -> AnyQuery<'q> {
        query
            .bind(self.encounter_id.as_str())
            .bind(self.spawnpoint_id.as_str())
            .bind(self.kind_id)
            .bind(self.latitude)
            .bind(self.longitude)
            .bind(utc_to_millis(&self.disappear_time))
    }

    fn location(&self) -> Location {
        Location::new(self.latitude, self.longitude)
    }

    fn set_location(&mut self, location: Location) {
        self.latitude = location.latitude;
        self.longitude = location.longitude;
    }
}
