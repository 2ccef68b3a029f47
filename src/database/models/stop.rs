// 补给站

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::any::AnyRow;
use sqlx::{FromRow, Row};

use super::{AnyQuery, MapRecord, decode_millis};
use crate::common::Location;
use crate::utils::utc_to_millis;

/// 诱饵信息，过期时间和吸引来的种类总是成对出现
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Lure {
    pub expiration: DateTime<Utc>,
    pub active_kind_id: i64,
}

/// 补给站，对应 stops 表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stop {
    pub stop_id: String,
    pub enabled: bool,
    pub latitude: f64,
    pub longitude: f64,
    pub last_modified: DateTime<Utc>,
    pub lure_expiration: Option<DateTime<Utc>>,
    pub active_kind_id: Option<i64>,
}

impl Stop {
    pub fn new(
        stop_id: String,
        enabled: bool,
        location: Location,
        last_modified: DateTime<Utc>,
        lure: Option<Lure>,
    ) -> Self {
        Self {
            stop_id,
            enabled,
            latitude: location.latitude,
            longitude: location.longitude,
            last_modified,
            lure_expiration: lure.map(|l| l.expiration),
            active_kind_id: lure.map(|l| l.active_kind_id),
        }
    }

    pub fn lure(&self) -> Option<Lure> {
        match (self.lure_expiration, self.active_kind_id) {
            (Some(expiration), Some(active_kind_id)) => Some(Lure {
                expiration,
                active_kind_id,
            }),
            _ => None,
        }
    }
}

impl<'r> FromRow<'r, AnyRow> for Stop {
    fn from_row(row: &'r AnyRow) -> Result<Self, sqlx::Error> {
        let lure_expiration: Option<i64> = row.try_get("lure_expiration")?;
        let active_kind_id: Option<i64> = row.try_get("active_kind_id")?;
        // 两个字段要么都有要么都没有
        let lure = match (lure_expiration, active_kind_id) {
            (Some(ms), Some(active_kind_id)) => Some(Lure {
                expiration: decode_millis("lure_expiration", ms)?,
                active_kind_id,
            }),
            _ => None,
        };
        let enabled: i64 = row.try_get("enabled")?;

        Ok(Self::new(
            row.try_get("stop_id")?,
            enabled != 0,
            Location::new(row.try_get("latitude")?, row.try_get("longitude")?),
            decode_millis("last_modified", row.try_get("last_modified")?)?,
            lure,
        ))
    }
}

impl MapRecord for Stop {
    const TABLE: &'static str = "stops";
    const COLUMNS: &'static [&'static str] = &[
        "stop_id",
        "enabled",
        "latitude",
        "longitude",
        "last_modified",
        "lure_expiration",
        "active_kind_id",
    ];

    fn key(&self) -> &str {
        &self.stop_id
    }

    fn bind_values<'q>(&'q self, query: AnyQuery<'q>) -> AnyQuery<'q> {
        let lure = self.lure();
        query
            .bind(self.stop_id.as_str())
            .bind(self.enabled as i64)
            .bind(self.latitude)
            .bind(self.longitude)
            .bind(utc_to_millis(&self.last_modified))
            .bind(lure.map(|l| utc_to_millis(&l.expiration)))
            .bind(lure.map(|l| l.active_kind_id))
    }

    fn location(&self) -> Location {
        Location::new(self.latitude, self.longitude)
    }

    fn set_location(&mut self, location: Location) {
        self.latitude = location.latitude;
        self.longitude = location.longitude;
    }
}
