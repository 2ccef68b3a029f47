// 扫描过的位置

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::any::AnyRow;
use sqlx::{FromRow, Row};

use super::{AnyQuery, MapRecord, decode_millis};
use crate::common::Location;
use crate::utils::utc_to_millis;

/// 每个扫描点一条记录，重复扫描时覆盖
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScannedLocation {
    /// "纬度,经度"
    pub scanned_id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub last_modified: DateTime<Utc>,
}

impl ScannedLocation {
    pub fn new(location: Location, last_modified: DateTime<Utc>) -> Self {
        Self {
            scanned_id: format!(
                "{},{}",
                coordinate_text(location.latitude),
                coordinate_text(location.longitude)
            ),
            latitude: location.latitude,
            longitude: location.longitude,
            last_modified,
        }
    }
}

/// 整数坐标也保留小数点，例如 40.0 写成 "40.0" 而不是 "40"
fn coordinate_text(value: f64) -> String {
    let text = value.to_string();
    if value.is_finite() && !text.contains('.') {
        format!("{}.0", text)
    } else {
        text
    }
}

impl<'r> FromRow<'r, AnyRow> for ScannedLocation {
    fn from_row(row: &'r AnyRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            scanned_id: row.try_get("scanned_id")?,
            latitude: row.try_get("latitude")?,
            longitude: row.try_get("longitude")?,
            last_modified: decode_millis("last_modified", row.try_get("last_modified")?)?,
        })
    }
}

impl MapRecord for ScannedLocation {
    const TABLE: &'static str = "scanned_locations";
    const COLUMNS: &'static [&'static str] =
        &["scanned_id", "latitude", "longitude", "last_modified"];

    fn key(&self) -> &str {
        &self.scanned_id
    }

    fn bind_values<'q>(&'q self, query: AnyQuery<'q>) -> AnyQuery<'q> {
        query
            .bind(self.scanned_id.as_str())
            .bind(self.latitude)
            .bind(self.longitude)
            .bind(utc_to_millis(&self.last_modified))
    }

    fn location(&self) -> Location {
        Location::new(self.latitude, self.longitude)
    }

    fn set_location(&mut self, location: Location) {
        self.latitude = location.latitude;
        self.longitude = location.longitude;
    }
}
