// 道馆

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::any::AnyRow;
use sqlx::{FromRow, Row};

use super::{AnyQuery, MapRecord, decode_millis};
use crate::common::Location;
use crate::utils::utc_to_millis;

/// 占领队伍，0 表示无人占领
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "i64", try_from = "i64")]
pub enum Team {
    Uncontested = 0,
    Mystic = 1,
    Valor = 2,
    Instinct = 3,
}

impl From<Team> for i64 {
    fn from(team: Team) -> Self {
        team as i64
    }
}

impl TryFrom<i64> for Team {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Team::Uncontested),
            1 => Ok(Team::Mystic),
            2 => Ok(Team::Valor),
            3 => Ok(Team::Instinct),
            other => Err(format!("unknown team id {}", other)),
        }
    }
}

/// 道馆，对应 gyms 表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gym {
    pub gym_id: String,
    pub team_id: Team,
    /// 守卫种类ID
    pub guard_kind_id: i64,
    pub gym_points: i64,
    pub enabled: bool,
    pub latitude: f64,
    pub longitude: f64,
    pub last_modified: DateTime<Utc>,
}

impl<'r> FromRow<'r, AnyRow> for Gym {
    fn from_row(row: &'r AnyRow) -> Result<Self, sqlx::Error> {
        let team_id: i64 = row.try_get("team_id")?;
        let enabled: i64 = row.try_get("enabled")?;
        Ok(Self {
            gym_id: row.try_get("gym_id")?,
            team_id: Team::try_from(team_id).map_err(|e| sqlx::Error::ColumnDecode {
                index: "team_id".into(),
                source: e.into(),
            })?,
            guard_kind_id: row.try_get("guard_kind_id")?,
            gym_points: row.try_get("gym_points")?,
            enabled: enabled != 0,
            latitude: row.try_get("latitude")?,
            longitude: row.try_get("longitude")?,
            last_modified: decode_millis("last_modified", row.try_get("last_modified")?)?,
        })
    }
}

impl MapRecord for Gym {
    const TABLE: &'static str = "gyms";
    const COLUMNS: &'static [&'static str] = &[
        "gym_id",
        "team_id",
        "guard_kind_id",
        "gym_points",
        "enabled",
        "latitude",
        "longitude",
        "last_modified",
    ];

    fn key(&self) -> &str {
        &self.gym_id
    }

    fn bind_values<'q>(&'q self, query: AnyQuery<'q>) -> AnyQuery<'q> {
        query
            .bind(self.gym_id.as_str())
            .bind(i64::from(self.team_id))
            .bind(self.guard_kind_id)
            .bind(self.gym_points)
            .bind(self.enabled as i64)
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
