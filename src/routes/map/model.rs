use serde::{Deserialize, Serialize};

use crate::common::BoundingBox;
use crate::database::{Gym, ScannedLocation, Sighting, Stop};
use crate::error::AppError;

/// 查询参数，矩形范围的四个值都给才生效
///
/// 不用 flatten，urlencoded 在 flatten 里没法解析数字。
#[derive(Debug, Deserialize)]
pub struct MapQuery {
    #[serde(rename = "swLat")]
    pub sw_lat: Option<f64>,
    #[serde(rename = "swLng")]
    pub sw_lng: Option<f64>,
    #[serde(rename = "neLat")]
    pub ne_lat: Option<f64>,
    #[serde(rename = "neLng")]
    pub ne_lng: Option<f64>,
    /// 逗号分隔的种类ID
    pub ids: Option<String>,
    #[serde(default = "default_true")]
    pub sightings: bool,
    #[serde(default = "default_true")]
    pub stops: bool,
    #[serde(default = "default_true")]
    pub gyms: bool,
    #[serde(default)]
    pub scanned: bool,
}

impl MapQuery {
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        BoundingBox::from_bounds(self.sw_lat, self.sw_lng, self.ne_lat, self.ne_lng)
    }

    pub fn kind_ids(&self) -> Result<Option<Vec<i64>>, AppError> {
        parse_ids(self.ids.as_deref())
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Default, Serialize)]
pub struct RawData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sightings: Option<Vec<Sighting>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stops: Option<Vec<Stop>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gyms: Option<Vec<Gym>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scanned: Option<Vec<ScannedLocation>>,
}

/// "1, 2,3" -> [1, 2, 3]，空串视为不限制
pub(crate) fn parse_ids(raw: Option<&str>) -> Result<Option<Vec<i64>>, AppError> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };

    raw.split(',')
        .map(|id| {
            id.trim()
                .parse::<i64>()
                .map_err(|_| AppError::BadRequest(format!("invalid id: {}", id.trim())))
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}
