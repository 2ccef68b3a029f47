use serde::{Deserialize, Serialize};

// 公共数据结构

/// WGS84 经纬度坐标（十进制度）
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl From<(f64, f64)> for Location {
    fn from((latitude, longitude): (f64, f64)) -> Self {
        Self::new(latitude, longitude)
    }
}

/// 查询用的矩形范围：西南角 + 东北角
///
/// 不做合法性校验，西南角在东北角北边时查询结果为空。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub sw: Location,
    pub ne: Location,
}

impl BoundingBox {
    pub fn new(sw: Location, ne: Location) -> Self {
        Self { sw, ne }
    }

    /// 四个边界必须同时给出，缺任何一个都视为没有范围限制
    pub fn from_bounds(
        sw_lat: Option<f64>,
        sw_lng: Option<f64>,
        ne_lat: Option<f64>,
        ne_lng: Option<f64>,
    ) -> Option<Self> {
        match (sw_lat, sw_lng, ne_lat, ne_lng) {
            (Some(sw_lat), Some(sw_lng), Some(ne_lat), Some(ne_lng)) => Some(Self::new(
                Location::new(sw_lat, sw_lng),
                Location::new(ne_lat, ne_lng),
            )),
            _ => None,
        }
    }

    pub fn contains(&self, location: &Location) -> bool {
        location.latitude >= self.sw.latitude
            && location.longitude >= self.sw.longitude
            && location.latitude <= self.ne.latitude
            && location.longitude <= self.ne.longitude
    }
}
