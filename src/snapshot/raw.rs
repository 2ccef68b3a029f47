// 上游地图快照的原始结构
// 单个条目先保留为 Value，逐个反序列化，坏条目不影响其他条目

use serde::{Deserialize, Deserializer};
use serde_json::Value;

#[derive(Debug, Deserialize)]
pub struct RawSnapshot {
    pub responses: RawResponses,
}

#[derive(Debug, Deserialize)]
pub struct RawResponses {
    #[serde(rename = "MAP_OBJECTS")]
    pub map_objects: RawMapObjects,
}

#[derive(Debug, Deserialize)]
pub struct RawMapObjects {
    /// 单元格也逐个解析，一个坏单元格不影响其他单元格
    #[serde(default, deserialize_with = "null_as_empty")]
    pub cells: Vec<Value>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawCell {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub wild_creatures: Vec<Value>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub forts: Vec<Value>,
}

#[derive(Debug, Deserialize)]
pub struct RawWildCreature {
    #[serde(deserialize_with = "u64_or_string")]
    pub encounter_id: u64,
    pub spawnpoint_id: String,
    pub creature_data: RawCreatureData,
    pub latitude: f64,
    pub longitude: f64,
    pub last_modified_timestamp_ms: i64,
    pub time_till_hidden_ms: i64,
}

#[derive(Debug, Deserialize)]
pub struct RawCreatureData {
    pub kind_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct RawFort {
    pub id: String,
    pub enabled: bool,
    pub latitude: f64,
    pub longitude: f64,
    pub last_modified_timestamp_ms: i64,
    pub owned_by_team: Option<i64>,
    pub guard_creature_id: Option<i64>,
    pub points: Option<i64>,
    pub lure_info: Option<RawLureInfo>,
}

#[derive(Debug, Deserialize)]
pub struct RawLureInfo {
    pub lure_expires_timestamp_ms: i64,
    pub active_creature_id: i64,
}

/// 据点类型，只看 type 字段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FortKind {
    /// 没有 type 字段
    Gym,
    /// type == 1
    Stop,
    /// 其他类型，直接忽略
    Other,
}

pub const STOP_FORT_TYPE: i64 = 1;

pub fn fort_kind(entry: &Value) -> FortKind {
    match entry.get("type") {
        None | Some(Value::Null) => FortKind::Gym,
        Some(t) if t.as_i64() == Some(STOP_FORT_TYPE) => FortKind::Stop,
        Some(_) => FortKind::Other,
    }
}

/// 用于错误信息的条目ID
pub fn entry_id(entry: &Value, field: &str) -> String {
    match entry.get(field) {
        Some(Value::String(s)) => s.clone(),
        Some(v) if !v.is_null() => v.to_string(),
        _ => "<no id>".to_string(),
    }
}

/// 列表字段为 null 时按空列表处理
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// 遭遇ID有时是数字有时是字符串
fn u64_or_string<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(u64),
        String(String),
    }

    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => Ok(n),
        NumberOrString::String(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}
