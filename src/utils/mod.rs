use chrono::{DateTime, Utc};

/// 毫秒时间戳转 UTC 时间，超出范围返回 None
pub fn millis_to_utc(ms: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(ms)
}

pub fn utc_to_millis(time: &DateTime<Utc>) -> i64 {
    time.timestamp_millis()
}
