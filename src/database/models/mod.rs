// 地图实体
// 每种实体一张表，主键为字符串

pub mod gym;
pub mod scanned;
pub mod sighting;
pub mod stop;

pub use gym::{Gym, Team};
pub use scanned::ScannedLocation;
pub use sighting::Sighting;
pub use stop::Stop;

use sqlx::any::{AnyArguments, AnyRow};
use sqlx::query::Query;
use sqlx::{Any, FromRow};

use crate::common::Location;
use crate::geo::transform::wgs_to_gcj;
use crate::utils::millis_to_utc;

pub type AnyQuery<'q> = Query<'q, Any, AnyArguments<'q>>;

/// 可以批量写入和按范围查询的实体
pub trait MapRecord: for<'r> FromRow<'r, AnyRow> + Send + Sync + Unpin {
    /// 表名
    const TABLE: &'static str;
    /// 列名，第一列是主键
    const COLUMNS: &'static [&'static str];

    /// 主键值
    fn key(&self) -> &str;

    /// 按 COLUMNS 的顺序绑定参数
    fn bind_values<'q>(&'q self, query: AnyQuery<'q>) -> AnyQuery<'q>;

    fn location(&self) -> Location;

    fn set_location(&mut self, location: Location);

    /// 转成国内地图的显示坐标，只影响返回值，不影响过滤
    fn into_display(mut self, china: bool) -> Self
    where
        Self: Sized,
    {
        if china {
            let loc = self.location();
            let (latitude, longitude) = wgs_to_gcj(loc.latitude, loc.longitude);
            self.set_location(Location::new(latitude, longitude));
        }
        self
    }
}

/// 读取毫秒时间戳列
pub(crate) fn decode_millis(
    column: &str,
    ms: i64,
) -> Result<chrono::DateTime<chrono::Utc>, sqlx::Error> {
    millis_to_utc(ms).ok_or_else(|| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: format!("timestamp {} out of range", ms).into(),
    })
}
