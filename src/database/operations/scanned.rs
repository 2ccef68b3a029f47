// 扫描位置查询，只返回最近 15 分钟内扫过的点

use chrono::{DateTime, Duration, Utc};

use super::filter::Filter;
use crate::common::BoundingBox;
use crate::database::models::{MapRecord, ScannedLocation};
use crate::database::store::Store;
use crate::error::StoreError;
use crate::utils::utc_to_millis;

/// 扫描位置的可见时间
pub const SCANNED_VISIBLE_MINUTES: i64 = 15;

impl Store {
    pub async fn recent_scanned_in_box(
        &self,
        bbox: &BoundingBox,
    ) -> Result<Vec<ScannedLocation>, StoreError> {
        self.recent_scanned_in_box_at(bbox, Utc::now()).await
    }

    pub async fn recent_scanned_in_box_at(
        &self,
        bbox: &BoundingBox,
        now: DateTime<Utc>,
    ) -> Result<Vec<ScannedLocation>, StoreError> {
        let visible_since = now - Duration::minutes(SCANNED_VISIBLE_MINUTES);

        let mut filter = Filter::new();
        filter
            .int("last_modified", ">=", utc_to_millis(&visible_since))
            .bounding_box(Some(bbox));

        let china = self.options().china_display;
        let scanned = filter.fetch::<ScannedLocation>(self.pool()).await?;
        Ok(scanned
            .into_iter()
            .map(|s| s.into_display(china))
            .collect())
    }
}
