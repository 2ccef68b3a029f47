// 出现记录查询

use chrono::{DateTime, Utc};

use super::filter::Filter;
use crate::common::BoundingBox;
use crate::database::models::{MapRecord, Sighting};
use crate::database::store::Store;
use crate::error::StoreError;
use crate::utils::utc_to_millis;

impl Store {
    /// 范围内还没有消失的记录，kind_ids 给出时只返回这些种类
    pub async fn sightings_in_box(
        &self,
        bbox: Option<&BoundingBox>,
        kind_ids: Option<&[i64]>,
    ) -> Result<Vec<Sighting>, StoreError> {
        self.sightings_in_box_at(bbox, kind_ids, Utc::now()).await
    }

    pub async fn sightings_in_box_at(
        &self,
        bbox: Option<&BoundingBox>,
        kind_ids: Option<&[i64]>,
        now: DateTime<Utc>,
    ) -> Result<Vec<Sighting>, StoreError> {
        let mut filter = Filter::new();
        filter
            .int("disappear_time", ">", utc_to_millis(&now))
            .bounding_box(bbox);
        if let Some(ids) = kind_ids {
            if ids.is_empty() {
                return Ok(Vec::new());
            }
            filter.any_of("kind_id", ids);
        }

        let china = self.options().china_display;
        let sightings = filter.fetch::<Sighting>(self.pool()).await?;
        Ok(sightings
            .into_iter()
            .map(|s| s.into_display(china))
            .collect())
    }
}
