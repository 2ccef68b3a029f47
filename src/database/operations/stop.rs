// 补给站查询

use super::filter::Filter;
use crate::common::BoundingBox;
use crate::database::models::{MapRecord, Stop};
use crate::database::store::Store;
use crate::error::StoreError;

impl Store {
    pub async fn stops_in_box(&self, bbox: Option<&BoundingBox>) -> Result<Vec<Stop>, StoreError> {
        let mut filter = Filter::new();
        filter.bounding_box(bbox);

        let china = self.options().china_display;
        let stops = filter.fetch::<Stop>(self.pool()).await?;
        Ok(stops.into_iter().map(|s| s.into_display(china)).collect())
    }
}
