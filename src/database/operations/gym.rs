// 道馆查询

use super::filter::Filter;
use crate::common::BoundingBox;
use crate::database::models::{Gym, MapRecord};
use crate::database::store::Store;
use crate::error::StoreError;

impl Store {
    pub async fn gyms_in_box(&self, bbox: Option<&BoundingBox>) -> Result<Vec<Gym>, StoreError> {
        let mut filter = Filter::new();
        filter.bounding_box(bbox);

        let china = self.options().china_display;
        let gyms = filter.fetch::<Gym>(self.pool()).await?;
        Ok(gyms.into_iter().map(|g| g.into_display(china)).collect())
    }
}
