use axum::{
    Json,
    extract::{Query, State},
};

use super::model::{MapQuery, RawData};
use crate::AppState;
use crate::database::{Gym, ScannedLocation, Sighting, Stop};
use crate::error::AppError;
use crate::result::ApiResult;

type ApiJson<T> = Result<Json<ApiResult<T>>, AppError>;

// 范围内还没消失的精灵，可按种类过滤
#[axum::debug_handler]
pub async fn find_sightings(
    State(state): State<AppState>,
    Query(query): Query<MapQuery>,
) -> ApiJson<Vec<Sighting>> {
    let kind_ids = query.kind_ids()?;
    let sightings = state
        .store
        .sightings_in_box(query.bounding_box().as_ref(), kind_ids.as_deref())
        .await?;
    Ok(ApiResult::json(sightings))
}

#[axum::debug_handler]
pub async fn find_stops(
    State(state): State<AppState>,
    Query(query): Query<MapQuery>,
) -> ApiJson<Vec<Stop>> {
    let stops = state.store.stops_in_box(query.bounding_box().as_ref()).await?;
    Ok(ApiResult::json(stops))
}

#[axum::debug_handler]
pub async fn find_gyms(
    State(state): State<AppState>,
    Query(query): Query<MapQuery>,
) -> ApiJson<Vec<Gym>> {
    let gyms = state.store.gyms_in_box(query.bounding_box().as_ref()).await?;
    Ok(ApiResult::json(gyms))
}

// 扫描位置必须带范围
#[axum::debug_handler]
pub async fn find_scanned(
    State(state): State<AppState>,
    Query(query): Query<MapQuery>,
) -> ApiJson<Vec<ScannedLocation>> {
    let bbox = query.bounding_box().ok_or_else(|| {
        AppError::BadRequest("swLat, swLng, neLat and neLng are required".to_string())
    })?;
    let scanned = state.store.recent_scanned_in_box(&bbox).await?;
    Ok(ApiResult::json(scanned))
}

// 地图页面一次拉取所有数据
#[axum::debug_handler]
pub async fn find_raw_data(
    State(state): State<AppState>,
    Query(query): Query<MapQuery>,
) -> ApiJson<RawData> {
    let bbox = query.bounding_box();
    let mut data = RawData::default();

    if query.sightings {
        let kind_ids = query.kind_ids()?;
        data.sightings = Some(
            state
                .store
                .sightings_in_box(bbox.as_ref(), kind_ids.as_deref())
                .await?,
        );
    }
    if query.stops {
        data.stops = Some(state.store.stops_in_box(bbox.as_ref()).await?);
    }
    if query.gyms {
        data.gyms = Some(state.store.gyms_in_box(bbox.as_ref()).await?);
    }
    if let (true, Some(bbox)) = (query.scanned, bbox.as_ref()) {
        data.scanned = Some(state.store.recent_scanned_in_box(bbox).await?);
    }

    Ok(ApiResult::json(data))
}
