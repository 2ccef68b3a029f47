use axum::{
    Router,
    routing::{get, post},
};

use crate::{AppState, middleware::log_errors, routes};

// 地图查询路由
pub fn map_routes() -> Router<AppState> {
    Router::new()
        .route("/sightings", get(routes::map::find_sightings))
        .route("/stops", get(routes::map::find_stops))
        .route("/gyms", get(routes::map::find_gyms))
        .route("/scanned", get(routes::map::find_scanned))
        .route("/raw_data", get(routes::map::find_raw_data))
}

// 快照提交路由
pub fn snapshot_routes() -> Router<AppState> {
    Router::new().route("/snapshots", post(routes::snapshot::ingest_snapshot))
}

// 创建主路由
pub fn create_router(state: AppState) -> Router {
    let api = Router::new().merge(map_routes()).merge(snapshot_routes());

    let base_uri = state.config.api_base_uri.trim_matches('/');
    let router = if base_uri.is_empty() {
        api
    } else {
        Router::new().nest(&format!("/{}", base_uri), api)
    };

    router
        .layer(axum::middleware::from_fn(log_errors))
        .with_state(state)
}
