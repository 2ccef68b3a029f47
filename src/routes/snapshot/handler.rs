use axum::{
    Json,
    extract::State,
    http::StatusCode,
};

use super::model::{IngestRequest, IngestResponse};
use crate::AppState;
use crate::error::AppError;
use crate::result::ApiResult;

#[axum::debug_handler]
pub async fn ingest_snapshot(
    State(state): State<AppState>,
    Json(req): Json<IngestRequest>,
) -> Result<(StatusCode, Json<ApiResult<IngestResponse>>), AppError> {
    let scan = req.scan_step();
    tracing::debug!(
        "Ingesting snapshot for iteration {} step {} at {:?}",
        scan.iteration_num,
        scan.step,
        scan.location
    );

    let parsed = state.parser.ingest(&state.store, &req.snapshot, &scan).await?;
    Ok((
        StatusCode::CREATED,
        ApiResult::json(IngestResponse::from(&parsed)),
    ))
}
