use axum::Json;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// 快照解析错误
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("snapshot is not a responses.MAP_OBJECTS document: {0}")]
    Shape(#[source] serde_json::Error),
    #[error("malformed {kind} entry in cell {cell} ({id}): {source}")]
    Entry {
        kind: &'static str,
        cell: usize,
        id: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid {kind} entry in cell {cell} ({id}): {reason}")]
    Invalid {
        kind: &'static str,
        cell: usize,
        id: String,
        reason: String,
    },
}

/// 存储层错误
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("upsert into {table} gave up at row {offset} after {attempts} attempts: {source}")]
    RetriesExhausted {
        table: &'static str,
        offset: usize,
        attempts: u32,
        #[source]
        source: sqlx::Error,
    },
}

/// 解析并入库的错误
#[derive(Debug, Error)]
pub enum IngestError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    InvalidSnapshot(String),
    Storage(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    code: i32,
    error_message: String,
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        AppError::Storage(e.to_string())
    }
}

impl From<IngestError> for AppError {
    fn from(e: IngestError) -> Self {
        match e {
            IngestError::Parse(e) => AppError::InvalidSnapshot(e.to_string()),
            IngestError::Store(e) => AppError::Storage(e.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::InvalidSnapshot(msg) => {
                (StatusCode::UNPROCESSABLE_ENTITY, format!("快照格式错误: {}", msg))
            }
            AppError::Storage(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("存储失败: {}", msg),
            ),
        };

        let body = Json(ErrorResponse {
            code: status.as_u16() as i32,
            error_message,
        });

        (status, body).into_response()
    }
}
