mod handler;
mod model;

pub use handler::ingest_snapshot;
pub use model::{IngestRequest, IngestResponse};
