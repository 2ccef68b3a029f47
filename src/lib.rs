use config::Config;
use database::Store;
use snapshot::SnapshotParser;

pub mod common;
pub mod config;
pub mod database;
pub mod error;
pub mod geo;
pub mod middleware;
pub mod result;
pub mod router;
pub mod routes;
pub mod snapshot;
pub mod utils;

#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub parser: SnapshotParser,
    pub config: Config,
}

impl AppState {
    pub fn new(store: Store, config: Config) -> Self {
        Self {
            store,
            parser: SnapshotParser::from_config(&config),
            config,
        }
    }
}
