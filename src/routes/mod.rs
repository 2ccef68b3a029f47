pub mod map;
pub mod snapshot;
