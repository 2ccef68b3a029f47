mod handler;
mod model;

pub use handler::{find_gyms, find_raw_data, find_scanned, find_sightings, find_stops};
pub use model::{MapQuery, RawData};
