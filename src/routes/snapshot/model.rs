use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::common::Location;
use crate::snapshot::{ParsedMap, ScanStep};

/// 扫描调度方提交的一次快照
#[derive(Debug, Deserialize)]
pub struct IngestRequest {
    pub snapshot: Value,
    pub iteration_num: u32,
    pub step: u32,
    pub step_location: Location,
}

impl IngestRequest {
    pub fn scan_step(&self) -> ScanStep {
        ScanStep::new(self.iteration_num, self.step, self.step_location)
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct IngestResponse {
    pub sightings: usize,
    pub stops: usize,
    pub gyms: usize,
    pub scanned_id: String,
    /// 被跳过的坏条目数，严格模式下总是 0
    pub rejected: usize,
}

impl From<&ParsedMap> for IngestResponse {
    fn from(parsed: &ParsedMap) -> Self {
        Self {
            sightings: parsed.sightings.len(),
            stops: parsed.stops.len(),
            gyms: parsed.gyms.len(),
            scanned_id: parsed.scanned.scanned_id.clone(),
            rejected: parsed.rejected.len(),
        }
    }
}
