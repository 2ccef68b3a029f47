// 地图快照
// raw: 上游原始结构；parser: 解析和入库

pub mod parser;
pub mod raw;

pub use parser::{ParsedMap, ScanStep, SnapshotParser};
