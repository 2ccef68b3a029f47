// 数据库模块
// 包含实体定义、建表语句和读写操作

pub mod models; // 数据库实体定义
pub mod operations; // 数据库操作实现
pub mod schema; // 建表语句
pub mod store; // 连接和配置

// 重新导出常用类型，方便其他模块使用
pub use models::{Gym, MapRecord, ScannedLocation, Sighting, Stop, Team};
pub use operations::upsert::UpsertReport;
pub use store::{Store, StoreOptions};
