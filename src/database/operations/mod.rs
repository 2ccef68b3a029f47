// 数据库操作
// 批量写入和各实体的范围查询

pub mod gym;
pub mod scanned;
pub mod sighting;
pub mod stop;
pub mod upsert;

mod filter;
