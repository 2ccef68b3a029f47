// 存储句柄
// 启动时创建一次，之后通过引用传给解析器和查询接口

use sqlx::AnyPool;
use sqlx::any::AnyPoolOptions;

use super::models::MapRecord;
use super::schema::CREATE_STATEMENTS;
use crate::config::{Config, DbBackend, RetryPolicy};
use crate::error::StoreError;

#[derive(Debug, Clone, Copy)]
pub struct StoreOptions {
    /// 每批写入的行数
    pub batch_size: usize,
    pub retry: RetryPolicy,
    /// 返回结果时把坐标转成 GCJ-02
    pub china_display: bool,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            batch_size: 120,
            retry: RetryPolicy::default(),
            china_display: false,
        }
    }
}

impl From<&Config> for StoreOptions {
    fn from(config: &Config) -> Self {
        Self {
            batch_size: config.upsert_batch_size,
            retry: config.retry,
            china_display: config.china_display,
        }
    }
}

#[derive(Clone)]
pub struct Store {
    pool: AnyPool,
    options: StoreOptions,
}

impl Store {
    /// 连接数据库并建表
    pub async fn connect(
        backend: &DbBackend,
        max_connections: u32,
        options: StoreOptions,
    ) -> Result<Self, StoreError> {
        sqlx::any::install_default_drivers();

        let mut pool_options = AnyPoolOptions::new().max_connections(max_connections.max(1));
        match backend {
            DbBackend::Sqlite { path } if path == ":memory:" => {
                // 内存库只在单个连接里存在，连接不能被回收
                pool_options = pool_options
                    .max_connections(1)
                    .min_connections(1)
                    .idle_timeout(None)
                    .max_lifetime(None);
                tracing::info!("Connecting to in-memory SQLite database.");
            }
            DbBackend::Sqlite { path } => {
                tracing::info!("Connecting to local SQLite database {}.", path);
            }
            DbBackend::Postgres { .. } => {
                tracing::info!("Connecting to Postgres database.");
            }
        }

        let pool = pool_options.connect(&backend.connection_url()).await?;
        let store = Self::from_pool(pool, options);
        store.create_tables().await?;
        Ok(store)
    }

    pub fn from_pool(pool: AnyPool, options: StoreOptions) -> Self {
        Self { pool, options }
    }

    pub async fn create_tables(&self) -> Result<(), StoreError> {
        for statement in CREATE_STATEMENTS {
            sqlx::query(*statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    /// 表中的记录数，不做任何过滤
    pub async fn count<R: MapRecord>(&self) -> Result<i64, StoreError> {
        let sql = format!("SELECT COUNT(*) FROM {}", R::TABLE);
        let (count,): (i64,) = sqlx::query_as(&sql).fetch_one(&self.pool).await?;
        Ok(count)
    }

    pub fn pool(&self) -> &AnyPool {
        &self.pool
    }

    pub fn options(&self) -> &StoreOptions {
        &self.options
    }
}
