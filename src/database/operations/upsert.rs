// 批量写入
// 按主键插入或覆盖，每批一条语句，失败时整批重试

use std::collections::HashMap;
use std::future::Future;

use crate::config::RetryPolicy;
use crate::database::models::MapRecord;
use crate::database::store::Store;
use crate::error::StoreError;

/// 单条语句的绑定参数上限，取 sqlite(32766) 和 postgres(65535) 中较小的
pub const MAX_BIND_PARAMS: usize = 32_766;

/// 一次批量写入的统计
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpsertReport {
    pub rows: usize,
    pub batches: usize,
    pub retries: u32,
    /// 每批的行数
    pub batch_rows: Vec<usize>,
}

impl Store {
    /// 批量写入，同主键的旧记录会被覆盖
    ///
    /// 同一次调用里主键重复时只保留最后一条，位置按第一次出现算。
    /// 每批要么整批成功，要么不会继续写后面的批次。
    pub async fn bulk_upsert<'a, R, I>(&self, records: I) -> Result<UpsertReport, StoreError>
    where
        R: MapRecord + 'a,
        I: IntoIterator<Item = &'a R>,
    {
        let records = dedup_by_key(records);
        let total = records.len();
        let batch_size = rows_per_statement(self.options().batch_size, R::COLUMNS.len());
        let mut report = UpsertReport::default();

        for (index, batch) in records.chunks(batch_size).enumerate() {
            let offset = index * batch_size;
            tracing::debug!(
                "Inserting items {} to {} of {} into {}",
                offset,
                offset + batch.len(),
                total,
                R::TABLE
            );

            let sql = upsert_sql(R::TABLE, R::COLUMNS, batch.len());
            let sql = sql.as_str();
            let retries = with_retry(&self.options().retry, R::TABLE, offset, move || {
                self.execute_batch(sql, batch)
            })
            .await?;

            report.retries += retries;
            report.batches += 1;
            report.rows += batch.len();
            report.batch_rows.push(batch.len());
        }

        Ok(report)
    }

    async fn execute_batch<R: MapRecord>(&self, sql: &str, batch: &[&R]) -> Result<(), sqlx::Error> {
        let mut query = sqlx::query(sql);
        for record in batch {
            query = record.bind_values(query);
        }
        query.execute(self.pool()).await?;
        Ok(())
    }
}

/// 按主键去重，后写的覆盖先写的
pub(crate) fn dedup_by_key<'a, R, I>(records: I) -> Vec<&'a R>
where
    R: MapRecord + 'a,
    I: IntoIterator<Item = &'a R>,
{
    let mut positions: HashMap<&'a str, usize> = HashMap::new();
    let mut unique: Vec<&'a R> = Vec::new();
    for record in records {
        match positions.get(record.key()) {
            Some(&pos) => unique[pos] = record,
            None => {
                positions.insert(record.key(), unique.len());
                unique.push(record);
            }
        }
    }
    unique
}

/// 每条语句最多写几行，不能超过绑定参数上限
pub(crate) fn rows_per_statement(batch_size: usize, width: usize) -> usize {
    let limit = MAX_BIND_PARAMS / width.max(1);
    batch_size.clamp(1, limit.max(1))
}

/// INSERT ... VALUES (...), (...) ON CONFLICT (主键) DO UPDATE
pub(crate) fn upsert_sql(table: &str, columns: &[&str], rows: usize) -> String {
    let width = columns.len();
    let values: Vec<String> = (0..rows)
        .map(|row| {
            let placeholders: Vec<String> = (1..=width)
                .map(|col| format!("${}", row * width + col))
                .collect();
            format!("({})", placeholders.join(", "))
        })
        .collect();

    let key = columns[0];
    let updates: Vec<String> = columns[1..]
        .iter()
        .map(|col| format!("{} = excluded.{}", col, col))
        .collect();

    format!(
        "INSERT INTO {} ({}) VALUES {} ON CONFLICT ({}) DO UPDATE SET {}",
        table,
        columns.join(", "),
        values.join(", "),
        key,
        updates.join(", ")
    )
}

/// 临时性错误：连接断开、连接池超时、数据库忙、事务冲突
pub(crate) fn is_transient(e: &sqlx::Error) -> bool {
    match e {
        sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut | sqlx::Error::WorkerCrashed => true,
        sqlx::Error::Database(db) => db.code().is_some_and(|code| {
            matches!(
                code.as_ref(),
                // sqlite: BUSY / LOCKED / BUSY_RECOVERY / BUSY_SNAPSHOT
                "5" | "6" | "261" | "517"
                // postgres: serialization_failure / deadlock / lock_not_available / admin_shutdown
                | "40001" | "40P01" | "55P03" | "57P01"
            ) || code.starts_with("08")
        }),
        _ => false,
    }
}

/// 同一批失败后按指数退避重试，超过次数返回 RetriesExhausted
///
/// 返回重试的次数。
pub(crate) async fn with_retry<F, Fut>(
    policy: &RetryPolicy,
    table: &'static str,
    offset: usize,
    mut op: F,
) -> Result<u32, StoreError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<(), sqlx::Error>>,
{
    let mut attempt = 0;
    loop {
        attempt += 1;
        match op().await {
            Ok(()) => return Ok(attempt - 1),
            Err(e) if !is_transient(&e) => return Err(StoreError::Database(e)),
            Err(e) if attempt >= policy.max_attempts => {
                tracing::error!(
                    "Giving up on {} batch at row {} after {} attempts: {}",
                    table,
                    offset,
                    attempt,
                    e
                );
                return Err(StoreError::RetriesExhausted {
                    table,
                    offset,
                    attempts: attempt,
                    source: e,
                });
            }
            Err(e) => {
                let delay = policy.delay_for(attempt);
                tracing::warn!("{}... Retrying {} batch in {:?}", e, table, delay);
                tokio::time::sleep(delay).await;
            }
        }
    }
}
