use std::env;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

/// 最宽的表有 8 列，8 * 4000 不超过 sqlite 的 32766 个绑定参数
pub const MAX_UPSERT_BATCH_SIZE: usize = 4000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
    #[error("unsupported database type: {0}")]
    UnsupportedBackend(String),
}

/// 存储后端
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DbBackend {
    Sqlite { path: String },
    Postgres { url: String },
}

impl DbBackend {
    /// sqlx any 驱动使用的连接串
    pub fn connection_url(&self) -> String {
        match self {
            DbBackend::Sqlite { path } if path == ":memory:" => "sqlite::memory:".to_string(),
            DbBackend::Sqlite { path } => format!("sqlite://{}?mode=rwc", path),
            DbBackend::Postgres { url } => url.clone(),
        }
    }
}

/// 解析开关，启动时确定，之后不再变化
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseFlags {
    pub sightings: bool,
    pub stops: bool,
    pub gyms: bool,
}

impl Default for ParseFlags {
    fn default() -> Self {
        Self {
            sightings: true,
            stops: true,
            gyms: true,
        }
    }
}

/// 批量写入的重试策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl RetryPolicy {
    /// 第 attempt 次失败后的等待时间（从 1 开始），指数增长
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt.saturating_sub(1)).unwrap_or(u32::MAX);
        self.base_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(5),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub backend: DbBackend,
    pub max_connections: u32,
    pub parse_flags: ParseFlags,
    pub strict_parsing: bool,
    pub china_display: bool,
    pub upsert_batch_size: usize,
    pub retry: RetryPolicy,
    pub server_host: String,
    pub server_port: u16,
    pub api_base_uri: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 从任意键值来源读取配置，方便测试
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let db_type = lookup("DB_TYPE").unwrap_or_else(|| "sqlite".into());
        let backend = match db_type.to_ascii_lowercase().as_str() {
            "sqlite" => DbBackend::Sqlite {
                path: lookup("DB_PATH").unwrap_or_else(|| "mapscan.db".into()),
            },
            "postgres" | "postgresql" => DbBackend::Postgres {
                url: lookup("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?,
            },
            _ => return Err(ConfigError::UnsupportedBackend(db_type)),
        };

        let retry = RetryPolicy {
            max_attempts: parse_or(&lookup, "UPSERT_MAX_ATTEMPTS", 5u32)?.max(1),
            base_delay: Duration::from_millis(parse_or(&lookup, "UPSERT_BACKOFF_MS", 100u64)?),
            max_delay: Duration::from_secs(5),
        };

        let upsert_batch_size = parse_or(&lookup, "UPSERT_BATCH_SIZE", 120usize)?;
        if !(1..=MAX_UPSERT_BATCH_SIZE).contains(&upsert_batch_size) {
            return Err(ConfigError::Invalid {
                key: "UPSERT_BATCH_SIZE",
                value: upsert_batch_size.to_string(),
            });
        }

        Ok(Config {
            backend,
            max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", 5u32)?,
            parse_flags: ParseFlags {
                sightings: flag_or(&lookup, "PARSE_CREATURES", true)?,
                stops: flag_or(&lookup, "PARSE_STOPS", true)?,
                gyms: flag_or(&lookup, "PARSE_GYMS", true)?,
            },
            strict_parsing: flag_or(&lookup, "STRICT_PARSING", true)?,
            china_display: flag_or(&lookup, "CHINA_DISPLAY", false)?,
            upsert_batch_size,
            retry,
            server_host: lookup("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            server_port: parse_or(&lookup, "SERVER_PORT", 5000u16)?,
            api_base_uri: lookup("API_BASE_URI").unwrap_or_default(),
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value: raw }),
        None => Ok(default),
    }
}

fn flag_or<F>(lookup: &F, key: &'static str, default: bool) -> Result<bool, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::Invalid { key, value: raw }),
        },
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_to_sqlite_with_everything_enabled() {
        let config = config_from(&[]).unwrap();
        assert_eq!(
            config.backend,
            DbBackend::Sqlite {
                path: "mapscan.db".into()
            }
        );
        assert_eq!(config.parse_flags, ParseFlags::default());
        assert!(config.strict_parsing);
        assert!(!config.china_display);
        assert_eq!(config.upsert_batch_size, 120);
        assert_eq!(config.server_port, 5000);
    }

    #[test]
    fn unknown_backend_is_fatal() {
        let err = config_from(&[("DB_TYPE", "mongodb")]).unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedBackend(ref t) if t == "mongodb"));
    }

    #[test]
    fn postgres_needs_a_url() {
        let err = config_from(&[("DB_TYPE", "postgres")]).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("DATABASE_URL")));

        let config = config_from(&[
            ("DB_TYPE", "postgres"),
            ("DATABASE_URL", "postgres://localhost/mapscan"),
        ])
        .unwrap();
        assert_eq!(
            config.backend.connection_url(),
            "postgres://localhost/mapscan"
        );
    }

    #[test]
    fn flags_and_numbers_are_validated() {
        let config = config_from(&[("PARSE_GYMS", "false"), ("CHINA_DISPLAY", "1")]).unwrap();
        assert!(!config.parse_flags.gyms);
        assert!(config.parse_flags.stops);
        assert!(config.china_display);

        assert!(matches!(
            config_from(&[("PARSE_STOPS", "maybe")]),
            Err(ConfigError::Invalid { key: "PARSE_STOPS", .. })
        ));
        assert!(matches!(
            config_from(&[("UPSERT_BATCH_SIZE", "0")]),
            Err(ConfigError::Invalid { .. })
        ));
        assert!(matches!(
            config_from(&[("UPSERT_BATCH_SIZE", "6000")]),
            Err(ConfigError::Invalid { key: "UPSERT_BATCH_SIZE", .. })
        ));
        assert_eq!(
            config_from(&[("UPSERT_BATCH_SIZE", "4000")])
                .unwrap()
                .upsert_batch_size,
            4000
        );
    }

    #[test]
    fn backoff_doubles_and_caps() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(1), Duration::from_millis(100));
        assert_eq!(policy.delay_for(2), Duration::from_millis(200));
        assert_eq!(policy.delay_for(4), Duration::from_millis(800));
        assert_eq!(policy.delay_for(40), Duration::from_secs(5));
    }
}
