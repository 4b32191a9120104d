use rust_decimal::Decimal;
use std::path::PathBuf;
use std::str::FromStr;

use crate::message::bus::DEFAULT_CAPACITY;
use crate::pricing::PricingRates;

/// 内存数据库 URL (测试用)
pub const IN_MEMORY_DATABASE_URL: &str = "sqlite::memory:";

/// 服务器配置
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | ./data | 工作目录 (数据库 + 日志) |
/// | HTTP_PORT | 8080 | HTTP 服务端口 |
/// | DATABASE_URL | sqlite://{WORK_DIR}/delivery.db | SQLite 数据库 |
/// | DB_MAX_CONNECTIONS | 5 | 连接池大小 |
/// | LOG_LEVEL | info | 默认日志级别 |
/// | BUS_CAPACITY | 1024 | 消息总线容量 |
/// | ENVIRONMENT | development | 运行环境 |
/// | PLATFORM_FEE_PERCENT | 2 | 平台费率 (%) |
/// | TAX_PERCENT | 5 | 税率 (%) |
///
/// # 示例
///
/// ```ignore
/// WORK_DIR=/srv/delivery HTTP_PORT=9000 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录，存储数据库和日志
    pub work_dir: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    pub database_url: String,
    pub db_max_connections: u32,
    pub log_level: String,
    /// 消息总线广播通道容量
    pub bus_capacity: usize,
    /// 运行环境: development | production
    pub environment: String,
    /// 平台费率，百分比
    pub platform_fee_percent: Decimal,
    /// 税率，百分比
    pub tax_percent: Decimal,
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置或无法解析，使用默认值
    pub fn from_env() -> Self {
        let work_dir = std::env::var("WORK_DIR").unwrap_or_else(|_| "./data".into());
        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| format!("sqlite://{work_dir}/delivery.db"));

        Self {
            http_port: env_or("HTTP_PORT", 8080),
            database_url,
            db_max_connections: env_or("DB_MAX_CONNECTIONS", 5),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            bus_capacity: env_or("BUS_CAPACITY", DEFAULT_CAPACITY),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            platform_fee_percent: env_or("PLATFORM_FEE_PERCENT", Decimal::from(2)),
            tax_percent: env_or("TAX_PERCENT", Decimal::from(5)),
            work_dir,
        }
    }

    /// 测试配置：内存数据库，默认费率
    pub fn for_tests() -> Self {
        Self {
            work_dir: std::env::temp_dir().to_string_lossy().into_owned(),
            http_port: 0,
            database_url: IN_MEMORY_DATABASE_URL.into(),
            db_max_connections: 1,
            log_level: "debug".into(),
            bus_capacity: DEFAULT_CAPACITY,
            environment: "test".into(),
            platform_fee_percent: Decimal::from(2),
            tax_percent: Decimal::from(5),
        }
    }

    pub fn pricing_rates(&self) -> PricingRates {
        PricingRates::from_percent(self.platform_fee_percent, self.tax_percent)
    }

    pub fn is_in_memory(&self) -> bool {
        self.database_url == IN_MEMORY_DATABASE_URL
    }

    /// 日志目录
    pub fn log_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("logs")
    }

    /// 确保工作目录结构存在
    pub fn ensure_work_dir_structure(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.work_dir)?;
        std::fs::create_dir_all(self.log_dir())
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_tests_defaults() {
        let config = Config::for_tests();
        assert!(config.is_in_memory());
        assert!(!config.is_production());
        assert_eq!(config.pricing_rates(), PricingRates::default());
    }

    #[test]
    fn test_env_or_falls_back_on_garbage() {
        assert_eq!(env_or("ORDER_SERVER_TEST_UNSET_VAR", 42_u16), 42);
    }

    #[test]
    fn test_custom_rates() {
        let mut config = Config::for_tests();
        config.platform_fee_percent = Decimal::new(25, 1);
        config.tax_percent = Decimal::from(18);
        let rates = config.pricing_rates();
        assert_eq!(rates.platform_fee_rate, Decimal::new(25, 3));
        assert_eq!(rates.tax_rate, Decimal::new(18, 2));
    }
}
