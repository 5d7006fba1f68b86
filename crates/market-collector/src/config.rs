//! 환경변수 기반 설정 모듈.

use std::time::Duration;

use market_core::{Exchange, LogConfig, LogFormat};
use market_data::DatabaseConfig;
use market_exchange::MarketCatalog;

use crate::error::CollectorError;
use crate::modules::{LookbackPolicy, ReconcilePolicy, MAX_LOOKBACK_DAYS};
use crate::Result;

/// Collector 전체 설정
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// 데이터베이스 설정
    pub database: DatabaseConfig,
    /// 동기화 엔진 설정
    pub reconcile: ReconcileConfig,
    /// 스키마 준비 대기 시간 (초)
    pub schema_wait_secs: u64,
    /// 거래소 엔드포인트 재정의
    pub endpoints: EndpointConfig,
    /// 데몬 모드 설정
    pub daemon: DaemonConfig,
}

/// 동기화 엔진 설정
#[derive(Debug, Clone)]
pub struct ReconcileConfig {
    /// 시간봉 최초 수집 기간 (일)
    pub lookback_hour_days: i64,
    /// 분봉 최초 수집 기간 (일)
    pub lookback_minute_days: i64,
    /// 조회당 타임아웃 (초)
    pub fetch_timeout_secs: u64,
    /// 동시 조회 수 상한
    pub fetch_concurrency: usize,
}

#[derive(Debug, Clone, Default)]
pub struct EndpointConfig {
    pub kraken: Option<String>,
    pub bitfinex: Option<String>,
}

/// 데몬 모드 설정
#[derive(Debug, Clone)]
pub struct DaemonConfig {
    /// 동기화 주기 (분 단위)
    pub interval_minutes: u64,
}

impl CollectorConfig {
    /// 환경변수에서 설정 로드
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 주어진 조회 함수로 설정을 구성합니다.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let database_url = lookup("DATABASE_URL").ok_or_else(|| {
            CollectorError::Config("DATABASE_URL 환경변수가 설정되지 않았습니다".to_string())
        })?;

        let mut database = DatabaseConfig::new(database_url);
        database.max_connections = parse_or(&lookup, "DB_MAX_CONNECTIONS", 10);
        database.min_connections = parse_or(&lookup, "DB_MIN_CONNECTIONS", 2);

        let reconcile = ReconcileConfig {
            lookback_hour_days: parse_or(&lookup, "LOOKBACK_HOUR_DAYS", 30),
            lookback_minute_days: parse_or(&lookup, "LOOKBACK_MINUTE_DAYS", 1),
            fetch_timeout_secs: parse_or(&lookup, "FETCH_TIMEOUT_SECS", 30),
            fetch_concurrency: parse_or(&lookup, "FETCH_CONCURRENCY", 8),
        };

        let lookback_range = 1..=MAX_LOOKBACK_DAYS;
        if !lookback_range.contains(&reconcile.lookback_hour_days)
            || !lookback_range.contains(&reconcile.lookback_minute_days)
        {
            return Err(CollectorError::Config(format!(
                "LOOKBACK_*_DAYS는 1 이상 {} 이하여야 합니다",
                MAX_LOOKBACK_DAYS
            )));
        }

        let daemon = DaemonConfig {
            interval_minutes: parse_or(&lookup, "DAEMON_INTERVAL_MINUTES", 60),
        };
        if daemon.interval_minutes == 0 {
            return Err(CollectorError::Config(
                "DAEMON_INTERVAL_MINUTES는 1 이상이어야 합니다".to_string(),
            ));
        }

        Ok(Self {
            database,
            reconcile,
            schema_wait_secs: parse_or(&lookup, "SCHEMA_WAIT_SECS", 30),
            endpoints: EndpointConfig {
                kraken: lookup("KRAKEN_ENDPOINT"),
                bitfinex: lookup("BITFINEX_ENDPOINT"),
            },
            daemon,
        })
    }

    /// 엔드포인트 재정의를 반영한 심볼 카탈로그.
    pub fn catalog(&self) -> MarketCatalog {
        let mut catalog = MarketCatalog::builtin();
        if let Some(url) = &self.endpoints.kraken {
            catalog = catalog.with_endpoint(Exchange::Kraken, url.clone());
        }
        if let Some(url) = &self.endpoints.bitfinex {
            catalog = catalog.with_endpoint(Exchange::Bitfinex, url.clone());
        }
        catalog
    }

    pub fn schema_wait(&self) -> Duration {
        Duration::from_secs(self.schema_wait_secs)
    }
}

impl ReconcileConfig {
    pub fn policy(&self) -> ReconcilePolicy {
        ReconcilePolicy {
            lookback: LookbackPolicy::new(self.lookback_hour_days, self.lookback_minute_days),
            fetch_timeout: Duration::from_secs(self.fetch_timeout_secs),
            max_concurrent_fetches: self.fetch_concurrency,
        }
    }
}

impl DaemonConfig {
    /// 동기화 주기를 Duration으로 반환
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_minutes * 60)
    }
}

/// `.env`를 읽은 뒤 로깅 설정을 구성합니다.
///
/// 우선순위: CLI 인자 > `RUST_LOG`/`LOG_FORMAT` (.env 포함) > 기본값.
pub fn load_log_config(level: Option<String>, format: Option<LogFormat>) -> LogConfig {
    dotenvy::dotenv().ok();
    apply_log_overrides(LogConfig::from_env(), level, format)
}

fn apply_log_overrides(
    mut config: LogConfig,
    level: Option<String>,
    format: Option<LogFormat>,
) -> LogConfig {
    if let Some(level) = level {
        config.level = level;
    }
    if let Some(format) = format {
        config = config.with_format(format);
    }
    config
}

/// 값을 파싱 (없거나 실패 시 기본값 사용)
fn parse_or<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> T {
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
