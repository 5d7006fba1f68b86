//! 에러 타입 정의.

use market_data::DataError;
use market_exchange::FetchError;
use thiserror::Error;

/// Collector 에러 타입
#[derive(Debug, Error)]
pub enum CollectorError {
    /// 설정 에러
    #[error("Configuration error: {0}")]
    Config(String),

    /// 저장소 에러
    #[error("Data error: {0}")]
    Data(#[from] DataError),

    /// HTTP 클라이언트 에러
    #[error("HTTP client error: {0}")]
    Http(#[from] FetchError),

    /// 스키마 프로비저닝 실패 (일부 테이블 사용 불가)
    #[error("Schema provisioning incomplete: {0} table(s) failed")]
    Provision(usize),
}

impl From<std::env::VarError> for CollectorError {
    fn from(err: std::env::VarError) -> Self {
        Self::Config(err.to_string())
    }
}

/// Result 타입 별칭
pub type Result<T> = std::result::Result<T, CollectorError>;
