//! 거래소 에러 타입.

use market_core::{Exchange, Granularity, Pair};
use thiserror::Error;

/// 심볼 매핑 실패 (설정 오류).
///
/// 거래소가 해당 거래 쌍이나 간격을 지원하지 않는 경우이며,
/// 조용히 건너뛰지 않고 시계열 단위로 기록됩니다.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MappingError {
    #[error("{exchange} does not list pair {pair}")]
    UnsupportedPair { exchange: Exchange, pair: Pair },

    #[error("{exchange} has no interval token for {granularity}")]
    UnsupportedInterval {
        exchange: Exchange,
        granularity: Granularity,
    },

    #[error("no market configured for {0}")]
    UnsupportedExchange(Exchange),
}

/// 캔들 조회 실패 (네트워크/파싱).
///
/// 다음 수집 주기에 다시 시도됩니다.
#[derive(Debug, Error)]
pub enum FetchError {
    /// 네트워크/연결 에러
    #[error("Network error: {0}")]
    Network(String),

    /// 요청 타임아웃
    #[error("Request timeout: {0}")]
    Timeout(String),

    /// 2xx가 아닌 HTTP 응답
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// 거래소가 응답 본문에 에러를 보고함
    #[error("API error: {0}")]
    Api(String),

    /// 응답 형식 오류
    #[error("Parse error: {0}")]
    Parse(String),
}

impl FetchError {
    /// 일시적인 에러인지 확인.
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::Network(_) | FetchError::Timeout(_) => true,
            FetchError::Status { status, .. } => *status == 429 || *status >= 500,
            FetchError::Api(_) | FetchError::Parse(_) => false,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout(err.to_string())
        } else if err.is_decode() {
            FetchError::Parse(err.to_string())
        } else {
            FetchError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::Parse(err.to_string())
    }
}

/// `CandleSource::fetch` 에러.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error(transparent)]
    Unsupported(#[from] MappingError),

    #[error(transparent)]
    Fetch(#[from] FetchError),
}
