//! 공유 HTTP 클라이언트 설정.
//!
//! 한 수집 주기 안의 모든 조회는 하나의 `reqwest::Client`(연결 풀)를 공유합니다.

use std::time::Duration;

use reqwest::Client;

use crate::FetchError;

/// HTTP 클라이언트 설정.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// 요청 타임아웃 (초)
    pub timeout_secs: u64,
    /// 연결 타임아웃 (초)
    pub connect_timeout_secs: u64,
    /// 호스트별 유휴 연결 최대 수
    pub pool_max_idle_per_host: usize,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            connect_timeout_secs: 10,
            pool_max_idle_per_host: 8,
            user_agent: concat!("market-collector/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl HttpConfig {
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// 공유 클라이언트 생성.
    ///
    /// # Errors
    /// TLS 백엔드 초기화 실패 시 `FetchError::Network`를 반환합니다.
    pub fn build_client(&self) -> Result<Client, FetchError> {
        Client::builder()
            .timeout(Duration::from_secs(self.timeout_secs))
            .connect_timeout(Duration::from_secs(self.connect_timeout_secs))
            .pool_max_idle_per_host(self.pool_max_idle_per_host)
            .user_agent(&self.user_agent)
            .build()
            .map_err(|e| FetchError::Network(format!("HTTP 클라이언트 생성 실패: {}", e)))
    }
}
