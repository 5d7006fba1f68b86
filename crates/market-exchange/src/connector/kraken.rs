//! Kraken OHLC 커넥터.
//!
//! `GET /0/public/OHLC?pair=XBTUSD&since=<초>&interval=<분>`
//!
//! 응답 형식:
//! ```text
//! {"error": [], "result": {"XXBTZUSD": [[time, "open", "high", "low", "close", "vwap", "volume", count], ...], "last": 1700000000}}
//! ```
//! 요청 코드(`XBTUSD`)와 응답 키(`XXBTZUSD`)가 다르므로 카탈로그의
//! `MarketSymbol::Split`을 사용합니다.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use market_core::{Candle, Exchange, Granularity, Pair};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use super::read_body;
use crate::traits::{after_boundary, SourceResult};
use crate::{FetchError, MarketCatalog};

/// 문자열 또는 숫자로 오는 가격 필드.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum KrakenNumber {
    Float(f64),
    Text(String),
}

impl KrakenNumber {
    fn value(&self) -> Result<f64, FetchError> {
        match self {
            Self::Float(v) => Ok(*v),
            Self::Text(s) => s
                .parse()
                .map_err(|_| FetchError::Parse(format!("invalid number: {:?}", s))),
        }
    }
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)] // vwap은 저장하지 않음
struct KrakenOhlc(
    i64,          // 0: time (초)
    KrakenNumber, // 1: open
    KrakenNumber, // 2: high
    KrakenNumber, // 3: low
    KrakenNumber, // 4: close
    KrakenNumber, // 5: vwap
    KrakenNumber, // 6: volume
    i64,          // 7: count
);

#[derive(Debug, Deserialize)]
struct KrakenEnvelope {
    #[serde(default)]
    error: Vec<String>,
    #[serde(default)]
    result: Option<serde_json::Map<String, serde_json::Value>>,
}

/// Kraken 공개 OHLC API 클라이언트.
#[derive(Clone)]
pub struct KrakenClient {
    client: Client,
    catalog: Arc<MarketCatalog>,
}

impl KrakenClient {
    pub fn new(client: Client, catalog: Arc<MarketCatalog>) -> Self {
        Self { client, catalog }
    }

    /// `since` 이후 캔들을 조회합니다.
    pub async fn fetch_candles(
        &self,
        pair: Pair,
        since: DateTime<Utc>,
        granularity: Granularity,
    ) -> SourceResult<Vec<Candle>> {
        let symbol = self.catalog.translate(Exchange::Kraken, pair)?;
        let interval = self.catalog.interval(Exchange::Kraken, granularity)?;
        let endpoint = self.catalog.endpoint(Exchange::Kraken)?;

        let params = [
            ("pair", symbol.request_code().to_string()),
            ("since", since.timestamp().to_string()),
            ("interval", interval.to_string()),
        ];

        debug!(
            pair = %pair,
            since = %since,
            interval = %interval,
            "Kraken OHLC 요청"
        );

        let response = self
            .client
            .get(endpoint)
            .query(&params)
            .send()
            .await
            .map_err(FetchError::from)?;
        let body = read_body(response).await?;

        let candles = parse_ohlc(&body, symbol.response_code())?;
        Ok(after_boundary(candles, since))
    }
}

/// Kraken 응답 본문을 캔들로 변환합니다.
///
/// `error` 목록이 비어 있지 않으면 결과를 보지 않고 실패로 처리합니다.
fn parse_ohlc(body: &str, response_key: &str) -> Result<Vec<Candle>, FetchError> {
    let envelope: KrakenEnvelope = serde_json::from_str(body)?;

    if !envelope.error.is_empty() {
        let message = envelope.error.join("; ");
        warn!(error = %message, "Kraken API 에러 응답");
        return Err(FetchError::Api(message));
    }

    let mut result = envelope
        .result
        .ok_or_else(|| FetchError::Parse("Kraken response has no result".to_string()))?;
    let rows = result.remove(response_key).ok_or_else(|| {
        FetchError::Parse(format!("Kraken result has no key {}", response_key))
    })?;
    let rows: Vec<KrakenOhlc> = serde_json::from_value(rows)?;

    rows.into_iter()
        .map(|row| {
            let since = DateTime::from_timestamp(row.0, 0)
                .ok_or_else(|| FetchError::Parse(format!("invalid timestamp: {}", row.0)))?;
            Ok(Candle {
                since,
                open: row.1.value()?,
                high: row.2.value()?,
                low: row.3.value()?,
                close: row.4.value()?,
                volume: row.6.value()?,
                trades: Some(row.7),
                exchange: Exchange::Kraken,
            })
        })
        .collect()
}
