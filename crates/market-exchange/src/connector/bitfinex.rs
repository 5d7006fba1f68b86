//! Bitfinex 캔들 커넥터.
//!
//! `GET /v2/candles/trade:{interval}:{symbol}/hist?start=<밀리초>&limit=10000&sort=1`
//!
//! 응답은 `[MTS, OPEN, CLOSE, HIGH, LOW, VOLUME]` 배열의 배열입니다.
//! Kraken과 달리 종가가 고가보다 앞에 오고 타임스탬프가 밀리초입니다.
//! 빈 배열은 에러가 아니라 "새 데이터 없음"입니다.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use market_core::{Candle, Exchange, Granularity, Pair};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::read_body;
use crate::traits::{after_boundary, SourceResult};
use crate::{FetchError, MarketCatalog};

/// 요청당 최대 캔들 수 (Bitfinex 상한).
const MAX_LIMIT: u32 = 10_000;

#[derive(Debug, Deserialize)]
struct BitfinexCandle(
    i64, // 0: MTS
    f64, // 1: OPEN
    f64, // 2: CLOSE
    f64, // 3: HIGH
    f64, // 4: LOW
    f64, // 5: VOLUME
);

/// Bitfinex 공개 캔들 API 클라이언트.
#[derive(Clone)]
pub struct BitfinexClient {
    client: Client,
    catalog: Arc<MarketCatalog>,
}

impl BitfinexClient {
    pub fn new(client: Client, catalog: Arc<MarketCatalog>) -> Self {
        Self { client, catalog }
    }

    pub async fn fetch_candles(
        &self,
        pair: Pair,
        since: DateTime<Utc>,
        granularity: Granularity,
    ) -> SourceResult<Vec<Candle>> {
        let symbol = self.catalog.translate(Exchange::Bitfinex, pair)?;
        let interval = self.catalog.interval(Exchange::Bitfinex, granularity)?;
        let url = self
            .catalog
            .endpoint(Exchange::Bitfinex)?
            .replace("{interval}", &interval.to_string())
            .replace("{symbol}", symbol.request_code());

        let params = [
            ("start", since.timestamp_millis().to_string()),
            ("limit", MAX_LIMIT.to_string()),
            ("sort", "1".to_string()),
        ];

        debug!(pair = %pair, since = %since, url = %url, "Bitfinex 캔들 요청");

        let response = self
            .client
            .get(&url)
            .query(&params)
            .send()
            .await
            .map_err(FetchError::from)?;
        let body = read_body(response).await?;

        let candles = parse_candles(&body)?;
        Ok(after_boundary(candles, since))
    }
}

/// Bitfinex 응답 본문을 캔들로 변환합니다.
fn parse_candles(body: &str) -> Result<Vec<Candle>, FetchError> {
    let value: Value = serde_json::from_str(body)?;

    // 에러 응답: ["error", 10020, "limit: invalid"]
    if let Some(items) = value.as_array() {
        if items.first().and_then(Value::as_str) == Some("error") {
            let message = items
                .iter()
                .skip(1)
                .map(|v| match v {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join(" ");
            warn!(error = %message, "Bitfinex API 에러 응답");
            return Err(FetchError::Api(message));
        }
    }

    let rows: Vec<BitfinexCandle> = serde_json::from_value(value)?;

    rows.into_iter()
        .map(|row| {
            let since = DateTime::from_timestamp_millis(row.0)
                .ok_or_else(|| FetchError::Parse(format!("invalid timestamp: {}", row.0)))?;
            Ok(Candle {
                since,
                open: row.1,
                close: row.2,
                high: row.3,
                low: row.4,
                volume: row.5,
                trades: None,
                exchange: Exchange::Bitfinex,
            })
        })
        .collect()
}
