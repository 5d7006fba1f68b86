//! 메모리 캔들 저장소.
//!
//! PostgreSQL 저장소와 같은 계약(자연 키 중복 무시, 워터마크, 일별 극값)을
//! 프로세스 메모리에서 구현합니다. 데이터베이스 없이 동기화 엔진을
//! 실행하거나 테스트할 때 사용합니다.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use market_core::{Candle, CandleTable, DailyExtreme, Exchange, ExtremeCandle, SeriesKey};
use tokio::sync::RwLock;
use tracing::debug;

use crate::aggregation;
use crate::store::CandleStore;
use crate::Result;

type TableRows = BTreeMap<(DateTime<Utc>, Exchange), Candle>;

/// 메모리 저장소.
#[derive(Debug, Default)]
pub struct MemoryCandleStore {
    tables: RwLock<HashMap<CandleTable, TableRows>>,
}

impl MemoryCandleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 테이블의 전체 행 수.
    pub async fn row_count(&self, table: CandleTable) -> usize {
        self.tables
            .read()
            .await
            .get(&table)
            .map(|rows| rows.len())
            .unwrap_or(0)
    }

    /// 시계열의 캔들을 시간순으로 반환합니다.
    pub async fn series(&self, key: &SeriesKey) -> Vec<Candle> {
        self.tables
            .read()
            .await
            .get(&key.table())
            .map(|rows| {
                rows.values()
                    .filter(|c| c.exchange == key.exchange)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    async fn table_candles(&self, table: CandleTable) -> Vec<Candle> {
        self.tables
            .read()
            .await
            .get(&table)
            .map(|rows| rows.values().cloned().collect())
            .unwrap_or_default()
    }
}

#[async_trait]
impl CandleStore for MemoryCandleStore {
    async fn watermark(&self, key: &SeriesKey) -> Result<Option<DateTime<Utc>>> {
        let tables = self.tables.read().await;
        Ok(tables.get(&key.table()).and_then(|rows| {
            rows.keys()
                .filter(|(_, exchange)| *exchange == key.exchange)
                .map(|(since, _)| *since)
                .max()
        }))
    }

    async fn persist(&self, key: &SeriesKey, candles: &[Candle]) -> Result<usize> {
        if candles.is_empty() {
            return Ok(0);
        }

        let mut tables = self.tables.write().await;
        let rows = tables.entry(key.table()).or_default();

        let mut inserted = 0;
        for candle in candles {
            if let std::collections::btree_map::Entry::Vacant(slot) =
                rows.entry((candle.since, candle.exchange))
            {
                slot.insert(candle.clone());
                inserted += 1;
            }
        }

        debug!(
            series = %key,
            requested = candles.len(),
            inserted = inserted,
            "메모리 저장소에 캔들 저장"
        );

        Ok(inserted)
    }

    async fn daily_extremes(&self, table: CandleTable) -> Result<Vec<DailyExtreme>> {
        let candles = self.table_candles(table).await;
        Ok(aggregation::daily_extremes(&candles))
    }

    async fn fetch_extremes(&self, table: CandleTable) -> Result<Vec<ExtremeCandle>> {
        let candles = self.table_candles(table).await;
        Ok(aggregation::extreme_candles(&candles))
    }

    async fn drop_all(&self) -> Result<()> {
        self.tables.write().await.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use market_core::{Granularity, Pair};

    fn candles(exchange: Exchange, hours: &[i64]) -> Vec<Candle> {
        let base = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        hours
            .iter()
            .map(|h| Candle {
                since: base + Duration::hours(*h),
                open: 1.0,
                high: 2.0 + *h as f64,
                low: 0.5,
                close: 1.5,
                volume: 3.0,
                trades: Some(1),
                exchange,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_persist_ignores_duplicates() {
        let store = MemoryCandleStore::new();
        let key = SeriesKey::new(Pair::BtcUsd, Granularity::Hour, Exchange::Kraken);

        assert_eq!(store.persist(&key, &candles(Exchange::Kraken, &[0, 1, 2])).await.unwrap(), 3);
        assert_eq!(store.persist(&key, &candles(Exchange::Kraken, &[1, 2, 3])).await.unwrap(), 1);
        assert_eq!(store.row_count(key.table()).await, 4);
    }

    #[tokio::test]
    async fn test_watermark_is_per_exchange() {
        let store = MemoryCandleStore::new();
        let kraken = SeriesKey::new(Pair::EthUsd, Granularity::Hour, Exchange::Kraken);
        let bitfinex = SeriesKey::new(Pair::EthUsd, Granularity::Hour, Exchange::Bitfinex);

        assert_eq!(store.watermark(&kraken).await.unwrap(), None);

        store.persist(&kraken, &candles(Exchange::Kraken, &[0, 5])).await.unwrap();
        store.persist(&bitfinex, &candles(Exchange::Bitfinex, &[0, 9])).await.unwrap();

        let base = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        assert_eq!(store.watermark(&kraken).await.unwrap(), Some(base + Duration::hours(5)));
        assert_eq!(store.watermark(&bitfinex).await.unwrap(), Some(base + Duration::hours(9)));
        // 같은 since라도 거래소가 다르면 별개의 행
        assert_eq!(store.row_count(kraken.table()).await, 4);
        assert_eq!(store.series(&kraken).await.len(), 2);
    }

    #[tokio::test]
    async fn test_drop_all() {
        let store = MemoryCandleStore::new();
        let key = SeriesKey::new(Pair::XrpUsd, Granularity::Minute, Exchange::Bitfinex);
        store.persist(&key, &candles(Exchange::Bitfinex, &[0])).await.unwrap();

        store.drop_all().await.unwrap();
        assert_eq!(store.watermark(&key).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_extremes_over_table() {
        let store = MemoryCandleStore::new();
        let key = SeriesKey::new(Pair::BtcUsd, Granularity::Hour, Exchange::Kraken);
        store.persist(&key, &candles(Exchange::Kraken, &[0, 1, 2])).await.unwrap();

        let days = store.daily_extremes(key.table()).await.unwrap();
        assert_eq!(days.len(), 1);
        assert_eq!(days[0].max_high, 4.0);

        // 세 캔들 모두 최저가 0.5를 공유
        let extremes = store.fetch_extremes(key.table()).await.unwrap();
        assert_eq!(extremes.len(), 3);
    }
}
