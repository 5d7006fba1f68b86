//! 조회 경로.
//!
//! 스키마가 준비될 때까지 제한된 시간 동안 기다린 뒤 저장소를 조회합니다.

use std::time::Duration;

use market_core::{CandleTable, DailyExtreme, ExtremeCandle};
use market_data::{CandleStore, SchemaReadiness};

use crate::Result;

/// 일별 최고/최저 캔들을 최신순으로 조회합니다.
pub async fn read_extremes(
    store: &dyn CandleStore,
    readiness: &SchemaReadiness,
    table: CandleTable,
    wait: Duration,
) -> Result<Vec<ExtremeCandle>> {
    readiness.wait_ready(wait).await?;
    let candles = store.fetch_extremes(table).await?;
    tracing::debug!(table = %table, count = candles.len(), "극값 캔들 조회");
    Ok(candles)
}

/// 일별 (최고 고가, 최저 저가)를 날짜순으로 조회합니다.
pub async fn read_daily_extremes(
    store: &dyn CandleStore,
    readiness: &SchemaReadiness,
    table: CandleTable,
    wait: Duration,
) -> Result<Vec<DailyExtreme>> {
    readiness.wait_ready(wait).await?;
    Ok(store.daily_extremes(table).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CollectorError;
    use chrono::{TimeZone, Utc};
    use market_core::{Candle, Exchange, ExtremeKind, Granularity, Pair, SeriesKey};
    use market_data::{DataError, MemoryCandleStore};

    #[tokio::test(start_paused = true)]
    async fn test_read_waits_for_readiness() {
        let store = MemoryCandleStore::new();
        let readiness = SchemaReadiness::new();
        let table = CandleTable::new(Pair::BtcUsd, Granularity::Hour);

        let err = read_extremes(&store, &readiness, table, Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, CollectorError::Data(DataError::Timeout(_))));
    }

    #[tokio::test]
    async fn test_read_after_ready() {
        let store = MemoryCandleStore::new();
        let readiness = SchemaReadiness::new();
        readiness.mark_ready();

        let key = SeriesKey::new(Pair::EthUsd, Granularity::Hour, Exchange::Bitfinex);
        let candle = Candle {
            since: Utc.with_ymd_and_hms(2024, 3, 1, 5, 0, 0).unwrap(),
            open: 10.0,
            high: 12.0,
            low: 9.0,
            close: 11.0,
            volume: 4.0,
            trades: None,
            exchange: Exchange::Bitfinex,
        };
        store.persist(&key, &[candle]).await.unwrap();

        let extremes = read_extremes(&store, &readiness, key.table(), Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(extremes.len(), 1);
        assert_eq!(extremes[0].kind, ExtremeKind::Min);

        let days = read_daily_extremes(&store, &readiness, key.table(), Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(days[0].max_high, 12.0);
    }
}
