//! 동기화 엔진 테스트용 가짜 거래소와 저장소.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use market_core::{
    Candle, CandleTable, DailyExtreme, Exchange, ExtremeCandle, Granularity, Pair, SeriesKey,
};
use market_data::{CandleStore, DataError, MemoryCandleStore};
use market_exchange::{CandleSource, SourceResult};

type Respond = dyn Fn(Pair, DateTime<Utc>, Granularity) -> SourceResult<Vec<Candle>> + Send + Sync;

/// 응답을 함수로 지정하는 가짜 캔들 소스.
pub struct FakeSource {
    exchange: Exchange,
    respond: Box<Respond>,
    delay: Duration,
    calls: Mutex<Vec<(Pair, DateTime<Utc>, Granularity)>>,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl FakeSource {
    pub fn new(
        exchange: Exchange,
        respond: impl Fn(Pair, DateTime<Utc>, Granularity) -> SourceResult<Vec<Candle>>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        Self {
            exchange,
            respond: Box::new(respond),
            delay: Duration::ZERO,
            calls: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// 호출 시 전달받은 `since` 목록.
    pub fn calls(&self) -> Vec<(Pair, DateTime<Utc>, Granularity)> {
        self.calls.lock().unwrap().clone()
    }

    /// 동시에 진행된 최대 호출 수.
    pub fn peak_concurrency(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CandleSource for FakeSource {
    fn exchange(&self) -> Exchange {
        self.exchange
    }

    async fn fetch(
        &self,
        pair: Pair,
        since: DateTime<Utc>,
        granularity: Granularity,
    ) -> SourceResult<Vec<Candle>> {
        self.calls.lock().unwrap().push((pair, since, granularity));

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        (self.respond)(pair, since, granularity)
    }
}

/// 지정한 시계열의 저장만 실패시키는 저장소.
pub struct FailingStore {
    pub inner: MemoryCandleStore,
    pub fail_persist: Vec<SeriesKey>,
}

#[async_trait]
impl CandleStore for FailingStore {
    async fn watermark(&self, key: &SeriesKey) -> market_data::Result<Option<DateTime<Utc>>> {
        self.inner.watermark(key).await
    }

    async fn persist(&self, key: &SeriesKey, candles: &[Candle]) -> market_data::Result<usize> {
        if self.fail_persist.contains(key) {
            return Err(DataError::QueryError("connection reset".to_string()));
        }
        self.inner.persist(key, candles).await
    }

    async fn daily_extremes(&self, table: CandleTable) -> market_data::Result<Vec<DailyExtreme>> {
        self.inner.daily_extremes(table).await
    }

    async fn fetch_extremes(&self, table: CandleTable) -> market_data::Result<Vec<ExtremeCandle>> {
        self.inner.fetch_extremes(table).await
    }

    async fn drop_all(&self) -> market_data::Result<()> {
        self.inner.drop_all().await
    }
}

pub fn candle(since: DateTime<Utc>, exchange: Exchange) -> Candle {
    Candle {
        since,
        open: 100.0,
        high: 110.0,
        low: 90.0,
        close: 105.0,
        volume: 2.5,
        trades: Some(7),
        exchange,
    }
}

/// `since` 이후 `count`개의 캔들을 간격마다 생성합니다.
pub fn candles_after(
    since: DateTime<Utc>,
    granularity: Granularity,
    count: usize,
    exchange: Exchange,
) -> Vec<Candle> {
    let step = chrono::Duration::seconds(granularity.as_secs() as i64);
    (1..=count as i32)
        .map(|i| candle(since + step * i, exchange))
        .collect()
}

pub fn sources(
    list: Vec<(Exchange, Arc<FakeSource>)>,
) -> HashMap<Exchange, Arc<dyn CandleSource>> {
    list.into_iter()
        .map(|(exchange, source)| (exchange, source as Arc<dyn CandleSource>))
        .collect()
}
