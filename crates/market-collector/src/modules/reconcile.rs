//! 시계열 증분 동기화 엔진.
//!
//! 시계열 (거래 쌍, 간격, 거래소)마다 한 주기에 다음을 수행합니다:
//!
//! 1. 워터마크 조회 (없으면 간격별 기본 기간만큼 과거 시각)
//! 2. 거래소 어댑터로 워터마크 이후 캔들 조회
//! 3. 워터마크 이하 캔들 제거
//! 4. 남은 캔들이 없으면 종료
//! 5. 일괄 저장
//!
//! 모든 시계열은 같은 태스크 안에서 동시에 진행되며(`join_all`), 한 시계열의
//! 실패는 해당 시계열의 결과로만 기록됩니다. 주기 future를 drop하면 진행 중인
//! 모든 조회가 함께 취소되고, 저장은 시계열당 한 문장이라 부분 커밋이 없습니다.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use futures::future::join_all;
use market_core::{series_span, Candle, Exchange, Granularity, SeriesKey};
use market_data::CandleStore;
use market_exchange::{CandleSource, FetchError, SourceError};
use tokio::sync::Semaphore;
use tracing::{debug, info, warn, Instrument};

use crate::stats::{CycleReport, SeriesOutcome, SeriesReport, SkipReason};

/// 워터마크가 없는 시계열의 최초 수집 기간.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookbackPolicy {
    hour: chrono::Duration,
    minute: chrono::Duration,
}

impl Default for LookbackPolicy {
    fn default() -> Self {
        Self::new(30, 1)
    }
}

/// 최초 수집 기간 상한 (일).
pub const MAX_LOOKBACK_DAYS: i64 = 36_500;

impl LookbackPolicy {
    /// 간격별 기간(일)으로 생성합니다. 범위를 벗어난 값은 `1..=MAX_LOOKBACK_DAYS`로 조정됩니다.
    pub fn new(hour_days: i64, minute_days: i64) -> Self {
        let days = |d: i64| chrono::Duration::days(d.clamp(1, MAX_LOOKBACK_DAYS));
        Self {
            hour: days(hour_days),
            minute: days(minute_days),
        }
    }

    pub fn window(&self, granularity: Granularity) -> chrono::Duration {
        match granularity {
            Granularity::Hour => self.hour,
            Granularity::Minute => self.minute,
        }
    }

    /// `now` 기준 최초 수집 시작 시각.
    pub fn start_from(&self, granularity: Granularity, now: DateTime<Utc>) -> DateTime<Utc> {
        now.checked_sub_signed(self.window(granularity))
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}

/// 동기화 정책.
#[derive(Debug, Clone)]
pub struct ReconcilePolicy {
    pub lookback: LookbackPolicy,
    /// 조회당 타임아웃. 초과 시 `FetchError::Timeout`으로 처리
    pub fetch_timeout: Duration,
    /// 동시에 진행되는 거래소 조회 수 상한
    pub max_concurrent_fetches: usize,
}

impl Default for ReconcilePolicy {
    fn default() -> Self {
        Self {
            lookback: LookbackPolicy::default(),
            fetch_timeout: Duration::from_secs(30),
            max_concurrent_fetches: 8,
        }
    }
}

/// 워터마크 이후 캔들만 시간순으로 남깁니다.
///
/// 두 번째 값은 제거된 캔들 수입니다.
pub fn filter_after(mut candles: Vec<Candle>, watermark: DateTime<Utc>) -> (Vec<Candle>, usize) {
    let before = candles.len();
    candles.retain(|c| c.since > watermark);
    candles.sort_by_key(|c| c.since);
    let dropped = before - candles.len();
    (candles, dropped)
}

/// 증분 동기화 엔진.
pub struct Reconciler {
    store: Arc<dyn CandleStore>,
    sources: HashMap<Exchange, Arc<dyn CandleSource>>,
    universe: Vec<SeriesKey>,
    policy: ReconcilePolicy,
    fetch_limit: Semaphore,
}

impl Reconciler {
    pub fn new(
        store: Arc<dyn CandleStore>,
        sources: HashMap<Exchange, Arc<dyn CandleSource>>,
        universe: Vec<SeriesKey>,
        policy: ReconcilePolicy,
    ) -> Self {
        let fetch_limit = Semaphore::new(policy.max_concurrent_fetches.max(1));
        Self {
            store,
            sources,
            universe,
            policy,
            fetch_limit,
        }
    }

    pub fn universe(&self) -> &[SeriesKey] {
        &self.universe
    }

    /// 모든 시계열을 한 주기 동기화합니다.
    ///
    /// 모든 시계열이 끝날 때까지 반환하지 않으며 개별 실패는 보고서에 기록됩니다.
    pub async fn run_cycle(&self) -> CycleReport {
        let start = Instant::now();
        info!(series = self.universe.len(), "동기화 주기 시작");

        let units = self.universe.iter().map(|&key| async move {
            SeriesReport {
                key,
                outcome: self.run_series(key).await,
            }
        });
        let series = join_all(units).await;

        CycleReport {
            series,
            elapsed: start.elapsed(),
        }
    }

    /// 시계열 하나를 동기화합니다.
    pub async fn run_series(&self, key: SeriesKey) -> SeriesOutcome {
        self.reconcile(key)
            .instrument(series_span!("reconcile", key))
            .await
    }

    async fn reconcile(&self, key: SeriesKey) -> SeriesOutcome {
        // 1. 워터마크
        let watermark = match self.store.watermark(&key).await {
            Ok(Some(since)) => since,
            Ok(None) => {
                let start = self.policy.lookback.start_from(key.granularity, Utc::now());
                debug!(start = %start, "워터마크 없음, 기본 기간부터 수집");
                start
            }
            Err(e) => {
                warn!(error = %e, "워터마크 조회 실패");
                return skipped(SkipReason::Store(e.to_string()));
            }
        };

        // 2. 조회
        let Some(source) = self.sources.get(&key.exchange) else {
            warn!("거래소 어댑터가 구성되지 않음");
            return skipped(SkipReason::Unsupported(format!(
                "no candle source configured for {}",
                key.exchange
            )));
        };

        let fetched = match self.fetch(source.as_ref(), &key, watermark).await {
            Ok(candles) => candles,
            Err(reason) => return skipped(reason),
        };

        // 3. 필터
        let (fresh, dropped) = filter_after(fetched, watermark);
        if dropped > 0 {
            debug!(dropped = dropped, watermark = %watermark, "워터마크 이하 캔들 제거");
        }

        // 4. 새 데이터 없음
        let Some(latest) = fresh.last().map(|c| c.since) else {
            debug!("새 캔들 없음");
            return SeriesOutcome::UpToDate;
        };

        // 5. 저장
        match self.store.persist(&key, &fresh).await {
            Ok(inserted) => {
                info!(
                    fetched = fresh.len(),
                    inserted = inserted,
                    watermark = %latest,
                    "캔들 저장 완료"
                );
                SeriesOutcome::Persisted {
                    inserted,
                    watermark: latest,
                }
            }
            Err(e) => {
                warn!(error = %e, "캔들 저장 실패");
                skipped(SkipReason::Store(e.to_string()))
            }
        }
    }

    async fn fetch(
        &self,
        source: &dyn CandleSource,
        key: &SeriesKey,
        since: DateTime<Utc>,
    ) -> Result<Vec<Candle>, SkipReason> {
        let _permit = self
            .fetch_limit
            .acquire()
            .await
            .map_err(|_| SkipReason::Fetch("fetch limiter closed".to_string()))?;

        let request = source.fetch(key.pair, since, key.granularity);
        match tokio::time::timeout(self.policy.fetch_timeout, request).await {
            Ok(Ok(candles)) => {
                debug!(count = candles.len(), since = %since, "캔들 조회 완료");
                Ok(candles)
            }
            Ok(Err(SourceError::Unsupported(e))) => {
                warn!(error = %e, "지원하지 않는 시계열");
                Err(SkipReason::Unsupported(e.to_string()))
            }
            Ok(Err(SourceError::Fetch(e))) => {
                warn!(error = %e, transient = e.is_transient(), "캔들 조회 실패");
                Err(SkipReason::Fetch(e.to_string()))
            }
            Err(_) => {
                let e = FetchError::Timeout(format!(
                    "no response within {:.1}s",
                    self.policy.fetch_timeout.as_secs_f64()
                ));
                warn!(error = %e, "캔들 조회 타임아웃");
                Err(SkipReason::Fetch(e.to_string()))
            }
        }
    }
}

fn skipped(reason: SkipReason) -> SeriesOutcome {
    SeriesOutcome::Skipped { reason }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn candle_at(since: DateTime<Utc>) -> Candle {
        Candle {
            since,
            open: 1.0,
            high: 1.0,
            low: 1.0,
            close: 1.0,
            volume: 1.0,
            trades: None,
            exchange: Exchange::Kraken,
        }
    }

    #[test]
    fn test_lookback_defaults() {
        let policy = LookbackPolicy::default();
        let now = Utc.with_ymd_and_hms(2024, 3, 31, 12, 0, 0).unwrap();
        assert_eq!(
            policy.start_from(Granularity::Hour, now),
            Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
        );
        assert_eq!(
            policy.start_from(Granularity::Minute, now),
            Utc.with_ymd_and_hms(2024, 3, 30, 12, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_lookback_out_of_range_is_clamped() {
        let now = Utc.with_ymd_and_hms(2024, 3, 31, 12, 0, 0).unwrap();
        let policy = LookbackPolicy::new(100_000_000, 0);

        assert_eq!(
            policy.window(Granularity::Hour),
            chrono::Duration::days(MAX_LOOKBACK_DAYS)
        );
        assert_eq!(policy.window(Granularity::Minute), chrono::Duration::days(1));
        assert!(policy.start_from(Granularity::Hour, now) < now);
        assert_eq!(
            LookbackPolicy::new(1, 1).start_from(Granularity::Hour, DateTime::<Utc>::MIN_UTC),
            DateTime::<Utc>::MIN_UTC
        );
    }

    #[test]
    fn test_filter_drops_boundary_candle() {
        let watermark = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let candles = vec![
            candle_at(watermark + chrono::Duration::hours(2)),
            candle_at(watermark),
            candle_at(watermark + chrono::Duration::hours(1)),
        ];

        let (fresh, dropped) = filter_after(candles, watermark);
        assert_eq!(dropped, 1);
        assert_eq!(fresh.len(), 2);
        assert!(fresh[0].since < fresh[1].since);
    }

    proptest! {
        #[test]
        fn prop_filter_never_keeps_old_candles(
            offsets in proptest::collection::vec(-500i64..500, 0..64),
        ) {
            let watermark = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
            let candles: Vec<Candle> = offsets
                .iter()
                .map(|m| candle_at(watermark + chrono::Duration::minutes(*m)))
                .collect();

            let (fresh, dropped) = filter_after(candles, watermark);

            prop_assert!(fresh.iter().all(|c| c.since > watermark));
            prop_assert_eq!(fresh.len() + dropped, offsets.len());
            prop_assert_eq!(fresh.len(), offsets.iter().filter(|m| **m > 0).count());
            prop_assert!(fresh.windows(2).all(|w| w[0].since <= w[1].since));
        }
    }
}
