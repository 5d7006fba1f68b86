//! 캔들 조회 trait 정의.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use market_core::{Candle, Exchange, Granularity, Pair};

use crate::SourceError;

/// 캔들 조회 작업을 위한 Result 타입.
pub type SourceResult<T> = Result<T, SourceError>;

/// 거래소 중립적인 캔들 조회 인터페이스.
///
/// 구현체는 호출당 정확히 한 번의 네트워크 요청을 보내고, 결과를 공통
/// [`Candle`] 형태로 정규화합니다.
#[async_trait]
pub trait CandleSource: Send + Sync {
    /// 이 소스가 대표하는 거래소.
    fn exchange(&self) -> Exchange;

    /// `since` 이후의 캔들을 오래된 순으로 조회합니다.
    ///
    /// 반환되는 모든 캔들의 `since`는 인자로 받은 시각보다 **엄격히 큽니다**.
    /// 경계 캔들은 절대 다시 반환하지 않습니다.
    ///
    /// # Errors
    ///
    /// - `SourceError::Unsupported`: 거래소가 거래 쌍/간격을 지원하지 않음
    /// - `SourceError::Fetch`: 네트워크 실패, 응답 에러, 파싱 실패
    async fn fetch(
        &self,
        pair: Pair,
        since: DateTime<Utc>,
        granularity: Granularity,
    ) -> SourceResult<Vec<Candle>>;
}

/// 경계 이후 캔들만 남기고 시간순으로 정렬합니다.
///
/// 경계를 포함해 돌려주는 거래소 API를 위해 커넥터가 공통으로 사용합니다.
/// 고가/저가가 시가·종가를 감싸지 않는 캔들은 그대로 두고 경고만 남깁니다.
pub(crate) fn after_boundary(mut candles: Vec<Candle>, since: DateTime<Utc>) -> Vec<Candle> {
    candles.retain(|c| c.since > since);
    candles.sort_by_key(|c| c.since);

    let inconsistent = candles.iter().filter(|c| !c.is_consistent()).count();
    if inconsistent > 0 {
        tracing::warn!(
            inconsistent = inconsistent,
            "고가/저가 범위를 벗어난 캔들 수신"
        );
    }

    candles
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn candle(hour: u32, high: f64) -> Candle {
        Candle {
            since: Utc.with_ymd_and_hms(2024, 3, 1, hour, 0, 0).unwrap(),
            exchange: Exchange::Kraken,
            open: 10.0,
            high,
            low: 9.0,
            close: 10.5,
            volume: 1.0,
            trades: None,
        }
    }

    #[test]
    fn test_after_boundary_sorts_and_excludes_boundary() {
        let since = Utc.with_ymd_and_hms(2024, 3, 1, 1, 0, 0).unwrap();
        let candles = vec![candle(3, 11.0), candle(1, 11.0), candle(2, 11.0)];

        let kept = after_boundary(candles, since);

        let hours: Vec<_> = kept.iter().map(|c| c.since).collect();
        assert_eq!(
            hours,
            vec![
                Utc.with_ymd_and_hms(2024, 3, 1, 2, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2024, 3, 1, 3, 0, 0).unwrap(),
            ]
        );
    }

    #[test]
    fn test_after_boundary_keeps_inconsistent_candles() {
        let since = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        // 고가가 종가보다 낮음
        let kept = after_boundary(vec![candle(1, 10.0)], since);

        assert_eq!(kept.len(), 1);
        assert!(!kept[0].is_consistent());
    }
}
