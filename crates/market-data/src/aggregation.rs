//! 일별 최고/최저 집계.
//!
//! PostgreSQL 뷰(`{table}_max_min_daily_view`)와 같은 규칙을 순수 함수로
//! 제공합니다. 메모리 저장소가 사용하며 뷰의 기대 동작을 테스트로 고정합니다.
//!
//! - 날짜는 UTC 달력 날짜
//! - 최저가와 같은 캔들은 `Min`, 그 외(최고가와 같은 캔들)는 `Max`
//! - 같은 극값을 가진 캔들은 모두 반환

use std::collections::BTreeMap;

use chrono::NaiveDate;
use market_core::{Candle, DailyExtreme, ExtremeCandle, ExtremeKind};

/// 날짜별 (최고 고가, 최저 저가)를 날짜 오름차순으로 계산합니다.
pub fn daily_extremes<'a, I>(candles: I) -> Vec<DailyExtreme>
where
    I: IntoIterator<Item = &'a Candle>,
{
    let mut days: BTreeMap<NaiveDate, (f64, f64)> = BTreeMap::new();

    for candle in candles {
        days.entry(candle.day())
            .and_modify(|(high, low)| {
                *high = high.max(candle.high);
                *low = low.min(candle.low);
            })
            .or_insert((candle.high, candle.low));
    }

    days.into_iter()
        .map(|(day, (max_high, min_low))| DailyExtreme {
            day,
            max_high,
            min_low,
        })
        .collect()
}

/// 캔들 하나를 그날의 극값과 비교해 분류합니다.
///
/// 고가와 저가가 모두 극값이면 `Min`이 우선합니다.
pub fn classify(candle: &Candle, extreme: &DailyExtreme) -> Option<ExtremeKind> {
    if candle.low == extreme.min_low {
        Some(ExtremeKind::Min)
    } else if candle.high == extreme.max_high {
        Some(ExtremeKind::Max)
    } else {
        None
    }
}

/// 극값 캔들을 최신순으로 추출합니다.
pub fn extreme_candles(candles: &[Candle]) -> Vec<ExtremeCandle> {
    let extremes: BTreeMap<NaiveDate, DailyExtreme> = daily_extremes(candles)
        .into_iter()
        .map(|e| (e.day, e))
        .collect();

    let mut result: Vec<ExtremeCandle> = candles
        .iter()
        .filter_map(|candle| {
            let extreme = extremes.get(&candle.day())?;
            classify(candle, extreme).map(|kind| ExtremeCandle::from_candle(candle, kind))
        })
        .collect();

    result.sort_by(|a, b| b.time.cmp(&a.time));
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use market_core::Exchange;

    fn candle(hour: u32, high: f64, low: f64, exchange: Exchange) -> Candle {
        Candle {
            since: Utc.with_ymd_and_hms(2024, 3, 1, hour, 0, 0).unwrap(),
            open: low,
            high,
            low,
            close: high,
            volume: 1.0,
            trades: None,
            exchange,
        }
    }

    #[test]
    fn test_daily_extremes_by_utc_day() {
        let mut next_day = candle(0, 50.0, 40.0, Exchange::Kraken);
        next_day.since = Utc.with_ymd_and_hms(2024, 3, 2, 0, 0, 0).unwrap();

        let candles = vec![
            candle(1, 10.0, 5.0, Exchange::Kraken),
            candle(23, 12.0, 7.0, Exchange::Bitfinex),
            next_day,
        ];

        let extremes = daily_extremes(&candles);
        assert_eq!(extremes.len(), 2);
        assert_eq!(extremes[0].max_high, 12.0);
        assert_eq!(extremes[0].min_low, 5.0);
        assert_eq!(extremes[1].day, NaiveDate::from_ymd_opt(2024, 3, 2).unwrap());
    }

    #[test]
    fn test_ties_are_all_returned() {
        let candles = vec![
            candle(1, 10.0, 5.0, Exchange::Kraken),
            candle(2, 9.0, 5.0, Exchange::Kraken),
            candle(3, 8.0, 6.0, Exchange::Kraken),
        ];

        let extremes = extreme_candles(&candles);
        let mins: Vec<_> = extremes
            .iter()
            .filter(|c| c.kind == ExtremeKind::Min)
            .collect();

        // 같은 최저가를 가진 두 캔들 모두 포함, 최신순
        assert_eq!(mins.len(), 2);
        assert!(mins[0].time > mins[1].time);
        // 03시 캔들은 극값이 아님
        assert_eq!(extremes.len(), 2);
    }

    #[test]
    fn test_min_wins_when_both_extremes() {
        let only = candle(1, 10.0, 5.0, Exchange::Kraken);
        let extreme = DailyExtreme {
            day: only.day(),
            max_high: 10.0,
            min_low: 5.0,
        };
        assert_eq!(classify(&only, &extreme), Some(ExtremeKind::Min));
    }

    #[test]
    fn test_empty_input() {
        assert!(daily_extremes(&Vec::<Candle>::new()).is_empty());
        assert!(extreme_candles(&[]).is_empty());
    }
}
