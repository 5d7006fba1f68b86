//! 정규화된 캔들 데이터 구조체.
//!
//! 거래소별 응답 형식(필드 순서, 타임스탬프 단위)과 무관하게
//! 모든 어댑터는 이 모듈의 [`Candle`]을 반환합니다.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::types::Exchange;

/// 단일 OHLCV 캔들.
///
/// `since`는 캔들의 시작 시각이며 같은 테이블 안에서 `(since, exchange)`가
/// 자연 키입니다. 한 번 저장된 캔들은 수정되지 않습니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// 캔들 시작 시각
    pub since: DateTime<Utc>,
    /// 시가
    pub open: f64,
    /// 고가
    pub high: f64,
    /// 저가
    pub low: f64,
    /// 종가
    pub close: f64,
    /// 거래량
    pub volume: f64,
    /// 체결 건수 (제공하지 않는 거래소는 None)
    pub trades: Option<i64>,
    /// 출처 거래소
    pub exchange: Exchange,
}

impl Candle {
    /// 캔들이 속한 UTC 달력 날짜.
    pub fn day(&self) -> NaiveDate {
        self.since.date_naive()
    }

    /// 고가 >= max(시가, 종가) >= min(시가, 종가) >= 저가 관계가 성립하는지 확인합니다.
    ///
    /// 수집 파이프라인은 이 관계를 강제하지 않으며 진단 로그에만 사용합니다.
    pub fn is_consistent(&self) -> bool {
        let body_high = self.open.max(self.close);
        let body_low = self.open.min(self.close);
        self.high >= body_high && body_low >= self.low
    }
}

/// 하루 단위 최고가/최저가.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyExtreme {
    /// UTC 달력 날짜
    pub day: NaiveDate,
    /// 해당 날짜의 최고 고가
    pub max_high: f64,
    /// 해당 날짜의 최저 저가
    pub min_low: f64,
}

/// 일별 극값 분류.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtremeKind {
    /// 그날의 최고 고가와 같은 캔들
    Max,
    /// 그날의 최저 저가와 같은 캔들
    Min,
}

/// 조회 경로에서 반환하는 극값 캔들.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtremeCandle {
    #[serde(rename = "type")]
    pub kind: ExtremeKind,
    pub time: DateTime<Utc>,
    pub open: f64,
    pub close: f64,
    pub high: f64,
    pub low: f64,
    pub volume: f64,
    pub exchange: Exchange,
}

impl ExtremeCandle {
    /// 캔들에 극값 분류를 붙입니다.
    pub fn from_candle(candle: &Candle, kind: ExtremeKind) -> Self {
        Self {
            kind,
            time: candle.since,
            open: candle.open,
            close: candle.close,
            high: candle.high,
            low: candle.low,
            volume: candle.volume,
            exchange: candle.exchange,
        }
    }
}
