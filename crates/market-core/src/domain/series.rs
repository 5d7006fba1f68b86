//! 시계열 키와 저장 테이블 이름 규칙.
//!
//! (거래 쌍, 간격)마다 테이블 하나가 존재하고 거래소는 테이블의 컬럼입니다.
//! (거래 쌍, 간격, 거래소) 조합 하나가 독립적으로 동기화되는 시계열입니다.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::{Exchange, Granularity, Pair};

/// 저장 테이블 식별자 (거래 쌍, 간격).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CandleTable {
    pub pair: Pair,
    pub granularity: Granularity,
}

impl CandleTable {
    pub fn new(pair: Pair, granularity: Granularity) -> Self {
        Self { pair, granularity }
    }

    /// 모든 (거래 쌍, 간격) 조합의 테이블.
    pub fn all() -> Vec<CandleTable> {
        Pair::ALL
            .into_iter()
            .flat_map(|pair| {
                Granularity::ALL
                    .into_iter()
                    .map(move |granularity| CandleTable::new(pair, granularity))
            })
            .collect()
    }

    /// 테이블 이름 (예: "btcusd_hour_candles").
    pub fn name(&self) -> String {
        format!("{}_{}_candles", self.pair.table_prefix(), self.granularity)
    }

    /// (since, exchange) 인덱스 이름.
    pub fn index_name(&self) -> String {
        format!("{}_since_exchange_idx", self.name())
    }

    /// 일별 최고/최저 뷰 이름.
    pub fn view_name(&self) -> String {
        format!("{}_max_min_daily_view", self.name())
    }
}

impl fmt::Display for CandleTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// 독립적으로 동기화되는 시계열 키 (거래 쌍, 간격, 거래소).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SeriesKey {
    pub pair: Pair,
    pub granularity: Granularity,
    pub exchange: Exchange,
}

impl SeriesKey {
    pub fn new(pair: Pair, granularity: Granularity, exchange: Exchange) -> Self {
        Self {
            pair,
            granularity,
            exchange,
        }
    }

    /// 이 시계열이 저장되는 테이블.
    pub fn table(&self) -> CandleTable {
        CandleTable::new(self.pair, self.granularity)
    }

    /// 주어진 집합의 데카르트 곱으로 시계열 키 목록을 만듭니다.
    pub fn cartesian(
        pairs: &[Pair],
        granularities: &[Granularity],
        exchanges: &[Exchange],
    ) -> Vec<SeriesKey> {
        let mut keys = Vec::with_capacity(pairs.len() * granularities.len() * exchanges.len());
        for &granularity in granularities {
            for &pair in pairs {
                for &exchange in exchanges {
                    keys.push(SeriesKey::new(pair, granularity, exchange));
                }
            }
        }
        keys
    }
}

impl fmt::Display for SeriesKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.pair, self.granularity, self.exchange)
    }
}
