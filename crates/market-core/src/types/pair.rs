//! 거래 쌍 정의.
//!
//! 수집 대상 거래 쌍은 프로세스 전체에서 고정된 유한 집합입니다.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 정규(canonical) 거래 쌍.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Pair {
    /// 비트코인 / 미국 달러
    #[serde(rename = "BTC/USD")]
    BtcUsd,
    /// 이더리움 / 미국 달러
    #[serde(rename = "ETH/USD")]
    EthUsd,
    /// 리플 / 유로
    #[serde(rename = "XRP/EUR")]
    XrpEur,
    /// 리플 / 미국 달러
    #[serde(rename = "XRP/USD")]
    XrpUsd,
}

impl Pair {
    /// 지원하는 모든 거래 쌍.
    pub const ALL: [Pair; 4] = [Pair::BtcUsd, Pair::EthUsd, Pair::XrpEur, Pair::XrpUsd];

    /// 정규 표기 (예: "BTC/USD").
    pub fn as_str(&self) -> &'static str {
        match self {
            Pair::BtcUsd => "BTC/USD",
            Pair::EthUsd => "ETH/USD",
            Pair::XrpEur => "XRP/EUR",
            Pair::XrpUsd => "XRP/USD",
        }
    }

    /// 테이블 이름 접두어 (예: "btcusd").
    pub fn table_prefix(&self) -> String {
        self.as_str().replace('/', "").to_lowercase()
    }
}

impl fmt::Display for Pair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Pair {
    type Err = String;

    /// "BTC/USD", "btc/usd", "BTCUSD", "btc-usd" 형식을 모두 허용합니다.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_uppercase();

        Pair::ALL
            .into_iter()
            .find(|p| p.as_str().replace('/', "") == normalized)
            .ok_or_else(|| format!("Unknown pair: {}", s))
    }
}
