//! 데이터 소스 거래소 정의.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 캔들 데이터를 제공하는 거래소.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Exchange {
    /// Kraken
    Kraken,
    /// Bitfinex
    Bitfinex,
}

impl Exchange {
    /// 지원하는 모든 거래소.
    pub const ALL: [Exchange; 2] = [Exchange::Kraken, Exchange::Bitfinex];

    /// 저장용 대문자 표기 (예: "KRAKEN").
    pub fn as_str(&self) -> &'static str {
        match self {
            Exchange::Kraken => "KRAKEN",
            Exchange::Bitfinex => "BITFINEX",
        }
    }
}

impl fmt::Display for Exchange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Exchange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "KRAKEN" => Ok(Exchange::Kraken),
            "BITFINEX" => Ok(Exchange::Bitfinex),
            _ => Err(format!("Unknown exchange: {}", s)),
        }
    }
}
