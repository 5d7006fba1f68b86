//! 심볼 매퍼.
//!
//! 정규 (거래소, 거래 쌍)을 거래소 API가 요구하는 고유 코드로 변환합니다.
//! 네트워크 I/O 없는 순수 조회 테이블이며, 전역 상수 대신 어댑터 생성 시
//! 명시적으로 전달됩니다.

use std::collections::HashMap;
use std::fmt;

use market_core::{Exchange, Granularity, Pair};

use crate::error::MappingError;

/// 거래소 고유 심볼 코드.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarketSymbol {
    /// 요청과 응답에 같은 코드를 사용
    Single(String),
    /// 요청 코드와 응답 키가 다름 (예: Kraken "XBTUSD" → "XXBTZUSD")
    Split { request: String, response: String },
}

impl MarketSymbol {
    pub fn single(code: impl Into<String>) -> Self {
        Self::Single(code.into())
    }

    pub fn split(request: impl Into<String>, response: impl Into<String>) -> Self {
        Self::Split {
            request: request.into(),
            response: response.into(),
        }
    }

    /// 요청 파라미터에 넣을 코드.
    pub fn request_code(&self) -> &str {
        match self {
            Self::Single(code) => code,
            Self::Split { request, .. } => request,
        }
    }

    /// 응답 본문에서 데이터를 찾을 키.
    pub fn response_code(&self) -> &str {
        match self {
            Self::Single(code) => code,
            Self::Split { response, .. } => response,
        }
    }
}

/// 거래소 고유 간격 표기.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntervalToken {
    /// 분 단위 정수 (Kraken)
    Minutes(u32),
    /// 접미사 문자열 (Bitfinex "1h")
    Label(String),
}

impl fmt::Display for IntervalToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Minutes(m) => write!(f, "{}", m),
            Self::Label(label) => f.write_str(label),
        }
    }
}

/// 거래소 하나의 API 정보.
#[derive(Debug, Clone)]
pub struct ExchangeMarket {
    /// REST 엔드포인트 (Bitfinex는 `{interval}`, `{symbol}` 자리표시자 포함)
    pub endpoint: String,
    pub pairs: HashMap<Pair, MarketSymbol>,
    pub intervals: HashMap<Granularity, IntervalToken>,
}

/// 전체 거래소 심볼/간격 카탈로그.
#[derive(Debug, Clone)]
pub struct MarketCatalog {
    markets: HashMap<Exchange, ExchangeMarket>,
}

pub const KRAKEN_OHLC_ENDPOINT: &str = "https://api.kraken.com/0/public/OHLC";
pub const BITFINEX_CANDLES_ENDPOINT: &str =
    "https://api-pub.bitfinex.com/v2/candles/trade:{interval}:{symbol}/hist";

impl MarketCatalog {
    /// 빈 카탈로그.
    pub fn empty() -> Self {
        Self {
            markets: HashMap::new(),
        }
    }

    /// 기본 제공 카탈로그 (Kraken, Bitfinex).
    pub fn builtin() -> Self {
        let kraken = ExchangeMarket {
            endpoint: KRAKEN_OHLC_ENDPOINT.to_string(),
            pairs: HashMap::from([
                (Pair::BtcUsd, MarketSymbol::split("XBTUSD", "XXBTZUSD")),
                (Pair::EthUsd, MarketSymbol::split("ETHUSD", "XETHZUSD")),
                (Pair::XrpEur, MarketSymbol::split("XRPEUR", "XXRPZEUR")),
                (Pair::XrpUsd, MarketSymbol::split("XRPUSD", "XXRPZUSD")),
            ]),
            intervals: HashMap::from([
                (Granularity::Hour, IntervalToken::Minutes(60)),
                (Granularity::Minute, IntervalToken::Minutes(1)),
            ]),
        };

        let bitfinex = ExchangeMarket {
            endpoint: BITFINEX_CANDLES_ENDPOINT.to_string(),
            pairs: HashMap::from([
                (Pair::BtcUsd, MarketSymbol::single("tBTCUSD")),
                (Pair::EthUsd, MarketSymbol::single("tETHUSD")),
                (Pair::XrpEur, MarketSymbol::single("tXRPEUR")),
                (Pair::XrpUsd, MarketSymbol::single("tXRPUSD")),
            ]),
            intervals: HashMap::from([
                (Granularity::Hour, IntervalToken::Label("1h".to_string())),
                (Granularity::Minute, IntervalToken::Label("1m".to_string())),
            ]),
        };

        Self::empty()
            .with_market(Exchange::Kraken, kraken)
            .with_market(Exchange::Bitfinex, bitfinex)
    }

    /// 거래소 정보를 추가하거나 교체합니다.
    pub fn with_market(mut self, exchange: Exchange, market: ExchangeMarket) -> Self {
        self.markets.insert(exchange, market);
        self
    }

    /// 엔드포인트만 교체합니다 (테스트 서버, 프록시 등).
    pub fn with_endpoint(mut self, exchange: Exchange, endpoint: impl Into<String>) -> Self {
        if let Some(market) = self.markets.get_mut(&exchange) {
            market.endpoint = endpoint.into();
        }
        self
    }

    /// 카탈로그에 등록된 거래소 목록.
    pub fn exchanges(&self) -> Vec<Exchange> {
        let mut exchanges: Vec<Exchange> = self.markets.keys().copied().collect();
        exchanges.sort();
        exchanges
    }

    pub fn market(&self, exchange: Exchange) -> Result<&ExchangeMarket, MappingError> {
        self.markets
            .get(&exchange)
            .ok_or(MappingError::UnsupportedExchange(exchange))
    }

    pub fn endpoint(&self, exchange: Exchange) -> Result<&str, MappingError> {
        self.market(exchange).map(|m| m.endpoint.as_str())
    }

    /// (거래소, 거래 쌍) → 거래소 고유 코드.
    pub fn translate(&self, exchange: Exchange, pair: Pair) -> Result<&MarketSymbol, MappingError> {
        self.market(exchange)?
            .pairs
            .get(&pair)
            .ok_or(MappingError::UnsupportedPair { exchange, pair })
    }

    /// (거래소, 간격) → 거래소 고유 간격 표기.
    pub fn interval(
        &self,
        exchange: Exchange,
        granularity: Granularity,
    ) -> Result<&IntervalToken, MappingError> {
        self.market(exchange)?
            .intervals
            .get(&granularity)
            .ok_or(MappingError::UnsupportedInterval {
                exchange,
                granularity,
            })
    }
}

impl Default for MarketCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
