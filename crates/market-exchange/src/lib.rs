//! 거래소 캔들 어댑터.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - `MarketCatalog`: 정규 거래 쌍/간격을 거래소 고유 코드로 변환하는 심볼 매퍼
//! - `CandleSource` trait: 공통 캔들 조회 인터페이스
//! - Kraken, Bitfinex REST 커넥터 (응답 정규화 포함)
//! - `ExchangeAdapter`: 거래소 태그로 커넥터를 선택하는 열거형

pub mod adapter;
pub mod catalog;
pub mod connector;
pub mod error;
pub mod http;
pub mod traits;

pub use adapter::ExchangeAdapter;
pub use catalog::{ExchangeMarket, IntervalToken, MarketCatalog, MarketSymbol};
pub use connector::{BitfinexClient, KrakenClient};
pub use error::{FetchError, MappingError, SourceError};
pub use http::HttpConfig;
pub use traits::{CandleSource, SourceResult};
