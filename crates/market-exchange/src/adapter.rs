//! 거래소 태그로 커넥터를 선택하는 어댑터.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use market_core::{Candle, Exchange, Granularity, Pair};
use reqwest::Client;

use crate::traits::{CandleSource, SourceResult};
use crate::{BitfinexClient, KrakenClient, MarketCatalog};

/// 지원 거래소별 커넥터.
///
/// 거래소 목록이 닫혀 있으므로 trait 객체 대신 열거형으로 분기합니다.
/// 엔진은 [`CandleSource`]만 보고 동작합니다.
#[derive(Clone)]
pub enum ExchangeAdapter {
    Kraken(KrakenClient),
    Bitfinex(BitfinexClient),
}

impl ExchangeAdapter {
    /// 거래소에 맞는 어댑터를 생성합니다.
    pub fn new(exchange: Exchange, client: Client, catalog: Arc<MarketCatalog>) -> Self {
        match exchange {
            Exchange::Kraken => Self::Kraken(KrakenClient::new(client, catalog)),
            Exchange::Bitfinex => Self::Bitfinex(BitfinexClient::new(client, catalog)),
        }
    }

    /// 카탈로그에 등록된 모든 거래소의 어댑터를 생성합니다.
    ///
    /// HTTP 클라이언트는 커넥션 풀을 공유하도록 복제됩니다.
    pub fn for_catalog(
        client: &Client,
        catalog: Arc<MarketCatalog>,
    ) -> HashMap<Exchange, Arc<dyn CandleSource>> {
        catalog
            .exchanges()
            .into_iter()
            .map(|exchange| {
                let adapter: Arc<dyn CandleSource> =
                    Arc::new(Self::new(exchange, client.clone(), catalog.clone()));
                (exchange, adapter)
            })
            .collect()
    }
}

#[async_trait]
impl CandleSource for ExchangeAdapter {
    fn exchange(&self) -> Exchange {
        match self {
            Self::Kraken(_) => Exchange::Kraken,
            Self::Bitfinex(_) => Exchange::Bitfinex,
        }
    }

    async fn fetch(
        &self,
        pair: Pair,
        since: DateTime<Utc>,
        granularity: Granularity,
    ) -> SourceResult<Vec<Candle>> {
        match self {
            Self::Kraken(client) => client.fetch_candles(pair, since, granularity).await,
            Self::Bitfinex(client) => client.fetch_candles(pair, since, granularity).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_catalog_builds_every_exchange() {
        let catalog = Arc::new(MarketCatalog::builtin());
        let sources = ExchangeAdapter::for_catalog(&Client::new(), catalog);

        assert_eq!(sources.len(), 2);
        for (exchange, source) in &sources {
            assert_eq!(source.exchange(), *exchange);
        }
    }

    #[test]
    fn test_for_empty_catalog() {
        let sources = ExchangeAdapter::for_catalog(&Client::new(), Arc::new(MarketCatalog::empty()));
        assert!(sources.is_empty());
    }
}
