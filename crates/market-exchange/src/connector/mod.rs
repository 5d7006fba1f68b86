//! 거래소 REST 커넥터.

mod bitfinex;
mod kraken;

pub use bitfinex::BitfinexClient;
pub use kraken::KrakenClient;

use crate::FetchError;

/// 응답 상태를 확인하고 본문을 읽습니다.
///
/// 2xx가 아니면 본문 앞부분을 담아 `FetchError::Status`를 반환합니다.
pub(crate) async fn read_body(response: reqwest::Response) -> Result<String, FetchError> {
    let status = response.status();
    let body = response.text().await?;

    if status.is_success() {
        Ok(body)
    } else {
        Err(FetchError::Status {
            status: status.as_u16(),
            body: body.chars().take(256).collect(),
        })
    }
}
