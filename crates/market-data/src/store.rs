//! 캔들 저장소 계약.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use market_core::{Candle, CandleTable, DailyExtreme, ExtremeCandle, SeriesKey};

use crate::Result;

/// 동기화 엔진과 조회 경로가 사용하는 저장소 인터페이스.
#[async_trait]
pub trait CandleStore: Send + Sync {
    /// 시계열에 저장된 가장 최근 `since`. 한 번도 저장되지 않았으면 `None`.
    async fn watermark(&self, key: &SeriesKey) -> Result<Option<DateTime<Utc>>>;

    /// 캔들을 한 번에 저장하고 실제로 추가된 행 수를 반환합니다.
    ///
    /// `(since, exchange)`가 이미 존재하는 캔들은 조용히 건너뜁니다.
    /// 같은 입력으로 두 번 호출해도 행이 중복되지 않으며, 일부 행만
    /// 커밋되는 경우는 없습니다.
    async fn persist(&self, key: &SeriesKey, candles: &[Candle]) -> Result<usize>;

    /// 날짜별 (최고 고가, 최저 저가), 날짜 오름차순.
    async fn daily_extremes(&self, table: CandleTable) -> Result<Vec<DailyExtreme>>;

    /// 그날의 최고가 또는 최저가와 같은 캔들, 최신순.
    ///
    /// 같은 값을 가진 캔들은 모두 반환합니다.
    async fn fetch_extremes(&self, table: CandleTable) -> Result<Vec<ExtremeCandle>>;

    /// 모든 테이블과 뷰를 삭제합니다 (관리용 초기화).
    async fn drop_all(&self) -> Result<()>;
}
