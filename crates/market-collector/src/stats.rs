//! 동기화 주기 통계.

use chrono::{DateTime, Utc};
use market_core::SeriesKey;
use serde::Serialize;
use std::time::Duration;

/// 시계열을 이번 주기에서 건너뛴 이유.
///
/// 어떤 경우든 다음 주기에 다시 시도됩니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum SkipReason {
    /// 거래소가 거래 쌍/간격을 지원하지 않거나 소스가 없음 (설정 오류)
    Unsupported(String),
    /// 네트워크, 응답, 타임아웃 실패
    Fetch(String),
    /// 워터마크 조회 또는 저장 실패
    Store(String),
}

/// 시계열 하나의 주기 결과.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SeriesOutcome {
    /// 새 캔들 저장
    Persisted {
        inserted: usize,
        watermark: DateTime<Utc>,
    },
    /// 새 캔들 없음
    UpToDate,
    /// 건너뜀
    Skipped { reason: SkipReason },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesReport {
    pub key: SeriesKey,
    pub outcome: SeriesOutcome,
}

/// 동기화 주기 통계
#[derive(Debug, Clone, Default, Serialize)]
pub struct CycleReport {
    pub series: Vec<SeriesReport>,
    /// 소요 시간
    #[serde(skip)]
    pub elapsed: Duration,
}

impl CycleReport {
    pub fn total(&self) -> usize {
        self.series.len()
    }

    /// 새 캔들을 저장한 시계열 수
    pub fn persisted(&self) -> usize {
        self.count(|o| matches!(o, SeriesOutcome::Persisted { .. }))
    }

    pub fn up_to_date(&self) -> usize {
        self.count(|o| matches!(o, SeriesOutcome::UpToDate))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, SeriesOutcome::Skipped { .. }))
    }

    /// 저장된 총 캔들 수
    pub fn total_inserted(&self) -> usize {
        self.series
            .iter()
            .map(|r| match r.outcome {
                SeriesOutcome::Persisted { inserted, .. } => inserted,
                _ => 0,
            })
            .sum()
    }

    pub fn outcome(&self, key: &SeriesKey) -> Option<&SeriesOutcome> {
        self.series
            .iter()
            .find(|r| &r.key == key)
            .map(|r| &r.outcome)
    }

    fn count(&self, pred: impl Fn(&SeriesOutcome) -> bool) -> usize {
        self.series.iter().filter(|r| pred(&r.outcome)).count()
    }

    /// 통계 요약 로그 출력
    pub fn log_summary(&self, operation: &str) {
        tracing::info!(
            operation = operation,
            total = self.total(),
            persisted = self.persisted(),
            up_to_date = self.up_to_date(),
            skipped = self.skipped(),
            inserted = self.total_inserted(),
            elapsed = format!("{:.1}s", self.elapsed.as_secs_f64()),
            "동기화 완료"
        );

        for report in &self.series {
            if let SeriesOutcome::Skipped { reason } = &report.outcome {
                tracing::warn!(series = %report.key, reason = ?reason, "건너뛴 시계열");
            }
        }
    }
}
