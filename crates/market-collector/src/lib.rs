//! OHLCV 캔들 수집기.
//!
//! 이 crate는 다음을 제공합니다:
//! - 시계열별 증분 동기화 엔진 (`Reconciler`)
//! - 동기화 주기 통계 (`CycleReport`)
//! - 스키마 프로비저닝, 조회 경로, 데몬 루프
//! - 환경변수 기반 설정

pub mod config;
pub mod error;
pub mod modules;
pub mod stats;

pub use config::{load_log_config, CollectorConfig};
pub use error::{CollectorError, Result};
pub use modules::{LookbackPolicy, ReconcilePolicy, Reconciler};
pub use stats::{CycleReport, SeriesOutcome, SeriesReport, SkipReason};
