//! # Market Core
//!
//! 캔들 수집기의 핵심 도메인 타입을 제공합니다.
//!
//! 이 크레이트는 수집기 전반에서 사용되는 기본 타입을 제공합니다:
//! - 거래 쌍, 캔들 간격, 거래소 열거형
//! - 시계열 키 및 저장 테이블 이름 규칙
//! - 정규화된 캔들 및 일별 고가/저가 타입
//! - 로깅 인프라

pub mod domain;
pub mod logging;
pub mod types;

pub use domain::*;
pub use logging::*;
pub use types::*;
