//! 캔들 저장소 및 스키마 관리.
//!
//! 이 crate는 다음을 제공합니다:
//! - `CandleStore` trait: 워터마크 조회, 멱등 저장, 일별 극값 조회
//! - PostgreSQL 저장소 (`PgCandleStore`)
//! - 스키마 프로비저너와 준비 상태 신호
//! - 일별 최고/최저 집계 (순수 함수)
//! - 메모리 저장소 (테스트, 드라이런)

pub mod aggregation;
pub mod error;
pub mod memory;
pub mod postgres;
pub mod schema;
pub mod store;

pub use error::{DataError, Result, SchemaError, SchemaObject};
pub use memory::MemoryCandleStore;
pub use postgres::{Database, DatabaseConfig, PgCandleStore};
pub use schema::{ProvisionReport, SchemaProvisioner, SchemaReadiness};
pub use store::CandleStore;
