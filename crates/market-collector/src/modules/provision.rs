//! 시작 시 스키마 프로비저닝.

use market_core::SeriesKey;
use market_data::{Database, ProvisionReport, SchemaProvisioner, SchemaReadiness};

use crate::error::CollectorError;
use crate::Result;

/// 시계열 키가 사용하는 모든 테이블을 보장하고 결과를 기록합니다.
///
/// 모든 테이블이 사용 가능하면 `readiness`가 준비 상태가 됩니다.
pub async fn provision_schema(
    db: &Database,
    keys: &[SeriesKey],
    readiness: &SchemaReadiness,
) -> ProvisionReport {
    tracing::info!(series = keys.len(), "스키마 프로비저닝 시작");

    let provisioner = SchemaProvisioner::new(db.clone(), readiness.clone());
    let report = provisioner.ensure_schema(keys).await;
    report.log_summary();

    for err in &report.errors {
        tracing::warn!(error = %err, "스키마 객체 누락");
    }

    report
}

/// 동기화 대상 중 테이블이 준비된 시계열만 고릅니다.
///
/// 일부 테이블이 실패해도 나머지 시계열은 계속 동기화합니다. 사용 가능한
/// 테이블이 하나도 없을 때만 에러입니다.
pub fn reconcilable_series(
    report: &ProvisionReport,
    universe: &[SeriesKey],
) -> Result<Vec<SeriesKey>> {
    let usable = report.usable_series(universe);
    if usable.is_empty() && !universe.is_empty() {
        return Err(CollectorError::Provision(report.failed.len()));
    }

    let excluded = universe.len() - usable.len();
    if excluded > 0 {
        tracing::warn!(
            excluded = excluded,
            usable = usable.len(),
            "테이블 생성 실패로 일부 시계열 제외"
        );
    }

    Ok(usable)
}
