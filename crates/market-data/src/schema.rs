//! 스키마 프로비저너.
//!
//! (거래 쌍, 간격) 테이블마다 다음을 보장합니다:
//! - 캔들 테이블 (`PRIMARY KEY (since, exchange)`)
//! - `(since DESC, exchange)` 인덱스
//! - 일별 최고/최저 뷰
//!
//! 모든 생성문은 "없으면 생성" 형태라 여러 인스턴스가 동시에 시작해도
//! 늦게 도착한 쪽은 아무 일도 하지 않습니다. 인덱스와 뷰는 각각 세이브포인트
//! 안에서 생성되므로 하나가 실패해도 테이블은 커밋됩니다.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use market_core::{CandleTable, SeriesKey};
use sqlx::Acquire;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::error::{DataError, Result, SchemaError, SchemaObject};
use crate::postgres::Database;

pub(crate) fn create_table_sql(table: CandleTable) -> String {
    format!(
        r#"
        CREATE TABLE IF NOT EXISTS {table} (
            since    TIMESTAMPTZ      NOT NULL,
            open     DOUBLE PRECISION NOT NULL,
            high     DOUBLE PRECISION NOT NULL,
            low      DOUBLE PRECISION NOT NULL,
            close    DOUBLE PRECISION NOT NULL,
            volume   DOUBLE PRECISION NOT NULL,
            trades   BIGINT,
            exchange TEXT             NOT NULL,
            PRIMARY KEY (since, exchange)
        )
        "#,
        table = table.name()
    )
}

pub(crate) fn create_index_sql(table: CandleTable) -> String {
    format!(
        "CREATE INDEX IF NOT EXISTS {index} ON {table} (since DESC, exchange)",
        index = table.index_name(),
        table = table.name()
    )
}

pub(crate) fn create_view_sql(table: CandleTable) -> String {
    format!(
        r#"
        CREATE OR REPLACE VIEW {view} AS
        SELECT (since AT TIME ZONE 'UTC')::date AS day,
               MAX(high) AS max_high,
               MIN(low)  AS min_low
        FROM {table}
        GROUP BY 1
        "#,
        view = table.view_name(),
        table = table.name()
    )
}

/// 스키마 준비 상태 신호.
///
/// 프로비저너가 준비 완료를 표시하고, 조회 경로는 제한된 시간 동안 기다립니다.
#[derive(Debug, Clone)]
pub struct SchemaReadiness {
    tx: Arc<watch::Sender<bool>>,
}

impl Default for SchemaReadiness {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaReadiness {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    pub fn mark_ready(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_ready(&self) -> bool {
        *self.tx.borrow()
    }

    /// 준비될 때까지 최대 `timeout` 동안 기다립니다.
    ///
    /// # Errors
    /// 제한 시간 안에 준비되지 않으면 `DataError::Timeout`.
    pub async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let mut rx = self.tx.subscribe();

        // watch::Ref가 rx보다 먼저 해제되도록 결과만 남깁니다.
        let outcome = tokio::time::timeout(timeout, rx.wait_for(|ready| *ready))
            .await
            .map(|waited| waited.map(|_| ()));

        match outcome {
            Ok(Ok(())) => Ok(()),
            Ok(Err(_)) => Err(DataError::Timeout(
                "schema readiness signal closed".to_string(),
            )),
            Err(_) => Err(DataError::Timeout(format!(
                "schema not ready after {:.1}s",
                timeout.as_secs_f64()
            ))),
        }
    }
}

/// 프로비저닝 결과.
#[derive(Debug, Clone, Default)]
pub struct ProvisionReport {
    /// 사용 가능한 테이블
    pub ready: Vec<CandleTable>,
    /// 생성하지 못한 테이블과 원인
    pub failed: Vec<(CandleTable, String)>,
    /// 개별 인덱스/뷰 생성 실패
    pub errors: Vec<SchemaError>,
}

impl ProvisionReport {
    /// 모든 테이블이 사용 가능한지 확인.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    /// 테이블이 사용 가능한 시계열만 남깁니다.
    pub fn usable_series(&self, keys: &[SeriesKey]) -> Vec<SeriesKey> {
        keys.iter()
            .filter(|key| !self.failed.iter().any(|(table, _)| *table == key.table()))
            .copied()
            .collect()
    }

    pub fn log_summary(&self) {
        info!(
            ready = self.ready.len(),
            failed = self.failed.len(),
            object_errors = self.errors.len(),
            "스키마 프로비저닝 완료"
        );
        for (table, reason) in &self.failed {
            warn!(table = %table, reason = %reason, "테이블 생성 실패");
        }
    }
}

/// 테이블/인덱스/뷰 프로비저너.
pub struct SchemaProvisioner {
    db: Database,
    readiness: SchemaReadiness,
}

impl SchemaProvisioner {
    pub fn new(db: Database, readiness: SchemaReadiness) -> Self {
        Self { db, readiness }
    }

    pub fn readiness(&self) -> &SchemaReadiness {
        &self.readiness
    }

    /// 시계열 키가 사용하는 모든 테이블을 보장합니다.
    ///
    /// 테이블 단위로 실패를 격리하며, 모든 테이블이 사용 가능하면 준비 상태를
    /// 표시합니다.
    pub async fn ensure_schema(&self, keys: &[SeriesKey]) -> ProvisionReport {
        let tables: BTreeSet<CandleTable> = keys.iter().map(SeriesKey::table).collect();
        let mut report = ProvisionReport::default();

        for table in tables {
            match self.ensure_table(table).await {
                Ok(errors) => {
                    report.ready.push(table);
                    report.errors.extend(errors);
                }
                Err(e) => {
                    warn!(table = %table, error = %e, "테이블 프로비저닝 실패");
                    report.failed.push((table, e.to_string()));
                }
            }
        }

        if report.is_complete() {
            self.readiness.mark_ready();
        }

        report
    }

    /// 테이블 하나를 보장합니다. 반환값은 테이블은 사용 가능하지만 실패한 객체들입니다.
    async fn ensure_table(&self, table: CandleTable) -> Result<Vec<SchemaError>> {
        let probe = format!("SELECT 1 FROM {} LIMIT 1", table.name());
        if sqlx::query(&probe).execute(self.db.pool()).await.is_ok() {
            debug!(table = %table, "테이블 존재, 뷰만 확인");
            return Ok(self.ensure_view(table).await.err().into_iter().collect());
        }

        info!(table = %table, "테이블 생성");
        let mut tx = self.db.pool().begin().await?;

        let create_sql = create_table_sql(table);
        let created = sqlx::query(&create_sql).execute(&mut *tx).await;
        if let Err(e) = created {
            let err = DataError::from(e);
            if err.is_conflict() {
                // 다른 인스턴스가 먼저 생성함
                drop(tx);
                debug!(table = %table, "동시 생성 감지, 기존 테이블 사용");
                return Ok(self.ensure_view(table).await.err().into_iter().collect());
            }
            return Err(SchemaError {
                object: SchemaObject::Table,
                name: table.name(),
                message: err.to_string(),
            }
            .into());
        }

        let mut errors = Vec::new();
        let steps = [
            (SchemaObject::Index, table.index_name(), create_index_sql(table)),
            (SchemaObject::View, table.view_name(), create_view_sql(table)),
        ];

        for (object, name, sql) in steps {
            let mut savepoint = tx.begin().await?;
            match sqlx::query(&sql).execute(&mut *savepoint).await {
                Ok(_) => savepoint.commit().await?,
                Err(e) => {
                    savepoint.rollback().await?;
                    let err = SchemaError {
                        object,
                        name,
                        message: e.to_string(),
                    };
                    warn!(table = %table, error = %err, "스키마 객체 생성 실패");
                    errors.push(err);
                }
            }
        }

        tx.commit().await?;
        Ok(errors)
    }

    async fn ensure_view(&self, table: CandleTable) -> std::result::Result<(), SchemaError> {
        sqlx::query(&create_view_sql(table))
            .execute(self.db.pool())
            .await
            .map(|_| ())
            .map_err(|e| {
                let err = SchemaError {
                    object: SchemaObject::View,
                    name: table.view_name(),
                    message: e.to_string(),
                };
                warn!(table = %table, error = %err, "뷰 생성 실패");
                err
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use market_core::{Exchange, Granularity, Pair};

    #[test]
    fn test_create_statements_are_idempotent() {
        let table = CandleTable::new(Pair::EthUsd, Granularity::Hour);
        assert!(create_table_sql(table).contains("CREATE TABLE IF NOT EXISTS ethusd_hour_candles"));
        assert!(create_table_sql(table).contains("PRIMARY KEY (since, exchange)"));
        assert_eq!(
            create_index_sql(table),
            "CREATE INDEX IF NOT EXISTS ethusd_hour_candles_since_exchange_idx \
             ON ethusd_hour_candles (since DESC, exchange)"
        );
        assert!(create_view_sql(table)
            .contains("CREATE OR REPLACE VIEW ethusd_hour_candles_max_min_daily_view"));
    }

    #[tokio::test]
    async fn test_readiness_resolves_immediately_when_ready() {
        let readiness = SchemaReadiness::new();
        readiness.mark_ready();
        assert!(readiness.is_ready());
        readiness
            .wait_ready(Duration::from_millis(1))
            .await
            .unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_readiness_times_out() {
        let readiness = SchemaReadiness::new();
        let err = readiness
            .wait_ready(Duration::from_secs(30))
            .await
            .unwrap_err();
        assert!(matches!(err, DataError::Timeout(_)));
    }

    #[tokio::test]
    async fn test_readiness_wakes_waiters() {
        let readiness = SchemaReadiness::new();
        let waiter = {
            let readiness = readiness.clone();
            tokio::spawn(async move { readiness.wait_ready(Duration::from_secs(5)).await })
        };

        tokio::task::yield_now().await;
        readiness.mark_ready();

        assert!(waiter.await.unwrap().is_ok());
    }

    #[test]
    fn test_report_completeness() {
        let mut report = ProvisionReport::default();
        report.ready.push(CandleTable::new(Pair::BtcUsd, Granularity::Hour));
        report.errors.push(SchemaError {
            object: SchemaObject::Index,
            name: "btcusd_hour_candles_since_exchange_idx".to_string(),
            message: "lock timeout".to_string(),
        });
        // 인덱스 실패는 테이블 사용을 막지 않음
        assert!(report.is_complete());

        report
            .failed
            .push((CandleTable::new(Pair::XrpEur, Granularity::Minute), "denied".to_string()));
        assert!(!report.is_complete());
    }

    #[test]
    fn test_usable_series_excludes_failed_tables() {
        let keys = SeriesKey::cartesian(
            &[Pair::BtcUsd, Pair::XrpEur],
            &[Granularity::Minute],
            &[Exchange::Kraken, Exchange::Bitfinex],
        );
        let mut report = ProvisionReport::default();
        report.ready.push(CandleTable::new(Pair::BtcUsd, Granularity::Minute));
        report
            .failed
            .push((CandleTable::new(Pair::XrpEur, Granularity::Minute), "denied".to_string()));

        let usable = report.usable_series(&keys);

        assert_eq!(usable.len(), 2);
        assert!(usable.iter().all(|key| key.pair == Pair::BtcUsd));
    }
}
