//! 데몬 루프.

use std::future::Future;
use std::time::Duration;

use tokio::time::MissedTickBehavior;

use crate::modules::Reconciler;

/// 즉시 한 번, 이후 `interval`마다 동기화 주기를 실행합니다.
///
/// `shutdown`이 완료되면 진행 중인 주기를 취소하고 반환합니다.
/// 반환값은 완료된 주기 수입니다.
pub async fn run_daemon(
    reconciler: &Reconciler,
    interval: Duration,
    shutdown: impl Future<Output = ()>,
) -> usize {
    tokio::pin!(shutdown);

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut completed = 0;

    tracing::info!(
        "=== 데몬 모드 시작 (주기: {}분) ===",
        interval.as_secs() / 60
    );

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                tracing::info!("종료 신호 수신, 데몬 종료 중...");
                break;
            }
            _ = ticker.tick() => {
                tokio::select! {
                    report = reconciler.run_cycle() => {
                        report.log_summary("캔들 동기화");
                        completed += 1;
                    }
                    _ = &mut shutdown => {
                        tracing::warn!("종료 신호 수신, 진행 중인 주기 취소");
                        break;
                    }
                }
            }
        }
    }

    completed
}
