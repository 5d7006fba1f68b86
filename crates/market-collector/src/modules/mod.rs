//! 수집 작업 모듈.

pub mod daemon;
pub mod provision;
pub mod query;
pub mod reconcile;

pub use daemon::run_daemon;
pub use provision::{provision_schema, reconcilable_series};
pub use query::{read_daily_extremes, read_extremes};
pub use reconcile::{filter_after, LookbackPolicy, ReconcilePolicy, Reconciler, MAX_LOOKBACK_DAYS};
