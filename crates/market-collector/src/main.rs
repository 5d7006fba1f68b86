//! OHLCV candle collector CLI.

use std::sync::Arc;

use clap::{Parser, Subcommand};
use market_core::{init_logging, CandleTable, Granularity, LogFormat, Pair, SeriesKey};
use market_data::{CandleStore, Database, PgCandleStore, SchemaReadiness};
use market_exchange::{ExchangeAdapter, HttpConfig, MarketCatalog};
use market_collector::{load_log_config, modules, CollectorConfig, CollectorError, Reconciler};

#[derive(Parser)]
#[command(name = "market-collector")]
#[command(about = "Incremental OHLCV candle collector", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// 로그 레벨 (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// 로그 형식 (pretty, json, compact)
    #[arg(long, global = true)]
    log_format: Option<LogFormat>,
}

#[derive(Subcommand)]
enum Commands {
    /// 캔들 테이블, 인덱스, 일별 극값 뷰 생성
    Provision,

    /// 동기화 주기 1회 실행
    Reconcile,

    /// 데몬 모드: 주기적으로 동기화 실행
    Daemon,

    /// 일별 최고/최저 캔들 조회 (JSON)
    Candles {
        /// 거래 쌍 (예: BTC/USD)
        #[arg(long)]
        pair: Pair,
        /// 간격 (hour, minute)
        #[arg(long)]
        by: Granularity,
    },

    /// 일별 (최고 고가, 최저 저가) 조회 (JSON)
    Extremes {
        #[arg(long)]
        pair: Pair,
        #[arg(long)]
        by: Granularity,
    },

    /// 모든 캔들 테이블과 뷰 삭제
    DropAll {
        /// 삭제 확인
        #[arg(long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // 로깅 초기화 (.env 포함, CLI 인자 우선)
    init_logging(load_log_config(cli.log_level, cli.log_format))?;

    tracing::info!("Market Collector 시작");

    // 설정 로드
    let config = CollectorConfig::from_env()?;
    tracing::debug!(
        fetch_timeout_secs = config.reconcile.fetch_timeout_secs,
        fetch_concurrency = config.reconcile.fetch_concurrency,
        "설정 로드 완료"
    );

    // DB 연결
    let db = Database::connect(&config.database).await?;
    db.health_check().await?;
    let store = Arc::new(PgCandleStore::new(db.clone()));
    let readiness = SchemaReadiness::new();

    let catalog = Arc::new(config.catalog());
    let universe = SeriesKey::cartesian(&Pair::ALL, &Granularity::ALL, &catalog.exchanges());

    // 명령 실행
    match cli.command {
        Commands::Provision => {
            let report = modules::provision_schema(&db, &universe, &readiness).await;
            if !report.is_complete() {
                db.close().await;
                return Err(CollectorError::Provision(report.failed.len()).into());
            }
        }
        Commands::Reconcile => {
            let report = modules::provision_schema(&db, &universe, &readiness).await;
            let series = modules::reconcilable_series(&report, &universe)?;

            let reconciler = build_reconciler(&config, store.clone(), catalog, series)?;
            let report = reconciler.run_cycle().await;
            report.log_summary("캔들 동기화");
        }
        Commands::Daemon => {
            let report = modules::provision_schema(&db, &universe, &readiness).await;
            let series = modules::reconcilable_series(&report, &universe)?;

            let reconciler = build_reconciler(&config, store.clone(), catalog, series)?;
            let shutdown = async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    tracing::error!("종료 신호 수신 실패: {}", e);
                }
            };
            let cycles = modules::run_daemon(&reconciler, config.daemon.interval(), shutdown).await;
            tracing::info!(cycles = cycles, "데몬 종료");
        }
        Commands::Candles { pair, by } => {
            modules::provision_schema(&db, &universe, &readiness).await;
            let table = CandleTable::new(pair, by);
            let candles =
                modules::read_extremes(store.as_ref(), &readiness, table, config.schema_wait())
                    .await?;
            println!("{}", serde_json::to_string_pretty(&candles)?);
        }
        Commands::Extremes { pair, by } => {
            modules::provision_schema(&db, &universe, &readiness).await;
            let table = CandleTable::new(pair, by);
            let days = modules::read_daily_extremes(
                store.as_ref(),
                &readiness,
                table,
                config.schema_wait(),
            )
            .await?;
            println!("{}", serde_json::to_string_pretty(&days)?);
        }
        Commands::DropAll { yes } => {
            if !yes {
                db.close().await;
                return Err("drop-all은 --yes 확인이 필요합니다".into());
            }
            store.drop_all().await?;
        }
    }

    db.close().await;
    tracing::info!("Market Collector 종료");

    Ok(())
}

/// 공유 HTTP 클라이언트와 거래소 어댑터로 동기화 엔진을 구성합니다.
fn build_reconciler(
    config: &CollectorConfig,
    store: Arc<dyn CandleStore>,
    catalog: Arc<MarketCatalog>,
    universe: Vec<SeriesKey>,
) -> Result<Reconciler, CollectorError> {
    let client = HttpConfig::default()
        .with_timeout(config.reconcile.fetch_timeout_secs)
        .build_client()?;
    let sources = ExchangeAdapter::for_catalog(&client, catalog);

    Ok(Reconciler::new(
        store,
        sources,
        universe,
        config.reconcile.policy(),
    ))
}
