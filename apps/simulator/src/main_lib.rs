use std::sync::Arc;

use chrono::Duration;
use fund_core::{
    deals::DealRepositoryTrait,
    managers::ManagerRepositoryTrait,
    market_data::{OutlierFilter, PriceRefreshService, PriceRepositoryTrait},
    portfolio::{
        history::{HistoryService, SnapshotRepositoryTrait},
        holdings::{HoldingsRepositoryTrait, RiskBucket},
        performance::{weekly_returns, PortfolioPerformance, DEFAULT_RISK_FREE_RATE},
    },
    setup::FundSetupService,
    simulation::{SimulationService, SimulationSummary},
    strategies::{
        BreakoutStrategy, MomentumStrategy, RebalanceStoreTrait, RebalanceStrategy,
        StrategySettings, VolatilityTargetStrategy,
    },
};
use fund_market_data::{PriceProvider, YahooProvider};
use fund_storage_sqlite::{
    create_pool, init, run_migrations, spawn_writer, DealRepository, HoldingsRepository,
    ManagerRepository, PriceRepository, RebalanceStore, SnapshotRepository,
};
use rust_decimal::Decimal;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::Config;

/// Days of prices fetched before the start date for the initial allocation.
const ALLOCATION_LOOKBACK_DAYS: i64 = 10;

pub struct AppState {
    pub holdings_repository: Arc<dyn HoldingsRepositoryTrait>,
    pub manager_repository: Arc<dyn ManagerRepositoryTrait>,
    pub refresh_service: Arc<PriceRefreshService>,
    pub setup_service: FundSetupService,
    pub simulation_service: SimulationService,
    pub history_service: HistoryService,
}

pub fn init_tracing(log_format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

pub fn manager_id_for(bucket: RiskBucket) -> String {
    format!("MGR_{}", bucket.as_str())
}

pub async fn build_state(config: &Config) -> anyhow::Result<AppState> {
    let db_path = init(&config.db_path)?;
    tracing::info!("Database path in use: {}", db_path);

    let pool = create_pool(&db_path)?;
    run_migrations(&pool)?;
    let writer = spawn_writer((*pool).clone());

    let holdings_repository: Arc<dyn HoldingsRepositoryTrait> =
        Arc::new(HoldingsRepository::new(pool.clone(), writer.clone()));
    let deal_repository: Arc<dyn DealRepositoryTrait> =
        Arc::new(DealRepository::new(pool.clone(), writer.clone()));
    let manager_repository: Arc<dyn ManagerRepositoryTrait> =
        Arc::new(ManagerRepository::new(pool.clone(), writer.clone()));
    let price_repository: Arc<dyn PriceRepositoryTrait> =
        Arc::new(PriceRepository::new(pool.clone(), writer.clone()));
    let snapshot_repository: Arc<dyn SnapshotRepositoryTrait> =
        Arc::new(SnapshotRepository::new(pool.clone(), writer.clone()));
    let store: Arc<dyn RebalanceStoreTrait> = Arc::new(RebalanceStore::new(writer));

    let mut settings = StrategySettings::default();
    settings.breakout.tickers = config.breakout_tickers.clone();
    settings.optimizer.seed = config.seed;
    let breakout_moves_holdings = settings.breakout.updates_holdings;

    let strategies: Vec<Arc<dyn RebalanceStrategy>> = vec![
        Arc::new(VolatilityTargetStrategy::new(
            settings.optimizer,
            manager_repository.clone(),
            holdings_repository.clone(),
            price_repository.clone(),
        )),
        Arc::new(BreakoutStrategy::new(
            settings.breakout,
            manager_repository.clone(),
            holdings_repository.clone(),
            deal_repository.clone(),
            price_repository.clone(),
        )),
        Arc::new(MomentumStrategy::new(
            settings.momentum,
            manager_repository.clone(),
            holdings_repository.clone(),
            price_repository.clone(),
        )),
    ];

    let provider: Arc<dyn PriceProvider> = Arc::new(YahooProvider::new()?);
    let refresh_service = Arc::new(
        PriceRefreshService::new(provider, price_repository.clone())
            .with_outlier_filter(OutlierFilter::default()),
    );

    let mut universe = config.tickers.clone();
    for ticker in &config.breakout_tickers {
        if !universe.contains(ticker) {
            universe.push(ticker.clone());
        }
    }

    let simulation_service = SimulationService::new(
        universe,
        strategies,
        Some(refresh_service.clone()),
        store.clone(),
        holdings_repository.clone(),
        deal_repository.clone(),
        price_repository.clone(),
    );
    let mut history_service = HistoryService::new(
        holdings_repository.clone(),
        deal_repository,
        snapshot_repository,
    );
    if !breakout_moves_holdings {
        history_service = history_service.with_ledger_only_bucket(RiskBucket::LowTurnover);
    }
    let setup_service = FundSetupService::new(
        manager_repository.clone(),
        holdings_repository.clone(),
        price_repository,
        store,
    );

    Ok(AppState {
        holdings_repository,
        manager_repository,
        refresh_service,
        setup_service,
        simulation_service,
        history_service,
    })
}

/// Seeds every bucket with a manager, cash and its ticker universe, then buys
/// the HY_EQUITY universe in equal weights so momentum has holdings to scale.
pub async fn seed_buckets(state: &AppState, config: &Config) -> anyhow::Result<()> {
    for bucket in RiskBucket::ALL {
        let universe = match bucket {
            RiskBucket::LowTurnover => &config.breakout_tickers,
            RiskBucket::LowRisk | RiskBucket::HyEquity => &config.tickers,
        };
        let setup = state
            .setup_service
            .ensure_bucket(
                bucket,
                &manager_id_for(bucket),
                config.initial_cash,
                universe,
                config.start_date,
            )
            .await?;
        if setup.is_noop() {
            tracing::info!("{} already seeded", bucket);
        }
    }
    tracing::debug!(
        "{} managers on file",
        state.manager_repository.list_managers()?.len()
    );

    let lookback_start = config.start_date - Duration::days(ALLOCATION_LOOKBACK_DAYS);
    let report = state
        .refresh_service
        .refresh(&config.tickers, lookback_start, config.start_date)
        .await;
    if !report.failures.is_empty() {
        tracing::warn!("{} tickers unpriced before the start date", report.failures.len());
    }
    let deals = state
        .setup_service
        .seed_allocation(RiskBucket::HyEquity, config.start_date)
        .await?;
    tracing::info!("{}: {} initial allocation deals", RiskBucket::HyEquity, deals);
    Ok(())
}

/// Rebuilds every bucket's snapshots from the deal log.
pub async fn rebuild_history(state: &AppState) {
    for bucket in RiskBucket::ALL {
        match state.history_service.rebuild(bucket).await {
            Ok(written) => tracing::info!("{}: {} history rows rebuilt", bucket, written),
            Err(e) => tracing::warn!("{}: history rebuild failed: {}", bucket, e),
        }
    }
}

pub fn log_performance(state: &AppState, summary: &SimulationSummary) -> anyhow::Result<()> {
    for bucket in RiskBucket::ALL {
        let values: Vec<Decimal> = summary
            .value_series(bucket)
            .into_iter()
            .map(|(_, value)| value)
            .collect();
        let performance =
            PortfolioPerformance::new(weekly_returns(&values), DEFAULT_RISK_FREE_RATE);
        let report = performance.summary(None);
        tracing::info!(
            "{} performance: {}",
            bucket,
            serde_json::to_string(&report)?
        );

        let positions = state.holdings_repository.get_positions(bucket)?;
        tracing::info!("{} closes with {} positions", bucket, positions.len());
    }
    Ok(())
}
