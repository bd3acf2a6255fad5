mod config;
mod main_lib;

use config::Config;
use main_lib::{build_state, init_tracing, log_performance, rebuild_history, seed_buckets};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    init_tracing(&config.log_format);

    let state = build_state(&config).await?;
    seed_buckets(&state, &config).await?;

    let summary = state
        .simulation_service
        .run(config.start_date, config.end_date)
        .await?;
    tracing::info!(
        "Processed {} Mondays ({:?} to {:?}), {} deals written",
        summary.mondays_processed,
        summary.first_monday,
        summary.last_monday,
        summary.total_deals()
    );

    rebuild_history(&state).await;
    log_performance(&state, &summary)?;
    Ok(())
}
