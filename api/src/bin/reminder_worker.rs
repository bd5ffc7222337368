use chainwatch_api::{
    bootstrap::{build_evaluator, build_state},
    config::AppConfig,
    telemetry,
};
use tokio_util::sync::CancellationToken;

/// Runs the reminder loop without the HTTP surface until Ctrl-C.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    telemetry::init_tracing()?;

    let config = AppConfig::from_env()?;
    let state = build_state(&config)?;
    let evaluator = build_evaluator(&config, &state)?;

    let shutdown = CancellationToken::new();
    let worker = evaluator.spawn(config.reminder_interval, shutdown.clone());
    tracing::info!(
        interval_secs = config.reminder_interval.as_secs(),
        "reminder worker running"
    );

    telemetry::shutdown_signal().await;
    shutdown.cancel();
    worker.await?;
    Ok(())
}
