use std::net::SocketAddr;

use anyhow::Context;
use axum::http::HeaderValue;
use chainwatch_api::{
    app::build_router,
    bootstrap::{build_evaluator, build_state},
    config::AppConfig,
    telemetry,
};
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    telemetry::init_tracing()?;

    let config = AppConfig::from_env()?;
    let allowed_origins = config
        .frontend_origins
        .iter()
        .map(|value| {
            HeaderValue::from_str(value)
                .map_err(|err| anyhow::anyhow!("invalid FRONTEND_ORIGINS entry {value}: {err}"))
        })
        .collect::<Result<Vec<_>, _>>()?;
    let state = build_state(&config)?;

    let shutdown = CancellationToken::new();
    let worker = if config.enable_reminder_worker {
        let evaluator = build_evaluator(&config, &state)?;
        Some(evaluator.spawn(config.reminder_interval, shutdown.clone()))
    } else {
        tracing::info!("reminder worker disabled");
        None
    };

    let app = build_router(state, allowed_origins);
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!(%addr, "listening on address");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;

    let server_shutdown = shutdown.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            telemetry::shutdown_signal().await;
            server_shutdown.cancel();
        })
        .await?;

    shutdown.cancel();
    if let Some(worker) = worker {
        if let Err(err) = worker.await {
            tracing::warn!(error = %err, "reminder worker ended abnormally");
        }
    }
    Ok(())
}
