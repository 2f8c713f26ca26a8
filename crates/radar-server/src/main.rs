mod api;
mod middleware;
mod scheduler;

use std::sync::Arc;

use radar_engine::PipelineOrchestrator;
use tracing_subscriber::EnvFilter;

use crate::{
    api::{build_app, default_rate_limit_state, AppState},
    middleware::AuthState,
    scheduler::PipelineRunner,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = radar_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = radar_db::PoolConfig::from_app_config(&config);
    let pool = radar_db::connect_pool(&config.database_url, pool_config).await?;
    let applied = radar_db::run_migrations(&pool).await?;
    tracing::info!(applied, "migrations up to date");

    let orchestrator = PipelineOrchestrator::from_config(pool.clone(), &config)?;
    let runner = Arc::new(PipelineRunner::new(orchestrator));
    let mut scheduler = scheduler::build_scheduler(
        Arc::clone(&runner),
        &config.scrape_cron,
        &config.trends_cron,
    )
    .await?;

    let auth = AuthState::from_env(matches!(
        config.env,
        radar_core::Environment::Development
    ))?;
    let app = build_app(AppState { pool, runner }, auth, default_rate_limit_state());

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "radar-server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Err(e) = scheduler.shutdown().await {
        tracing::warn!(error = %e, "scheduler did not shut down cleanly");
    }
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
