//! Process entry point. `APP_MODE` selects which of the HTTP
//! surface (F/G/H) and the worker fleet (E) this process hosts; `both` runs
//! them side by side in one process, matching `api-gateway`'s single-binary,
//! multi-mode shape.

use std::net::SocketAddr;

use scraping_api::{build_router, AppMode, AppState, Config, Result};
use scraping_worker::{WorkerConfig, WorkerFleet};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env().map_err(|e| {
        scraping_shared::ScrapeError::Internal(format!("configuration error: {e}"))
    })?;
    init_tracing(&config.log_level);

    info!(mode = ?config.app_mode, "starting business-profile scraping platform");

    let state = AppState::new(config.clone()).await?;

    let idle_reaper = state.browser_pool.clone().spawn_idle_reaper();

    let worker_handle = match config.app_mode {
        AppMode::Api => None,
        AppMode::Worker | AppMode::Both => Some(spawn_worker_fleet(&state, &config)),
    };

    match config.app_mode {
        AppMode::Worker => {
            if let Some(handle) = worker_handle {
                let _ = handle.await;
            }
        }
        AppMode::Api | AppMode::Both => {
            serve_http(state, config.port).await?;
            if let Some(handle) = worker_handle {
                let _ = handle.await;
            }
        }
    }

    idle_reaper.abort();
    info!("shutdown complete");
    Ok(())
}

fn spawn_worker_fleet(state: &AppState, config: &Config) -> tokio::task::JoinHandle<()> {
    let worker_config = WorkerConfig {
        concurrency: config.worker_concurrency,
        ..WorkerConfig::default()
    };
    let fleet = WorkerFleet::new(
        state.queue.clone(),
        state.browser_pool.clone(),
        state.engine.clone(),
        worker_config,
    );
    tokio::spawn(fleet.run())
}

async fn serve_http(state: AppState, port: u16) -> Result<()> {
    let app = build_router(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| scraping_shared::ScrapeError::Internal(format!("bind failed: {e}")))?;

    info!("listening on {addr}");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| scraping_shared::ScrapeError::Internal(format!("server error: {e}")).into())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

fn init_tracing(log_level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level.to_string()));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().json())
        .init();
}
