mod api;
mod cache;
mod middleware;
mod scheduler;

use std::{sync::Arc, time::Duration};

use tracing_subscriber::EnvFilter;

use crate::{
    api::{build_app, rate_limit_state, AppState},
    cache::ChargerCache,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Arc::new(echarger_core::load_app_config()?);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    tracing::info!(env = %config.env, bind_addr = %config.bind_addr, "starting echarger-server");

    let pool_config = echarger_db::PoolConfig::from_app_config(&config);
    let pool = echarger_db::connect_pool(&config.database_url, pool_config).await?;
    let applied = echarger_db::run_migrations(&pool).await?;
    tracing::info!(applied, "migrations up to date");

    let cache = ChargerCache::new(Duration::from_secs(config.cache_ttl_secs));

    let _scheduler =
        scheduler::build_scheduler(pool.clone(), Arc::clone(&config), cache.clone()).await?;

    let rate_limit = rate_limit_state(&config);
    let app = build_app(
        AppState {
            pool,
            config: Arc::clone(&config),
            cache,
        },
        rate_limit,
    );

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
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
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
