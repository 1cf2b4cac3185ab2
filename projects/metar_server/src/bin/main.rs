use std::sync::Arc;

use projects_metar_server::{
    config::{AppConfig, ConfigError},
    db::{
        establish_pool,
        migrations::{run_migrations, RunMigrationsError},
        EstablishPoolError,
    },
    router::router,
};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum MainError {
    #[error("LoadConfig: {source}")]
    LoadConfig {
        #[source]
        source: ConfigError,
    },
    #[error("TracingInit: {source}")]
    TracingInit {
        #[source]
        source: utils_trace::TracingInitError,
    },
    #[error("EstablishPool: {source}")]
    EstablishPool {
        #[source]
        source: EstablishPoolError,
    },
    #[error("GetConnectionFromPool: {source}")]
    GetConnectionFromPool {
        #[source]
        source: r2d2::Error,
    },
    #[error("RunMigrations: {source}")]
    RunMigrations {
        #[source]
        source: RunMigrationsError,
    },
    #[error("TcpListenerBind: {source}")]
    TcpListenerBind {
        #[source]
        source: std::io::Error,
    },
    #[error("Serve: {source}")]
    Serve {
        #[source]
        source: std::io::Error,
    },
}

#[tokio::main]
async fn main() -> Result<(), MainError> {
    let config = AppConfig::from_env().map_err(|source| MainError::LoadConfig { source })?;

    utils_trace::init(&config.log_level, config.log_format)
        .map_err(|source| MainError::TracingInit { source })?;

    let pool = establish_pool(&config.database_url)
        .map_err(|source| MainError::EstablishPool { source })?;
    {
        let mut conn = pool
            .get()
            .map_err(|source| MainError::GetConnectionFromPool { source })?;
        run_migrations(&mut conn).map_err(|source| MainError::RunMigrations { source })?;
    }

    let addr = config.bind_addr;
    let app = router(pool, Arc::new(config));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| MainError::TcpListenerBind { source })?;

    info!("Server running on addr: {}", addr);

    axum::serve(listener, app)
        .await
        .map_err(|source| MainError::Serve { source })?;

    Ok(())
}
