//! Fetch METAR data for every airport marked for fetching and save it.
//!
//! Meant to be run periodically, e.g. from cron.

use projects_metar_server::{
    config::{AppConfig, ConfigError},
    db::{
        airport::queries::{get_fetched_airport_ids, GetFetchedAirportIdsError},
        establish_pool,
        migrations::{run_migrations, RunMigrationsError},
        EstablishPoolError,
    },
    ingest::{fetch_and_save, FetchAndSaveError},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchMetarError {
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
    #[error("GetFetchedAirportIds: {source}")]
    GetFetchedAirportIds {
        #[source]
        source: GetFetchedAirportIdsError,
    },
    #[error("FetchAndSave: {source}")]
    FetchAndSave {
        #[source]
        source: FetchAndSaveError,
    },
}

#[tokio::main]
async fn main() -> Result<(), FetchMetarError> {
    let config = AppConfig::from_env().map_err(|source| FetchMetarError::LoadConfig { source })?;

    utils_trace::init(&config.log_level, config.log_format)
        .map_err(|source| FetchMetarError::TracingInit { source })?;

    let pool = establish_pool(&config.database_url)
        .map_err(|source| FetchMetarError::EstablishPool { source })?;
    let airports = {
        let mut conn = pool
            .get()
            .map_err(|source| FetchMetarError::GetConnectionFromPool { source })?;
        run_migrations(&mut conn).map_err(|source| FetchMetarError::RunMigrations { source })?;

        get_fetched_airport_ids(&mut conn)
            .map_err(|source| FetchMetarError::GetFetchedAirportIds { source })?
    };

    let report = fetch_and_save(&pool, &config.awc_base_url, &airports, config.hours_before_now)
        .await
        .map_err(|source| FetchMetarError::FetchAndSave { source })?;

    println!("Fetched airport is {:?}", report.stations);
    println!("Fetched time is {}", report.fetched_at);
    println!("The number of the fetched data is {}", report.total());

    Ok(())
}
