use diesel::connection::SimpleConnection;
use diesel::SqliteConnection;
use thiserror::Error;
use tracing::info;

/// Bootstrap schema. Every statement is idempotent so this runs on each start.
pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS metars (
    id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
    raw_text TEXT NOT NULL,
    station_id VARCHAR(4) NOT NULL,
    observation_time TIMESTAMP NOT NULL,
    temp_c DOUBLE NOT NULL,
    dewpoint_c DOUBLE NOT NULL,
    wind_dir_degrees INTEGER NOT NULL,
    wind_speed_kt INTEGER NOT NULL,
    wind_gust_kt INTEGER,
    visibility_m INTEGER NOT NULL,
    altim_in_hg DOUBLE NOT NULL,
    wx_string VARCHAR(12),
    cloud_ceiling INTEGER,
    vert_vis_ft INTEGER,
    metar_type VARCHAR(5) NOT NULL
);

CREATE UNIQUE INDEX IF NOT EXISTS metars_station_observation_time
    ON metars (station_id, observation_time);

CREATE TABLE IF NOT EXISTS airports (
    station_id VARCHAR(4) PRIMARY KEY NOT NULL,
    is_fetched BOOLEAN NOT NULL DEFAULT 0
);
"#;

#[derive(Debug, Error)]
pub enum RunMigrationsError {
    #[error("ApplySchema: {source}")]
    ApplySchema {
        #[source]
        source: diesel::result::Error,
    },
}

pub fn run_migrations(conn: &mut SqliteConnection) -> Result<(), RunMigrationsError> {
    conn.batch_execute(SCHEMA)
        .map_err(|source| RunMigrationsError::ApplySchema { source })?;

    info!("database schema is up to date");
    Ok(())
}
