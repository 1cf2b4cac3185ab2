pub mod airport;
pub mod metar;
pub mod migrations;
pub mod schema;

use diesel::connection::SimpleConnection;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool};
use diesel::SqliteConnection;
use thiserror::Error;

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;

const BUSY_TIMEOUT_MS: u32 = 5_000;

#[derive(Debug)]
struct ConnectionOptions;

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for ConnectionOptions {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
        conn.batch_execute(&format!(
            "PRAGMA foreign_keys = ON; PRAGMA busy_timeout = {BUSY_TIMEOUT_MS};"
        ))
        .map_err(diesel::r2d2::Error::QueryError)
    }
}

#[derive(Debug, Error)]
pub enum EstablishPoolError {
    #[error("BuildPool: {source}")]
    BuildPool {
        #[from]
        source: r2d2::Error,
    },
}

/// `database_url` is a SQLite file path; the file is created when missing.
pub fn establish_pool(database_url: &str) -> Result<DbPool, EstablishPoolError> {
    let manager = ConnectionManager::<SqliteConnection>::new(database_url);

    Pool::builder()
        .connection_customizer(Box::new(ConnectionOptions))
        .build(manager)
        .map_err(|source| EstablishPoolError::BuildPool { source })
}
