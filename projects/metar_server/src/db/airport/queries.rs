use diesel::prelude::*;
use thiserror::Error;

use crate::db::{airport::models::*, schema::airports::dsl::*};

#[derive(Debug, Error)]
pub enum UpsertAirportError {
    #[error("UpsertAirport: {source}")]
    UpsertAirport {
        #[from]
        source: diesel::result::Error,
    },
}

pub fn upsert_airport(
    conn: &mut SqliteConnection,
    airport: &Airport,
) -> Result<Airport, UpsertAirportError> {
    diesel::replace_into(airports)
        .values(airport)
        .execute(conn)
        .map_err(|source| UpsertAirportError::UpsertAirport { source })?;

    airports
        .find(&airport.station_id)
        .select(Airport::as_select())
        .first(conn)
        .map_err(|source| UpsertAirportError::UpsertAirport { source })
}

#[derive(Debug, Error)]
pub enum GetFetchedAirportIdsError {
    #[error("GetFetchedAirportIds: {source}")]
    GetFetchedAirportIds {
        #[from]
        source: diesel::result::Error,
    },
}

pub fn get_fetched_airport_ids(
    conn: &mut SqliteConnection,
) -> Result<Vec<String>, GetFetchedAirportIdsError> {
    airports
        .filter(is_fetched.eq(true))
        .select(station_id)
        .order(station_id.asc())
        .load::<String>(conn)
        .map_err(|source| GetFetchedAirportIdsError::GetFetchedAirportIds { source })
}

#[derive(Debug, Error)]
pub enum GetAirportsError {
    #[error("GetAirports: {source}")]
    GetAirports {
        #[from]
        source: diesel::result::Error,
    },
}

pub fn get_airports(conn: &mut SqliteConnection) -> Result<Vec<Airport>, GetAirportsError> {
    airports
        .select(Airport::as_select())
        .order(station_id.asc())
        .load::<Airport>(conn)
        .map_err(|source| GetAirportsError::GetAirports { source })
}
