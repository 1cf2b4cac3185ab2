use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use diesel::{dsl::max, prelude::*};
use serde::Deserialize;
use thiserror::Error;

use crate::db::{metar::models::*, schema::metars::dsl::*};

/// Rows per INSERT statement.
pub const INSERT_BATCH_SIZE: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetarOrder {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Error)]
pub enum InsertMetarsError {
    #[error("InsertMetars: {source}")]
    InsertMetars {
        #[from]
        source: diesel::result::Error,
    },
}

/// Inserts all records in one transaction, `INSERT_BATCH_SIZE` rows at a time.
/// A duplicate (station_id, observation_time) fails the unique index and
/// rolls the whole call back.
pub fn insert_metars(
    conn: &mut SqliteConnection,
    new: &[NewMetar],
) -> Result<usize, InsertMetarsError> {
    conn.transaction::<usize, diesel::result::Error, _>(|conn| {
        let mut inserted = 0;
        for batch in new.chunks(INSERT_BATCH_SIZE) {
            inserted += diesel::insert_into(metars).values(batch).execute(conn)?;
        }
        Ok(inserted)
    })
    .map_err(|source| InsertMetarsError::InsertMetars { source })
}

#[derive(Debug, Error)]
pub enum GetRecentObservationKeysError {
    #[error("GetRecentObservationKeys: {source}")]
    GetRecentObservationKeys {
        #[from]
        source: diesel::result::Error,
    },
}

pub fn get_recent_observation_keys(
    conn: &mut SqliteConnection,
    since: NaiveDateTime,
) -> Result<Vec<(String, NaiveDateTime)>, GetRecentObservationKeysError> {
    metars
        .filter(observation_time.ge(since))
        .select((station_id, observation_time))
        .load::<(String, NaiveDateTime)>(conn)
        .map_err(|source| GetRecentObservationKeysError::GetRecentObservationKeys { source })
}

#[derive(Debug, Error)]
pub enum GetMetarsInRangeError {
    #[error("GetMetarsInRange: {source}")]
    GetMetarsInRange {
        #[from]
        source: diesel::result::Error,
    },
}

/// Both ends of the range are inclusive.
pub fn get_metars_in_range(
    conn: &mut SqliteConnection,
    station: &str,
    start: NaiveDateTime,
    end: NaiveDateTime,
    order: MetarOrder,
) -> Result<Vec<Metar>, GetMetarsInRangeError> {
    let query = metars
        .filter(station_id.eq(station))
        .filter(observation_time.between(start, end))
        .select(Metar::as_select())
        .into_boxed();

    let query = match order {
        MetarOrder::Asc => query.order(observation_time.asc()),
        MetarOrder::Desc => query.order(observation_time.desc()),
    };

    query
        .load::<Metar>(conn)
        .map_err(|source| GetMetarsInRangeError::GetMetarsInRange { source })
}

#[derive(Debug, Error)]
pub enum GetNewestObservationTimesError {
    #[error("GetNewestObservationTimes: {source}")]
    GetNewestObservationTimes {
        #[from]
        source: diesel::result::Error,
    },
}

/// Stations without any stored METAR are left out of the map.
pub fn get_newest_observation_times(
    conn: &mut SqliteConnection,
    stations: &[String],
) -> Result<BTreeMap<String, NaiveDateTime>, GetNewestObservationTimesError> {
    let rows = metars
        .filter(station_id.eq_any(stations))
        .group_by(station_id)
        .select((station_id, max(observation_time)))
        .load::<(String, Option<NaiveDateTime>)>(conn)
        .map_err(|source| GetNewestObservationTimesError::GetNewestObservationTimes { source })?;

    Ok(rows
        .into_iter()
        .filter_map(|(station, newest)| newest.map(|newest| (station, newest)))
        .collect())
}
