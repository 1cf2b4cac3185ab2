use std::collections::BTreeMap;

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use chrono::NaiveDateTime;
use serde::Serialize;
use thiserror::Error;

use crate::db::{
    airport::queries::get_fetched_airport_ids,
    metar::queries::get_newest_observation_times,
    DbPool,
};

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("GetConnectionFromPool: {source}")]
    GetConnectionFromPool {
        #[from]
        source: r2d2::Error,
    },
    #[error(transparent)]
    GetFetchedAirportIds {
        #[from]
        source: crate::db::airport::queries::GetFetchedAirportIdsError,
    },
    #[error(transparent)]
    GetNewestObservationTimes {
        #[from]
        source: crate::db::metar::queries::GetNewestObservationTimesError,
    },
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> axum::response::Response {
        (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()).into_response()
    }
}

#[derive(Debug, Serialize)]
pub struct MetarsNewestResponse {
    pub airports: Vec<String>,
    pub newest: BTreeMap<String, NaiveDateTime>,
}

/// Axum handler: GET /metars/newest
pub async fn handler(
    Extension(pool): Extension<DbPool>,
) -> Result<Json<MetarsNewestResponse>, HandlerError> {
    let mut conn = pool.get()?;

    let airports = get_fetched_airport_ids(&mut conn)?;
    let newest = get_newest_observation_times(&mut conn, &airports)?;

    Ok(Json(MetarsNewestResponse { airports, newest }))
}
