use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use serde::Deserialize;
use thiserror::Error;

use crate::db::{airport::{models::Airport, queries::upsert_airport}, DbPool};

const ICAO_LEN: usize = 4;

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("GetConnectionFromPool: {source}")]
    GetConnectionFromPool {
        #[from]
        source: r2d2::Error,
    },
    #[error("InvalidStationId: {station_id:?}")]
    InvalidStationId { station_id: String },
    #[error(transparent)]
    UpsertAirport {
        #[from]
        source: crate::db::airport::queries::UpsertAirportError,
    },
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> axum::response::Response {
        match self {
            HandlerError::InvalidStationId { station_id } => (
                StatusCode::BAD_REQUEST,
                format!("{station_id:?} is not a four-letter ICAO id"),
            )
                .into_response(),
            other => (StatusCode::INTERNAL_SERVER_ERROR, other.to_string()).into_response(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AirportUpsertRequestBody {
    station_id: String,
    #[serde(default = "fetched_by_default")]
    is_fetched: bool,
}

fn fetched_by_default() -> bool {
    true
}

/// Axum handler: POST /airports/upsert
pub async fn handler(
    Extension(pool): Extension<DbPool>,
    Json(input): Json<AirportUpsertRequestBody>,
) -> Result<Json<Airport>, HandlerError> {
    let station_id = input.station_id.trim().to_uppercase();
    if station_id.len() != ICAO_LEN || !station_id.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(HandlerError::InvalidStationId { station_id: input.station_id });
    }

    let mut conn = pool.get()?;
    let airport = upsert_airport(&mut conn, &Airport { station_id, is_fetched: input.is_fetched })?;

    Ok(Json(airport))
}
