use std::sync::Arc;

use axum::{
    extract::{Extension, Json},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

use crate::config::AppConfig;
use crate::db::{
    metar::{models::Metar, queries::get_metars_in_range},
    DbPool,
};
use crate::endpoints::metars::{observation_day_range, MetarsDayRequestBody};

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("GetConnectionFromPool: {source}")]
    GetConnectionFromPool {
        #[from]
        source: r2d2::Error,
    },
    #[error("EmptyIcao")]
    EmptyIcao,
    #[error(transparent)]
    GetMetarsInRange {
        #[from]
        source: crate::db::metar::queries::GetMetarsInRangeError,
    },
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> axum::response::Response {
        match self {
            HandlerError::GetConnectionFromPool { source } => {
                (StatusCode::INTERNAL_SERVER_ERROR, source.to_string()).into_response()
            }
            HandlerError::EmptyIcao => {
                (StatusCode::BAD_REQUEST, "icao must not be empty".to_owned()).into_response()
            }
            HandlerError::GetMetarsInRange { source } => {
                (StatusCode::INTERNAL_SERVER_ERROR, source.to_string()).into_response()
            }
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MetarsQueryResponse {
    pub icao: String,
    pub search_date: NaiveDate,
    pub metars: Vec<Metar>,
}

/// Axum handler: POST /metars/query
pub async fn handler(
    Extension(pool): Extension<DbPool>,
    Extension(config): Extension<Arc<AppConfig>>,
    Json(input): Json<MetarsDayRequestBody>,
) -> impl IntoResponse {
    let metars = match load_day(&pool, &config, &input) {
        Ok(metars) => metars,
        Err(err) => return err.into_response(),
    };

    (
        StatusCode::OK,
        Json(MetarsQueryResponse {
            icao: input.station(),
            search_date: input.search_date,
            metars,
        }),
    )
        .into_response()
}

/// Records of the requested station and local day, in the requested order.
pub fn load_day(
    pool: &DbPool,
    config: &AppConfig,
    input: &MetarsDayRequestBody,
) -> Result<Vec<Metar>, HandlerError> {
    let station = input.station();
    if station.is_empty() {
        return Err(HandlerError::EmptyIcao);
    }

    let mut conn = pool.get()?;
    let (start, end) = observation_day_range(input.search_date, config.query_utc_offset);

    Ok(get_metars_in_range(&mut conn, &station, start, end, input.metar_order)?)
}
