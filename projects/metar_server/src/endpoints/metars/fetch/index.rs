use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{Extension, Json},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info};

use crate::config::AppConfig;
use crate::db::{airport::queries::get_fetched_airport_ids, DbPool};
use crate::ingest::{fetch_and_save, FetchAndSaveError, SaveResponseError};

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("GetConnectionFromPool: {source}")]
    GetConnectionFromPool {
        #[from]
        source: r2d2::Error,
    },
    #[error("GetFetchedAirportIds: {source}")]
    GetFetchedAirportIds {
        #[from]
        source: crate::db::airport::queries::GetFetchedAirportIdsError,
    },
    #[error("FetchAndSave: {source}")]
    FetchAndSave {
        #[from]
        source: FetchAndSaveError,
    },
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            HandlerError::GetConnectionFromPool { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            HandlerError::GetFetchedAirportIds { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            HandlerError::FetchAndSave { source } => fetch_and_save_status(source),
        };

        (status, self.to_string()).into_response()
    }
}

fn fetch_and_save_status(err: &FetchAndSaveError) -> StatusCode {
    match err {
        FetchAndSaveError::FetchMetars { .. } | FetchAndSaveError::UnexpectedStatus { .. } => {
            StatusCode::BAD_GATEWAY
        }
        FetchAndSaveError::SaveResponse { source } => match source {
            SaveResponseError::ServiceErrors { .. } => StatusCode::BAD_GATEWAY,
            SaveResponseError::ParseResponse { .. } | SaveResponseError::ParseMetar { .. } => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            SaveResponseError::GetRecentObservationKeys { .. }
            | SaveResponseError::InsertMetars { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        },
        FetchAndSaveError::GetConnectionFromPool { .. }
        | FetchAndSaveError::JoinSaveTask { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// JSON payload expected by the endpoint. No airports means every airport
/// marked for fetching.
#[derive(Debug, Default, Deserialize)]
pub struct MetarsFetchRequestBody {
    #[serde(default)]
    airports: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct MetarsFetchResponse {
    pub stations: Vec<String>,
    pub fetched_at: DateTime<Utc>,
    pub received: usize,
    pub per_station: BTreeMap<String, usize>,
    pub total: usize,
}

/// Axum handler: POST /metars/fetch
pub async fn handler(
    Extension(pool): Extension<DbPool>,
    Extension(config): Extension<Arc<AppConfig>>,
    Json(input): Json<MetarsFetchRequestBody>,
) -> impl IntoResponse {
    match fetch(&pool, &config, input).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(err) => {
            error!(error = %err, "manual METAR fetch failed");
            err.into_response()
        }
    }
}

async fn fetch(
    pool: &DbPool,
    config: &AppConfig,
    input: MetarsFetchRequestBody,
) -> Result<MetarsFetchResponse, HandlerError> {
    let mut stations: Vec<String> = input
        .airports
        .iter()
        .map(|airport| airport.trim().to_uppercase())
        .filter(|airport| !airport.is_empty())
        .collect();
    stations.sort();
    stations.dedup();

    if stations.is_empty() {
        let mut conn = pool.get()?;
        stations = get_fetched_airport_ids(&mut conn)?;
    }

    let report =
        fetch_and_save(pool, &config.awc_base_url, &stations, config.hours_before_now).await?;

    info!(total = report.total(), "manual METAR fetch finished");

    Ok(MetarsFetchResponse {
        per_station: report.counts_per_station(),
        total: report.total(),
        received: report.received,
        fetched_at: report.fetched_at,
        stations: report.stations,
    })
}
