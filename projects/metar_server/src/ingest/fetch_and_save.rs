use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use diesel::SqliteConnection;
use interfaces_aviationweather_metars::{
    index::{fetch_metars, AviationWeatherXmlResult, FetchMetarsError},
    response::{parse_response, ParseResponseError},
};
use reqwest::StatusCode;
use thiserror::Error;
use tracing::{info, warn};

use crate::db::{
    metar::{
        models::NewMetar,
        queries::{
            get_recent_observation_keys, insert_metars, GetRecentObservationKeysError,
            InsertMetarsError,
        },
    },
    DbPool,
};
use crate::ingest::{dedup::select_new, parse::{parse_metar, ParseMetarError}};

/// Lookback requested from the dataserver when the caller has no preference.
pub const DEFAULT_HOURS_BEFORE_NOW: u32 = 25;

/// How far before the fetch time stored records are checked for duplicates.
pub const DEDUP_WINDOW_HOURS: i64 = 73;

const BODY_EXCERPT_CHARS: usize = 200;

#[derive(Debug, Error)]
pub enum SaveResponseError {
    #[error("ParseResponse: {source}")]
    ParseResponse {
        #[from]
        source: ParseResponseError,
    },

    #[error("ServiceErrors: {}", .messages.join("; "))]
    ServiceErrors { messages: Vec<String> },

    #[error("ParseMetar: {source}")]
    ParseMetar {
        #[from]
        source: ParseMetarError,
    },

    #[error("GetRecentObservationKeys: {source}")]
    GetRecentObservationKeys {
        #[from]
        source: GetRecentObservationKeysError,
    },

    #[error("InsertMetars: {source}")]
    InsertMetars {
        #[from]
        source: InsertMetarsError,
    },
}

#[derive(Debug)]
pub struct SavedMetars {
    /// METAR elements present in the feed.
    pub received: usize,
    pub inserted: Vec<NewMetar>,
}

/// Stores the records of one dataserver reply that are not in the database yet.
///
/// Nothing is written unless every METAR in the reply parses.
pub fn save_response(
    conn: &mut SqliteConnection,
    body: &str,
    fetched_at: DateTime<Utc>,
) -> Result<SavedMetars, SaveResponseError> {
    let response = parse_response(body)?;

    if !response.errors.messages.is_empty() {
        return Err(SaveResponseError::ServiceErrors { messages: response.errors.messages });
    }

    for message in &response.warnings.messages {
        warn!(message = %message, "dataserver warning");
    }

    let candidates = response
        .data
        .metars
        .iter()
        .map(parse_metar)
        .collect::<Result<Vec<_>, _>>()?;
    let received = candidates.len();

    let since = (fetched_at - Duration::hours(DEDUP_WINDOW_HOURS)).naive_utc();
    let stored = get_recent_observation_keys(conn, since)?;

    let fresh = select_new(candidates, &stored);
    insert_metars(conn, &fresh)?;

    info!(
        received,
        inserted = fresh.len(),
        skipped = received - fresh.len(),
        "saved METARs"
    );

    Ok(SavedMetars { received, inserted: fresh })
}

#[derive(Debug, Error)]
pub enum FetchAndSaveError {
    #[error("FetchMetars: {source}")]
    FetchMetars {
        #[from]
        source: FetchMetarsError,
    },

    #[error("UnexpectedStatus: {status}: {body_excerpt}")]
    UnexpectedStatus {
        status: StatusCode,
        body_excerpt: String,
    },

    #[error("GetConnectionFromPool: {source}")]
    GetConnectionFromPool {
        #[from]
        source: r2d2::Error,
    },

    #[error("SaveResponse: {source}")]
    SaveResponse {
        #[from]
        source: SaveResponseError,
    },

    #[error("JoinSaveTask: {source}")]
    JoinSaveTask {
        #[from]
        source: tokio::task::JoinError,
    },
}

#[derive(Debug)]
pub struct IngestReport {
    pub stations: Vec<String>,
    pub fetched_at: DateTime<Utc>,
    pub received: usize,
    pub inserted: Vec<NewMetar>,
}

impl IngestReport {
    pub fn counts_per_station(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for metar in &self.inserted {
            *counts.entry(metar.station_id.clone()).or_insert(0) += 1;
        }
        counts
    }

    pub fn total(&self) -> usize {
        self.inserted.len()
    }
}

/// Fetches the last `hours_before_now` hours of METARs for `stations` and
/// stores the new ones. An empty station list makes no request.
///
/// No connection is held during the request; the database steps run on the
/// blocking pool.
pub async fn fetch_and_save(
    pool: &DbPool,
    base_url: &str,
    stations: &[String],
    hours_before_now: u32,
) -> Result<IngestReport, FetchAndSaveError> {
    if stations.is_empty() {
        info!("no stations to fetch");
        return Ok(IngestReport {
            stations: Vec::new(),
            fetched_at: Utc::now(),
            received: 0,
            inserted: Vec::new(),
        });
    }

    let AviationWeatherXmlResult { body, status } =
        fetch_metars(base_url, stations, hours_before_now).await?;
    let fetched_at = Utc::now();

    if !status.is_success() {
        return Err(FetchAndSaveError::UnexpectedStatus {
            status,
            body_excerpt: body.chars().take(BODY_EXCERPT_CHARS).collect(),
        });
    }

    info!(stations = %stations.join(","), %fetched_at, "fetched METARs");

    let pool = pool.clone();
    let SavedMetars { received, inserted } =
        tokio::task::spawn_blocking(move || -> Result<SavedMetars, FetchAndSaveError> {
            let mut conn = pool.get()?;
            Ok(save_response(&mut conn, &body, fetched_at)?)
        })
        .await??;

    Ok(IngestReport {
        stations: stations.to_vec(),
        fetched_at,
        received,
        inserted,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn metar(station: &str, minute: u32) -> NewMetar {
        NewMetar {
            raw_text: format!("{station} 1400{minute:02}Z 34008KT 9999 FEW030 18/12 Q1018"),
            station_id: station.to_owned(),
            observation_time: NaiveDate::from_ymd_opt(2026, 10, 14)
                .unwrap()
                .and_hms_opt(0, minute, 0)
                .unwrap(),
            temp_c: 18.0,
            dewpoint_c: 12.0,
            wind_dir_degrees: 340,
            wind_speed_kt: 8,
            wind_gust_kt: None,
            visibility_m: 9999,
            altim_in_hg: 30.06,
            wx_string: None,
            cloud_ceiling: None,
            vert_vis_ft: None,
            metar_type: "METAR".to_owned(),
        }
    }

    #[test]
    fn report_counts_per_station() {
        let report = IngestReport {
            stations: vec!["RJAA".to_owned(), "RJTT".to_owned()],
            fetched_at: Utc::now(),
            received: 4,
            inserted: vec![metar("RJTT", 0), metar("RJAA", 0), metar("RJTT", 30)],
        };

        let counts = report.counts_per_station();

        assert_eq!(counts.get("RJTT"), Some(&2));
        assert_eq!(counts.get("RJAA"), Some(&1));
        assert_eq!(report.total(), 3);
    }
}
