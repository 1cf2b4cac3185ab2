use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Extension, Json},
    http::{header, Response, StatusCode},
    response::IntoResponse,
};
use thiserror::Error;

use crate::config::AppConfig;
use crate::db::{metar::models::Metar, DbPool};
use crate::endpoints::metars::{query::index::load_day, MetarsDayRequestBody};

pub const CSV_HEADER: [&str; 15] = [
    "id",
    "raw_text",
    "station_id",
    "observation_time",
    "temp_c",
    "dewpoint_c",
    "wind_dir_degrees",
    "wind_speed_kt",
    "wind_gust_kt",
    "visibility_m",
    "altim_in_hg",
    "wx_string",
    "cloud_ceiling",
    "vert_vis_ft",
    "metar_type",
];

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("LoadDay: {source}")]
    LoadDay {
        #[from]
        source: crate::endpoints::metars::query::index::HandlerError,
    },
    #[error("WriteCsv: {source}")]
    WriteCsv {
        #[from]
        source: WriteMetarsCsvError,
    },
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> axum::response::Response {
        match self {
            HandlerError::LoadDay { source } => source.into_response(),
            HandlerError::WriteCsv { source } => {
                (StatusCode::INTERNAL_SERVER_ERROR, source.to_string()).into_response()
            }
        }
    }
}

/// Axum handler: POST /metars/export_csv
pub async fn handler(
    Extension(pool): Extension<DbPool>,
    Extension(config): Extension<Arc<AppConfig>>,
    Json(input): Json<MetarsDayRequestBody>,
) -> impl IntoResponse {
    let metars = match load_day(&pool, &config, &input) {
        Ok(metars) => metars,
        Err(source) => return HandlerError::LoadDay { source }.into_response(),
    };

    let csv = match write_metars_csv(&metars) {
        Ok(csv) => csv,
        Err(source) => return HandlerError::WriteCsv { source }.into_response(),
    };

    let file_name = format!("{}_{}.csv", input.station(), input.search_date.format("%Y%m%d"));

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/csv; charset=utf-8")
        .header(header::CONTENT_DISPOSITION, format!("attachment; filename=\"{file_name}\""))
        .body(Body::from(csv))
        .map_err(|err| (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()))
        .into_response()
}

#[derive(Debug, Error)]
pub enum WriteMetarsCsvError {
    #[error("WriteRecord: {source}")]
    WriteRecord {
        #[from]
        source: csv::Error,
    },
    #[error("FlushWriter: {source}")]
    FlushWriter {
        #[from]
        source: csv::IntoInnerError<csv::Writer<Vec<u8>>>,
    },
}

/// Header row first, so an empty day still yields a valid file.
pub fn write_metars_csv(metars: &[Metar]) -> Result<Vec<u8>, WriteMetarsCsvError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    writer.write_record(CSV_HEADER)?;
    for metar in metars {
        writer.serialize(metar)?;
    }

    Ok(writer.into_inner()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    #[test]
    fn writes_header_and_rows() {
        let metar = Metar {
            id: 7,
            raw_text: "RJTT 140030Z 34008KT 9999 FEW030 BKN045 18/12 Q1018".to_owned(),
            station_id: "RJTT".to_owned(),
            observation_time: NaiveDate::from_ymd_opt(2026, 10, 14)
                .unwrap()
                .and_hms_opt(0, 30, 0)
                .unwrap(),
            temp_c: 18.0,
            dewpoint_c: 12.0,
            wind_dir_degrees: 340,
            wind_speed_kt: 8,
            wind_gust_kt: None,
            visibility_m: 9999,
            altim_in_hg: 30.06,
            wx_string: None,
            cloud_ceiling: Some(4500),
            vert_vis_ft: None,
            metar_type: "METAR".to_owned(),
        };

        let csv = String::from_utf8(write_metars_csv(&[metar]).unwrap()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], CSV_HEADER.join(","));
        assert_eq!(
            lines[1],
            concat!(
                "7,RJTT 140030Z 34008KT 9999 FEW030 BKN045 18/12 Q1018,RJTT,",
                "2026-10-14T00:30:00,18.0,12.0,340,8,,9999,30.06,,4500,,METAR",
            )
        );
    }

    #[test]
    fn empty_day_has_only_header() {
        let csv = String::from_utf8(write_metars_csv(&[]).unwrap()).unwrap();

        assert_eq!(csv.lines().count(), 1);
    }
}
