use reqwest::{Client, StatusCode};
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://aviationweather.gov/api/data/dataserver";

pub struct AviationWeatherXmlResult {
    pub body: String,
    pub status: StatusCode,
}

/// Query pairs understood by the dataserver for a METAR retrieval.
pub fn metar_query_params(
    stations: &[String],
    hours_before_now: u32,
) -> Vec<(&'static str, String)> {
    vec![
        ("dataSource", "metars".to_owned()),
        ("requestType", "retrieve".to_owned()),
        ("format", "xml".to_owned()),
        ("stationString", stations.join(",")),
        ("hoursBeforeNow", hours_before_now.to_string()),
    ]
}

pub async fn fetch_metars(
    base_url: &str,
    stations: &[String],
    hours_before_now: u32,
) -> Result<AviationWeatherXmlResult, FetchMetarsError> {
    let client = Client::new();

    debug!(base_url, stations = %stations.join(","), hours_before_now, "requesting METARs");

    let response = client
        .get(base_url)
        .header("User-Agent", "metar-server")
        .query(&metar_query_params(stations, hours_before_now))
        .send()
        .await
        .map_err(|source| FetchMetarsError::RequestSend { source })?;

    let status = response.status();

    let body = response
        .text()
        .await
        .map_err(|source| FetchMetarsError::ResponseRead { source })?;

    Ok(AviationWeatherXmlResult { body, status })
}

#[derive(Debug, Error)]
pub enum FetchMetarsError {
    #[error("RequestSend: {source}")]
    RequestSend {
        source: reqwest::Error,
    },

    #[error("ResponseRead: {source}")]
    ResponseRead {
        source: reqwest::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_params_join_stations() {
        let stations = vec!["RJTT".to_owned(), "RJAA".to_owned()];
        let params = metar_query_params(&stations, 25);

        assert!(params.contains(&("stationString", "RJTT,RJAA".to_owned())));
        assert!(params.contains(&("hoursBeforeNow", "25".to_owned())));
        assert!(params.contains(&("dataSource", "metars".to_owned())));
        assert!(params.contains(&("format", "xml".to_owned())));
    }

    #[tokio::test]
    async fn unreachable_host_is_a_send_error() {
        let stations = vec!["RJTT".to_owned()];
        let result = fetch_metars("http://127.0.0.1:1/dataserver", &stations, 1).await;

        assert!(matches!(result, Err(FetchMetarsError::RequestSend { .. })));
    }
}
