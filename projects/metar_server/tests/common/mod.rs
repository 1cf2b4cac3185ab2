#![allow(dead_code)]

use axum::{http::StatusCode, routing::get, Router};
use chrono::{Duration, NaiveDate, NaiveDateTime, SubsecRound, Utc};
use projects_metar_server::{
    config::AppConfig,
    db::{establish_pool, metar::models::NewMetar, migrations::run_migrations, DbPool},
};
use tempfile::TempDir;
use tokio::net::TcpListener;

/// Nothing listens on port 1, so requests to it fail fast.
pub const UNREACHABLE_BASE_URL: &str = "http://127.0.0.1:1/api/data/dataserver";

/// The directory must outlive the pool.
pub fn test_pool() -> (TempDir, DbPool) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("metar.sqlite3");
    let pool = establish_pool(path.to_str().expect("utf-8 temp path")).expect("build pool");

    let mut conn = pool.get().expect("get connection");
    run_migrations(&mut conn).expect("apply schema");

    (dir, pool)
}

pub const DATASERVER_PATH: &str = "/api/data/dataserver";

/// Starts a local dataserver that answers every request with `status` and
/// `body`, and returns its base URL.
pub async fn spawn_dataserver(status: StatusCode, body: String) -> String {
    let app = Router::new().route(
        DATASERVER_PATH,
        get(move || {
            let body = body.clone();
            async move { (status, body) }
        }),
    );

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind dataserver");
    let addr = listener.local_addr().expect("dataserver address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve dataserver");
    });

    format!("http://{addr}{DATASERVER_PATH}")
}

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::from_lookup(|_| None).expect("default config");
    config.awc_base_url = UNREACHABLE_BASE_URL.to_owned();
    config
}

pub fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 10, day)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap()
}

/// Whole seconds, as the dataserver writes observation times.
pub fn minutes_ago(minutes: i64) -> NaiveDateTime {
    (Utc::now() - Duration::minutes(minutes)).naive_utc().trunc_subsecs(0)
}

pub fn raw_text(station: &str, observed: NaiveDateTime) -> String {
    format!("{station} {} 34008KT 9999 FEW030 BKN045 18/12 Q1018", observed.format("%d%H%MZ"))
}

pub fn new_metar(station: &str, observed: NaiveDateTime) -> NewMetar {
    NewMetar {
        raw_text: format!(
            "{station} {} 34008KT 9999 FEW030 18/12 Q1018",
            observed.format("%d%H%MZ")
        ),
        station_id: station.to_owned(),
        observation_time: observed,
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

/// One `<METAR>` element as the dataserver writes it.
pub fn metar_element(station: &str, observed: NaiveDateTime, raw_text: &str) -> String {
    format!(
        r#"    <METAR>
      <raw_text>{raw_text}</raw_text>
      <station_id>{station}</station_id>
      <observation_time>{}</observation_time>
      <temp_c>18.0</temp_c>
      <dewpoint_c>12.0</dewpoint_c>
      <wind_dir_degrees>340</wind_dir_degrees>
      <wind_speed_kt>8</wind_speed_kt>
      <altim_in_hg>30.061024</altim_in_hg>
      <sky_condition sky_cover="FEW" cloud_base_ft_agl="3000" />
      <sky_condition sky_cover="BKN" cloud_base_ft_agl="4500" />
      <flight_category>VFR</flight_category>
      <metar_type>METAR</metar_type>
    </METAR>
"#,
        observed.format("%Y-%m-%dT%H:%M:%SZ")
    )
}

pub fn response_xml(elements: &[String]) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<response version="1.2">
  <request_index>1</request_index>
  <data_source name="metars" />
  <request type="retrieve" />
  <errors />
  <warnings />
  <time_taken_ms>4</time_taken_ms>
  <data num_results="{}">
{}  </data>
</response>"#,
        elements.len(),
        elements.concat()
    )
}
