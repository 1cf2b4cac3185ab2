use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::Serialize;

use crate::db::schema::metars;

#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = metars)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Metar {
    pub id: i32,
    pub raw_text: String,
    pub station_id: String,
    pub observation_time: NaiveDateTime,
    pub temp_c: f64,
    pub dewpoint_c: f64,
    pub wind_dir_degrees: i32,
    pub wind_speed_kt: i32,
    pub wind_gust_kt: Option<i32>,
    pub visibility_m: i32,
    pub altim_in_hg: f64,
    pub wx_string: Option<String>,
    pub cloud_ceiling: Option<i32>,
    pub vert_vis_ft: Option<i32>,
    pub metar_type: String,
}

/// A parsed observation that has not been stored yet.
/// `observation_time` is always UTC.
#[derive(Debug, Clone, PartialEq, Insertable)]
#[diesel(table_name = metars)]
#[diesel(treat_none_as_default_value = false)]
pub struct NewMetar {
    pub raw_text: String,
    pub station_id: String,
    pub observation_time: NaiveDateTime,
    pub temp_c: f64,
    pub dewpoint_c: f64,
    pub wind_dir_degrees: i32,
    pub wind_speed_kt: i32,
    pub wind_gust_kt: Option<i32>,
    pub visibility_m: i32,
    pub altim_in_hg: f64,
    pub wx_string: Option<String>,
    pub cloud_ceiling: Option<i32>,
    pub vert_vis_ft: Option<i32>,
    pub metar_type: String,
}

impl NewMetar {
    pub fn observation_key(&self) -> (String, NaiveDateTime) {
        (self.station_id.clone(), self.observation_time)
    }
}
