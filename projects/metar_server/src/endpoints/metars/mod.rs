pub mod export_csv;
pub mod fetch;
pub mod newest;
pub mod query;

use chrono::{Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Deserialize;

use crate::db::metar::queries::MetarOrder;

/// Body shared by the date query and its CSV export.
#[derive(Debug, Clone, Deserialize)]
pub struct MetarsDayRequestBody {
    pub icao: String,
    pub search_date: NaiveDate,
    #[serde(default)]
    pub metar_order: MetarOrder,
}

impl MetarsDayRequestBody {
    pub fn station(&self) -> String {
        self.icao.trim().to_uppercase()
    }
}

/// UTC bounds of `date` from 00:00 to 23:59 in the local day of `offset`.
pub fn observation_day_range(
    date: NaiveDate,
    offset: FixedOffset,
) -> (NaiveDateTime, NaiveDateTime) {
    let local_midnight = date.and_time(NaiveTime::MIN);
    let start = local_midnight - Duration::seconds(i64::from(offset.local_minus_utc()));
    let end = start + Duration::hours(23) + Duration::minutes(59);
    (start, end)
}
