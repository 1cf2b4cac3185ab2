use std::fmt::Display;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use interfaces_aviationweather_metars::response::{MetarElement, SkyCondition};
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::db::metar::models::NewMetar;

/// Visibility recorded for CAVOK reports ("10 km or more").
pub const CAVOK_VISIBILITY_M: i32 = 9999;

// Prevailing visibility follows the wind group, after an optional
// variable-direction group such as `300V020`.
static VISIBILITY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"KT ([0-9]{3}V[0-9]{3} )?(?P<vis>[0-9]{4})").expect("valid visibility regex")
});
static CAVOK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"KT ([0-9]{3}V[0-9]{3} )?CAVOK").expect("valid CAVOK regex"));

const BROKEN_COVER: &str = "BKN";

#[derive(Debug, Error)]
pub enum ParseMetarError {
    #[error("MissingField: {field} (station {station})")]
    MissingField { field: &'static str, station: String },

    #[error("InvalidNumber: {field} = {value:?} (station {station}): {reason}")]
    InvalidNumber {
        field: &'static str,
        value: String,
        station: String,
        reason: String,
    },

    #[error("InvalidObservationTime: {value:?} (station {station}): {source}")]
    InvalidObservationTime {
        value: String,
        station: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("VisibilityNotFound: visibility is not found in raw text: {raw_text}")]
    VisibilityNotFound { raw_text: String },
}

/// Converts one `<METAR>` element into a record ready for insertion.
pub fn parse_metar(element: &MetarElement) -> Result<NewMetar, ParseMetarError> {
    let station = non_blank(&element.station_id).unwrap_or("?").to_owned();
    let fields = Fields { station: &station };

    let raw_text = fields.required("raw_text", &element.raw_text)?.to_owned();
    let station_id = fields.required("station_id", &element.station_id)?.to_owned();

    let observation_time_text = fields.required("observation_time", &element.observation_time)?;
    let observation_time = DateTime::parse_from_rfc3339(observation_time_text)
        .map_err(|source| ParseMetarError::InvalidObservationTime {
            value: observation_time_text.to_owned(),
            station: station.clone(),
            source,
        })?
        .with_timezone(&Utc)
        .naive_utc();

    Ok(NewMetar {
        visibility_m: visibility_from_raw_text(&raw_text)?,
        temp_c: fields.required_number("temp_c", &element.temp_c)?,
        dewpoint_c: fields.required_number("dewpoint_c", &element.dewpoint_c)?,
        wind_dir_degrees: fields.required_number("wind_dir_degrees", &element.wind_dir_degrees)?,
        wind_speed_kt: fields.required_number("wind_speed_kt", &element.wind_speed_kt)?,
        wind_gust_kt: fields.optional_number("wind_gust_kt", &element.wind_gust_kt)?,
        altim_in_hg: fields.required_number("altim_in_hg", &element.altim_in_hg)?,
        wx_string: non_blank(&element.wx_string).map(str::to_owned),
        cloud_ceiling: fields.cloud_ceiling(&element.sky_condition)?,
        vert_vis_ft: fields.optional_number("vert_vis_ft", &element.vert_vis_ft)?,
        metar_type: fields.required("metar_type", &element.metar_type)?.to_owned(),
        raw_text,
        station_id,
        observation_time,
    })
}

/// Prevailing visibility in metres, read from the raw report.
pub fn visibility_from_raw_text(raw_text: &str) -> Result<i32, ParseMetarError> {
    if let Some(captures) = VISIBILITY_RE.captures(raw_text) {
        // Four ASCII digits always fit in an i32.
        return captures["vis"]
            .parse()
            .map_err(|_| ParseMetarError::VisibilityNotFound { raw_text: raw_text.to_owned() });
    }

    if CAVOK_RE.is_match(raw_text) {
        return Ok(CAVOK_VISIBILITY_M);
    }

    Err(ParseMetarError::VisibilityNotFound { raw_text: raw_text.to_owned() })
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|text| !text.is_empty())
}

struct Fields<'a> {
    station: &'a str,
}

impl Fields<'_> {
    fn required<'v>(
        &self,
        field: &'static str,
        value: &'v Option<String>,
    ) -> Result<&'v str, ParseMetarError> {
        non_blank(value).ok_or_else(|| ParseMetarError::MissingField {
            field,
            station: self.station.to_owned(),
        })
    }

    fn number<T>(&self, field: &'static str, text: &str) -> Result<T, ParseMetarError>
    where
        T: FromStr,
        T::Err: Display,
    {
        text.parse().map_err(|err: T::Err| ParseMetarError::InvalidNumber {
            field,
            value: text.to_owned(),
            station: self.station.to_owned(),
            reason: err.to_string(),
        })
    }

    fn required_number<T>(
        &self,
        field: &'static str,
        value: &Option<String>,
    ) -> Result<T, ParseMetarError>
    where
        T: FromStr,
        T::Err: Display,
    {
        self.number(field, self.required(field, value)?)
    }

    fn optional_number<T>(
        &self,
        field: &'static str,
        value: &Option<String>,
    ) -> Result<Option<T>, ParseMetarError>
    where
        T: FromStr,
        T::Err: Display,
    {
        non_blank(value).map(|text| self.number(field, text)).transpose()
    }

    /// Base of the first broken layer, in feet above ground level.
    fn cloud_ceiling(&self, sky: &[SkyCondition]) -> Result<Option<i32>, ParseMetarError> {
        match sky.iter().find(|layer| layer.sky_cover == BROKEN_COVER) {
            Some(layer) => self
                .required_number("cloud_base_ft_agl", &layer.cloud_base_ft_agl)
                .map(Some),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn text(value: &str) -> Option<String> {
        Some(value.to_owned())
    }

    fn element(raw_text: &str) -> MetarElement {
        MetarElement {
            raw_text: text(raw_text),
            station_id: text("RJTT"),
            observation_time: text("2026-10-14T00:30:00Z"),
            temp_c: text("18.0"),
            dewpoint_c: text("12.0"),
            wind_dir_degrees: text("340"),
            wind_speed_kt: text("8"),
            altim_in_hg: text("30.061024"),
            metar_type: text("METAR"),
            ..MetarElement::default()
        }
    }

    #[test]
    fn parses_required_fields() {
        let raw = element("RJTT 140030Z 34008KT 9999 FEW030 18/12 Q1018 NOSIG");
        let metar = parse_metar(&raw).unwrap();

        assert_eq!(metar.station_id, "RJTT");
        assert_eq!(
            metar.observation_time,
            NaiveDate::from_ymd_opt(2026, 10, 14).unwrap().and_hms_opt(0, 30, 0).unwrap()
        );
        assert_eq!(metar.temp_c, 18.0);
        assert_eq!(metar.dewpoint_c, 12.0);
        assert_eq!(metar.wind_dir_degrees, 340);
        assert_eq!(metar.wind_speed_kt, 8);
        assert_eq!(metar.altim_in_hg, 30.061024);
        assert_eq!(metar.visibility_m, 9999);
        assert_eq!(metar.metar_type, "METAR");
        assert_eq!(metar.wind_gust_kt, None);
        assert_eq!(metar.wx_string, None);
        assert_eq!(metar.cloud_ceiling, None);
        assert_eq!(metar.vert_vis_ft, None);
    }

    #[test]
    fn observation_time_is_stored_as_utc() {
        let mut raw = element("RJTT 140030Z 34008KT 9999 FEW030 18/12 Q1018");
        raw.observation_time = text("2026-10-14T09:30:00+09:00");

        let metar = parse_metar(&raw).unwrap();

        assert_eq!(
            metar.observation_time,
            NaiveDate::from_ymd_opt(2026, 10, 14).unwrap().and_hms_opt(0, 30, 0).unwrap()
        );
    }

    #[test]
    fn reads_optional_fields() {
        let mut raw = element("RJAA 140030Z 36012G22KT 0800 FG VV002 15/15 Q1017");
        raw.wind_gust_kt = text("22");
        raw.wx_string = text("FG");
        raw.vert_vis_ft = text("200");

        let metar = parse_metar(&raw).unwrap();

        assert_eq!(metar.wind_gust_kt, Some(22));
        assert_eq!(metar.wx_string.as_deref(), Some("FG"));
        assert_eq!(metar.vert_vis_ft, Some(200));
        assert_eq!(metar.visibility_m, 800);
    }

    #[test]
    fn ceiling_is_first_broken_layer() {
        let mut raw = element("RJTT 140030Z 34008KT 9999 FEW010 BKN025 BKN040 18/12 Q1018");
        raw.sky_condition = vec![
            SkyCondition { sky_cover: "FEW".to_owned(), cloud_base_ft_agl: text("1000") },
            SkyCondition { sky_cover: "BKN".to_owned(), cloud_base_ft_agl: text("2500") },
            SkyCondition { sky_cover: "BKN".to_owned(), cloud_base_ft_agl: text("4000") },
        ];

        assert_eq!(parse_metar(&raw).unwrap().cloud_ceiling, Some(2500));
    }

    #[test]
    fn overcast_alone_is_not_a_ceiling() {
        let mut raw = element("RJTT 140030Z 34008KT 9999 OVC008 18/12 Q1018");
        raw.sky_condition = vec![SkyCondition {
            sky_cover: "OVC".to_owned(),
            cloud_base_ft_agl: text("800"),
        }];

        assert_eq!(parse_metar(&raw).unwrap().cloud_ceiling, None);
    }

    #[test]
    fn visibility_after_variable_wind_group() {
        for (raw_text, visibility) in [
            ("RJTT 140030Z 34008KT 300V020 4000 BR", 4000),
            ("RJTT 140030Z 34008KT 300V020 CAVOK 18/12", 9999),
            ("RJTT 140030Z VRB02KT CAVOK 18/12", 9999),
        ] {
            assert_eq!(visibility_from_raw_text(raw_text).unwrap(), visibility, "{raw_text}");
        }
    }

    #[test]
    fn missing_visibility_is_an_error() {
        let err =
            visibility_from_raw_text("KJFK 140051Z 31008KT 10SM FEW250 18/07 A3012").unwrap_err();

        assert!(matches!(err, ParseMetarError::VisibilityNotFound { .. }));
        assert!(err.to_string().contains("KJFK 140051Z"));
    }

    #[test]
    fn missing_required_field_names_the_field() {
        let mut raw = element("RJTT 140030Z 34008KT 9999 FEW030 18/12 Q1018");
        raw.temp_c = None;

        match parse_metar(&raw) {
            Err(ParseMetarError::MissingField { field, station }) => {
                assert_eq!(field, "temp_c");
                assert_eq!(station, "RJTT");
            }
            other => panic!("expected MissingField, got {other:?}"),
        }
    }

    #[test]
    fn garbage_number_is_an_error() {
        let mut raw = element("RJTT 140030Z VRB02KT 9999 FEW030 18/12 Q1018");
        raw.wind_dir_degrees = text("VRB");

        assert!(matches!(
            parse_metar(&raw),
            Err(ParseMetarError::InvalidNumber { field: "wind_dir_degrees", .. })
        ));
    }

    #[test]
    fn bad_observation_time_is_an_error() {
        let mut raw = element("RJTT 140030Z 34008KT 9999 FEW030 18/12 Q1018");
        raw.observation_time = text("yesterday");

        assert!(matches!(
            parse_metar(&raw),
            Err(ParseMetarError::InvalidObservationTime { .. })
        ));
    }
}
