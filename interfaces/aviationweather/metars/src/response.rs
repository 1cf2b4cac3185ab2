use quick_xml::events::Event;
use quick_xml::Reader;
use serde::Deserialize;
use thiserror::Error;

/// Root `<response>` element of a dataserver reply.
#[derive(Debug, Default, Deserialize)]
pub struct MetarResponse {
    #[serde(default)]
    pub errors: ServiceErrors,
    #[serde(default)]
    pub warnings: ServiceWarnings,
    #[serde(default)]
    pub data: MetarData,
}

#[derive(Debug, Default, Deserialize)]
pub struct ServiceErrors {
    #[serde(rename = "error", default)]
    pub messages: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ServiceWarnings {
    #[serde(rename = "warning", default)]
    pub messages: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MetarData {
    #[serde(rename = "@num_results", default)]
    pub num_results: Option<u32>,
    #[serde(rename = "METAR", default)]
    pub metars: Vec<MetarElement>,
}

/// One `<METAR>` element. Leaves stay as text so that a single odd value
/// can be reported against its field instead of failing the whole document.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct MetarElement {
    pub raw_text: Option<String>,
    pub station_id: Option<String>,
    pub observation_time: Option<String>,
    pub temp_c: Option<String>,
    pub dewpoint_c: Option<String>,
    pub wind_dir_degrees: Option<String>,
    pub wind_speed_kt: Option<String>,
    pub wind_gust_kt: Option<String>,
    pub visibility_statute_mi: Option<String>,
    pub altim_in_hg: Option<String>,
    pub wx_string: Option<String>,
    #[serde(default)]
    pub sky_condition: Vec<SkyCondition>,
    pub vert_vis_ft: Option<String>,
    pub flight_category: Option<String>,
    pub metar_type: Option<String>,
}

/// `<sky_condition sky_cover="BKN" cloud_base_ft_agl="1200"/>`
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
pub struct SkyCondition {
    #[serde(rename = "@sky_cover")]
    pub sky_cover: String,
    #[serde(rename = "@cloud_base_ft_agl", default)]
    pub cloud_base_ft_agl: Option<String>,
}

#[derive(Debug, Error)]
pub enum ParseResponseError {
    #[error("Document type declarations are not accepted")]
    DtdForbidden,

    #[error("ReadXml: {source}")]
    ReadXml {
        #[source]
        source: quick_xml::Error,
    },

    #[error("DeserializeResponse: {source}")]
    DeserializeResponse {
        #[source]
        source: quick_xml::de::DeError,
    },
}

pub fn parse_response(body: &str) -> Result<MetarResponse, ParseResponseError> {
    reject_doctype(body)?;

    quick_xml::de::from_str(body)
        .map_err(|source| ParseResponseError::DeserializeResponse { source })
}

// Only the prolog can carry a DOCTYPE, so scanning stops at the root element.
fn reject_doctype(body: &str) -> Result<(), ParseResponseError> {
    let mut reader = Reader::from_str(body);

    loop {
        match reader.read_event() {
            Ok(Event::DocType(_)) => return Err(ParseResponseError::DtdForbidden),
            Ok(Event::Start(_)) | Ok(Event::Empty(_)) | Ok(Event::Eof) => return Ok(()),
            Ok(_) => continue,
            Err(source) => return Err(ParseResponseError::ReadXml { source }),
        }
    }
}
