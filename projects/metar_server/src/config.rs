use std::net::SocketAddr;

use chrono::FixedOffset;
use interfaces_aviationweather_metars::index::DEFAULT_BASE_URL;
use thiserror::Error;
use utils_trace::LogFormat;

use crate::ingest::DEFAULT_HOURS_BEFORE_NOW;

/// Runtime settings, read from the environment (and `.env` when present).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub awc_base_url: String,
    pub hours_before_now: u32,
    /// Offset of the local day used by the date queries.
    pub query_utc_offset: FixedOffset,
    pub log_level: String,
    pub log_format: LogFormat,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("LoadDotenv: {source}")]
    LoadDotenv {
        #[source]
        source: dotenvy::Error,
    },

    #[error("InvalidValue: {key}={value:?}: {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(_) => {}
            Err(err) if err.not_found() => {}
            Err(source) => return Err(ConfigError::LoadDotenv { source }),
        }

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key/value source; unset keys take defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_owned());

        let bind_addr = parse_value("BIND_ADDR", get("BIND_ADDR", "0.0.0.0:8000"))?;
        let hours_before_now = parse_value(
            "HOURS_BEFORE_NOW",
            get("HOURS_BEFORE_NOW", &DEFAULT_HOURS_BEFORE_NOW.to_string()),
        )?;

        let offset_text = get("QUERY_UTC_OFFSET_MINUTES", "0");
        let offset_minutes: i32 = parse_value("QUERY_UTC_OFFSET_MINUTES", offset_text.clone())?;
        let query_utc_offset = offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| ConfigError::InvalidValue {
                key: "QUERY_UTC_OFFSET_MINUTES",
                value: offset_text,
                reason: "offset must be within +/- 24 hours".to_owned(),
            })?;

        let log_format_text = get("LOG_FORMAT", "compact");
        let log_format = log_format_text
            .parse::<LogFormat>()
            .map_err(|err| ConfigError::InvalidValue {
                key: "LOG_FORMAT",
                value: log_format_text.clone(),
                reason: err.to_string(),
            })?;

        Ok(AppConfig {
            database_url: get("DATABASE_URL", "metar.sqlite3"),
            bind_addr,
            awc_base_url: get("AWC_BASE_URL", DEFAULT_BASE_URL),
            hours_before_now,
            query_utc_offset,
            log_level: get("LOG_LEVEL", "info"),
            log_format,
        })
    }
}

fn parse_value<T>(key: &'static str, value: String) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|err: T::Err| ConfigError::InvalidValue {
        key,
        reason: err.to_string(),
        value,
    })
}
