//! Process-wide tracing subscriber for the METAR binaries.

use std::str::FromStr;

use thiserror::Error;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Compact,
    Pretty,
}

impl FromStr for LogFormat {
    type Err = TracingInitError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(LogFormat::Compact),
            "pretty" => Ok(LogFormat::Pretty),
            other => Err(TracingInitError::UnknownFormat { format: other.to_owned() }),
        }
    }
}

/// Builds the filter: `RUST_LOG` wins over the configured `level`.
pub fn env_filter(level: &str) -> Result<EnvFilter, TracingInitError> {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .map_err(|source| TracingInitError::InvalidFilter { source })
}

pub fn init(level: &str, format: LogFormat) -> Result<(), TracingInitError> {
    let filter = env_filter(level)?;
    let registry = tracing_subscriber::registry().with(filter);

    let installed = match format {
        LogFormat::Compact => tracing::subscriber::set_global_default(
            registry.with(fmt::layer().compact().with_target(false)),
        ),
        LogFormat::Pretty => {
            tracing::subscriber::set_global_default(registry.with(fmt::layer().pretty()))
        }
    };

    installed.map_err(|source| TracingInitError::SetGlobalDefault { source })
}

#[derive(Debug, Error)]
pub enum TracingInitError {
    #[error("Invalid filter config: {source}")]
    InvalidFilter {
        #[from]
        source: tracing_subscriber::filter::ParseError,
    },

    #[error("Unknown log format: {format}")]
    UnknownFormat { format: String },

    #[error("Failed to set global default subscriber")]
    SetGlobalDefault {
        #[from]
        source: tracing::subscriber::SetGlobalDefaultError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_log_format() {
        assert_eq!("compact".parse::<LogFormat>().unwrap(), LogFormat::Compact);
        assert_eq!(" Pretty ".parse::<LogFormat>().unwrap(), LogFormat::Pretty);
        assert!(matches!(
            "json".parse::<LogFormat>(),
            Err(TracingInitError::UnknownFormat { .. })
        ));
    }

    #[test]
    fn rejects_invalid_level_directive() {
        if std::env::var_os("RUST_LOG").is_none() {
            assert!(env_filter("ingest=loudest").is_err());
        }
    }
}
