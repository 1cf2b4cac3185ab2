//! METAR query and ingestion service
//!
//! - REST API endpoints in `endpoints/`
//! - SQLite models and queries in `db/`
//! - Fetch, parse and dedup of the dataserver feed in `ingest/`
//! - Settings come from the environment, see `config::AppConfig`

pub mod config;
pub mod db;
pub mod endpoints;
pub mod ingest;
pub mod router;
