//! METAR ingestion: fetch the dataserver feed, parse, deduplicate, store.

pub mod dedup;
pub mod fetch_and_save;
pub mod parse;

pub use fetch_and_save::{
    fetch_and_save, save_response, FetchAndSaveError, IngestReport, SaveResponseError,
    SavedMetars, DEDUP_WINDOW_HOURS, DEFAULT_HOURS_BEFORE_NOW,
};
