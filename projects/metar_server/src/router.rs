use std::sync::Arc;

use axum::{
    routing::{get, post},
    Extension, Router,
};

use crate::config::AppConfig;
use crate::db::DbPool;
use crate::endpoints::{
    airports::{
        list::index::handler as airports_list_handler,
        upsert::index::handler as airports_upsert_handler,
    },
    metars::{
        export_csv::index::handler as metars_export_csv_handler,
        fetch::index::handler as metars_fetch_handler,
        newest::index::handler as metars_newest_handler,
        query::index::handler as metars_query_handler,
    },
};

pub fn router(pool: DbPool, config: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/metars/query", post(metars_query_handler))
        .route("/metars/export_csv", post(metars_export_csv_handler))
        .route("/metars/fetch", post(metars_fetch_handler))
        .route("/metars/newest", get(metars_newest_handler))
        .route("/airports", get(airports_list_handler))
        .route("/airports/upsert", post(airports_upsert_handler))
        .layer(Extension(pool))
        .layer(Extension(config))
}
