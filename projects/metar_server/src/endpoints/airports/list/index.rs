use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use thiserror::Error;

use crate::db::{airport::{models::Airport, queries::get_airports}, DbPool};

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("GetConnectionFromPool: {source}")]
    GetConnectionFromPool {
        #[from]
        source: r2d2::Error,
    },
    #[error(transparent)]
    GetAirports {
        #[from]
        source: crate::db::airport::queries::GetAirportsError,
    },
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> axum::response::Response {
        (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()).into_response()
    }
}

/// Axum handler: GET /airports
pub async fn handler(
    Extension(pool): Extension<DbPool>,
) -> Result<Json<Vec<Airport>>, HandlerError> {
    let mut conn = pool.get()?;

    Ok(Json(get_airports(&mut conn)?))
}
