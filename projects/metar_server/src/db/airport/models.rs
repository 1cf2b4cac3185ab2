use diesel::prelude::*;
use serde::Serialize;

use crate::db::schema::airports;

#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Identifiable, Insertable, Serialize)]
#[diesel(table_name = airports)]
#[diesel(primary_key(station_id))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Airport {
    pub station_id: String,
    /// Included in the scheduled fetch.
    pub is_fetched: bool,
}
