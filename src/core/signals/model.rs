//! Diesel row types for `core::signals`.

use diesel::prelude::*;

use super::schema::{entities, scraped_signals};

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = entities)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct EntityRow {
    pub id: i32,
    pub ticker: String,
    pub canonical_name: String,
    pub last_scraped_at: Option<String>,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = entities)]
pub struct NewEntityRow<'a> {
    pub ticker: &'a str,
    pub canonical_name: &'a str,
    pub last_scraped_at: Option<String>,
}

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = scraped_signals)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct SignalRow {
    pub id: i32,
    pub entity_id: i32,
    pub provider: String,
    pub signal_value: f64,
    pub raw_payload: String,
    pub timestamp: String,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = scraped_signals)]
pub struct NewSignalRow {
    pub entity_id: i32,
    pub provider: String,
    pub signal_value: f64,
    pub raw_payload: String,
    pub timestamp: String,
}
