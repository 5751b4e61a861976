//! Diesel row types for `core::index`.

use diesel::prelude::*;
use diesel::sql_types::{Double, Nullable, Text};

use super::schema::{macro_probabilities, market_metadata};

#[derive(Queryable, Selectable, Insertable, AsChangeset, Debug, Clone)]
#[diesel(table_name = market_metadata)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct MarketMetadataRow {
    pub event_id: String,
    pub market_id: Option<String>,
    pub title: String,
    pub description: String,
    /// Comma-joined tags; the FTS shadow copy in `market_fts` is the
    /// queryable form.
    pub tags: String,
    pub slug: String,
    pub volume_usd: f64,
    pub end_date: Option<String>,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = macro_probabilities)]
pub struct NewSnapshotRow {
    pub event_id: String,
    pub event_title: String,
    pub category: Option<String>,
    pub sector: Option<String>,
    pub related_ticker: Option<String>,
    pub probability_yes: f64,
    pub volume_usd: f64,
    pub source: String,
    pub timestamp: String,
}

#[derive(Queryable, Debug, Clone)]
pub struct SnapshotRow {
    pub id: i32,
    pub event_id: String,
    pub event_title: String,
    pub category: Option<String>,
    pub sector: Option<String>,
    pub related_ticker: Option<String>,
    pub probability_yes: f64,
    pub volume_usd: f64,
    pub source: String,
    pub timestamp: String,
}

/// Row shape for the raw `GROUP BY event_id` latest-snapshot query in
/// `core::discovery::snapshot`.
#[derive(QueryableByName, Debug, Clone)]
pub struct LatestSnapshotRow {
    #[diesel(sql_type = Text)]
    pub event_id: String,
    #[diesel(sql_type = Text)]
    pub event_title: String,
    #[diesel(sql_type = Nullable<Text>)]
    pub category: Option<String>,
    #[diesel(sql_type = Nullable<Text>)]
    pub sector: Option<String>,
    #[diesel(sql_type = Nullable<Text>)]
    pub related_ticker: Option<String>,
    #[diesel(sql_type = Double)]
    pub probability_yes: f64,
    #[diesel(sql_type = Double)]
    pub volume_usd: f64,
    #[diesel(sql_type = Text)]
    pub source: String,
    #[diesel(sql_type = Text)]
    pub timestamp: String,
}

/// Row shape for the raw `market_fts MATCH` / `LIKE` fallback queries,
/// which diesel's `sql_query` requires a `QueryableByName` impl for.
#[derive(QueryableByName, Debug, Clone)]
pub struct MatchedMetadataRow {
    #[diesel(sql_type = Text)]
    pub event_id: String,
    #[diesel(sql_type = Nullable<Text>)]
    pub market_id: Option<String>,
    #[diesel(sql_type = Text)]
    pub title: String,
    #[diesel(sql_type = Text)]
    pub description: String,
    #[diesel(sql_type = Text)]
    pub tags: String,
    #[diesel(sql_type = Text)]
    pub slug: String,
    #[diesel(sql_type = Double)]
    pub volume_usd: f64,
    #[diesel(sql_type = Nullable<Text>)]
    pub end_date: Option<String>,
}
