//! Diesel row types for `core::store`.

use diesel::prelude::*;

use super::schema::{processed_filings, scheduler_events};

#[derive(Queryable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = processed_filings)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ProcessedFilingRow {
    pub accession_number: String,
    pub ticker: String,
    pub filing_date: String,
    pub processed_at: String,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = scheduler_events)]
pub struct NewSchedulerEventRow<'a> {
    pub event_type: &'a str,
    pub job_id: &'a str,
    pub scheduled_run_time: Option<String>,
    pub exception: Option<&'a str>,
    pub traceback: Option<&'a str>,
}
