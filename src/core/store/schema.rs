// Hand-written to match migrations/state — no database lives locally
// during this exercise to run `diesel print-schema` against.

diesel::table! {
    processed_filings (accession_number) {
        accession_number -> Text,
        ticker -> Text,
        filing_date -> Text,
        processed_at -> Text,
    }
}

diesel::table! {
    scheduler_events (id) {
        id -> Integer,
        event_type -> Text,
        job_id -> Text,
        scheduled_run_time -> Nullable<Text>,
        exception -> Nullable<Text>,
        traceback -> Nullable<Text>,
        created_at -> Text,
    }
}

diesel::allow_tables_to_appear_in_same_query!(processed_filings, scheduler_events);
