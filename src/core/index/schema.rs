// Hand-written to match migrations/market_index. `market_fts` is an FTS5
// virtual table with no native Diesel macro support — it is queried with
// `diesel::sql_query` in `sqlite.rs` rather than declared here.

diesel::table! {
    market_metadata (event_id) {
        event_id -> Text,
        market_id -> Nullable<Text>,
        title -> Text,
        description -> Text,
        tags -> Text,
        slug -> Text,
        volume_usd -> Double,
        end_date -> Nullable<Text>,
    }
}

diesel::table! {
    macro_probabilities (id) {
        id -> Integer,
        event_id -> Text,
        event_title -> Text,
        category -> Nullable<Text>,
        sector -> Nullable<Text>,
        related_ticker -> Nullable<Text>,
        probability_yes -> Double,
        volume_usd -> Double,
        source -> Text,
        timestamp -> Text,
    }
}

diesel::allow_tables_to_appear_in_same_query!(market_metadata, macro_probabilities);
