// Hand-written to match migrations/signals.

diesel::table! {
    entities (id) {
        id -> Integer,
        ticker -> Text,
        canonical_name -> Text,
        last_scraped_at -> Nullable<Text>,
    }
}

diesel::table! {
    scraped_signals (id) {
        id -> Integer,
        entity_id -> Integer,
        provider -> Text,
        signal_value -> Double,
        raw_payload -> Text,
        timestamp -> Text,
    }
}

diesel::joinable!(scraped_signals -> entities (entity_id));
diesel::allow_tables_to_appear_in_same_query!(entities, scraped_signals);
