// Mirrors the tables created in `Database::init_schema`.

diesel::table! {
    runs (id) {
        id -> Integer,
        account -> Text,
        analyzed_at -> Text,
        requested_count -> Integer,
        post_count -> Integer,
    }
}

diesel::table! {
    post_records (id) {
        id -> Integer,
        run_id -> Integer,
        position -> Integer,
        post_id -> BigInt,
        text -> Text,
        text_length -> Integer,
        created_at -> Text,
        source -> Text,
        like_count -> BigInt,
        retweet_count -> BigInt,
        sentiment -> Integer,
    }
}

diesel::joinable!(post_records -> runs (run_id));
diesel::allow_tables_to_appear_in_same_query!(runs, post_records);
