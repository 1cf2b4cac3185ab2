// Kept in sync by hand with `db::migrations::SCHEMA`.

diesel::table! {
    metars (id) {
        id -> Integer,
        raw_text -> Text,
        station_id -> Text,
        observation_time -> Timestamp,
        temp_c -> Double,
        dewpoint_c -> Double,
        wind_dir_degrees -> Integer,
        wind_speed_kt -> Integer,
        wind_gust_kt -> Nullable<Integer>,
        visibility_m -> Integer,
        altim_in_hg -> Double,
        wx_string -> Nullable<Text>,
        cloud_ceiling -> Nullable<Integer>,
        vert_vis_ft -> Nullable<Integer>,
        metar_type -> Text,
    }
}

diesel::table! {
    airports (station_id) {
        station_id -> Text,
        is_fetched -> Bool,
    }
}

diesel::allow_tables_to_appear_in_same_query!(
    airports,
    metars,
);
