//! City local-time utility route.
//!
//! A pure lookup over a fixed city → IANA zone table; not part of the relay
//! core. Matching is a case-insensitive exact match on the city name.

use {
    axum::{
        Json,
        extract::Query,
        http::StatusCode,
        response::{IntoResponse, Response},
    },
    chrono::Utc,
    chrono_tz::Tz,
    serde::Deserialize,
};

const CITY_ZONES: &[(&str, Tz)] = &[
    ("new york", chrono_tz::America::New_York),
    ("nyc", chrono_tz::America::New_York),
    ("san francisco", chrono_tz::America::Los_Angeles),
    ("sf", chrono_tz::America::Los_Angeles),
    ("los angeles", chrono_tz::America::Los_Angeles),
    ("london", chrono_tz::Europe::London),
    ("paris", chrono_tz::Europe::Paris),
    ("berlin", chrono_tz::Europe::Berlin),
    ("tokyo", chrono_tz::Asia::Tokyo),
    ("delhi", chrono_tz::Asia::Kolkata),
    ("mumbai", chrono_tz::Asia::Kolkata),
    ("sydney", chrono_tz::Australia::Sydney),
];

/// Current local time for a known city, e.g. `"Thu 02:15 PM"`.
pub fn local_time_for(city: &str) -> Option<String> {
    let needle = city.trim().to_lowercase();
    let (_, tz) = CITY_ZONES.iter().find(|(name, _)| *name == needle)?;
    Some(Utc::now().with_timezone(tz).format("%a %I:%M %p").to_string())
}

#[derive(Deserialize)]
pub struct TimeQuery {
    #[serde(default)]
    city: String,
}

pub async fn time_handler(Query(query): Query<TimeQuery>) -> Response {
    match local_time_for(&query.city) {
        Some(time) => Json(serde_json::json!({
            "ok": true,
            "city": query.city,
            "time": time,
        }))
        .into_response(),
        None => (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({
                "ok": false,
                "error": "Unknown city. Try: New York, SF, London, Tokyo, Delhi, Sydney.",
            })),
        )
            .into_response(),
    }
}
