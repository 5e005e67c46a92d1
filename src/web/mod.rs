pub mod auth;
pub mod handlers;
pub mod models;
pub mod routes;

use chrono::{SecondsFormat, Utc};

// e.g. 2025-01-31T09:15:02.123456+00:00
pub fn utc_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, false)
}
