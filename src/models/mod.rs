use chrono::{DateTime as ChronoDateTime, SecondsFormat, Utc};
use mongodb::bson::DateTime;

pub mod admin;
pub mod booking;
pub mod dashboard;
pub mod review;
pub mod settings;
pub mod statistics;
pub mod tour;
pub mod user;

pub fn to_chrono(value: DateTime) -> ChronoDateTime<Utc> {
    ChronoDateTime::<Utc>::from_timestamp_millis(value.timestamp_millis()).unwrap_or_default()
}

pub fn from_chrono(value: ChronoDateTime<Utc>) -> DateTime {
    DateTime::from_millis(value.timestamp_millis())
}

pub fn to_rfc3339(value: DateTime) -> String {
    to_chrono(value).to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// `YYYY-MM-DD`
pub fn format_date(value: DateTime) -> String {
    to_chrono(value).format("%Y-%m-%d").to_string()
}

/// `DD/MM/YYYY`, the way the console shows booking and review dates.
pub fn format_display_date(value: DateTime) -> String {
    to_chrono(value).format("%d/%m/%Y").to_string()
}
