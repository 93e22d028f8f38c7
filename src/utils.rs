// Utility functions
use chrono::{DateTime, SecondsFormat, Utc};

/// Rounds `value` to `places` decimal places (half away from zero).
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    let scaled = value * factor;
    if !scaled.is_finite() {
        // too large to carry a fractional part
        return value;
    }
    scaled.round() / factor
}

/// Parses an RFC 3339 string into `DateTime<Utc>`, if possible.
pub fn parse_datetime(date_str: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(date_str)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Fixed-width RFC 3339 so that text ordering in SQLite matches time ordering.
pub fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Accepts either a bare path or a `sqlite:///path` style URL.
pub fn sqlite_path_from_url(url: &str) -> &str {
    url.strip_prefix("sqlite:///")
        .or_else(|| url.strip_prefix("sqlite://"))
        .unwrap_or(url)
}
