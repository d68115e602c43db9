// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time parsing and formatting.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, SecondsFormat, Utc};

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Parse a ride departure timestamp into a naive local date/time.
///
/// RWGPS sends `2024-01-15T10:30:00-08:00`, `2024-01-15T18:30:00Z` or a bare
/// naive timestamp. The offset is dropped, not applied: the wall-clock time
/// the ride started is what decides its day, month and year.
pub fn parse_departed_at(raw: &str) -> Option<NaiveDateTime> {
    let naive = strip_utc_offset(raw.trim());
    if naive.is_empty() {
        return None;
    }

    for format in NAIVE_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(naive, format) {
            return Some(parsed);
        }
    }

    NaiveDate::parse_from_str(naive, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

/// Remove a trailing `Z` or `±HH:MM` offset from an ISO-8601 timestamp.
fn strip_utc_offset(raw: &str) -> &str {
    let without_z = raw.strip_suffix('Z').unwrap_or(raw);

    // Only look for a sign after the date part so the date's own dashes survive.
    match without_z.get(10..) {
        Some(time_part) => match time_part.find(['+', '-']) {
            Some(idx) => &without_z[..10 + idx],
            None => without_z,
        },
        None => without_z,
    }
}

/// First and last day of the calendar year containing `date`.
pub fn calendar_year_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let year = date.year();
    // Jan 1 and Dec 31 exist for every year chrono can represent.
    let start = NaiveDate::from_ymd_opt(year, 1, 1).unwrap_or(date);
    let end = NaiveDate::from_ymd_opt(year, 12, 31).unwrap_or(date);
    (start, end)
}

/// "YYYY-MM" key used for monthly grouping.
pub fn month_key(date: &NaiveDateTime) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd_hms(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    #[test]
    fn test_parse_z_suffix() {
        assert_eq!(
            parse_departed_at("2025-01-01T07:15:00Z"),
            Some(ymd_hms(2025, 1, 1, 7, 15, 0))
        );
    }

    #[test]
    fn test_parse_positive_and_negative_offsets() {
        assert_eq!(
            parse_departed_at("2024-06-30T23:59:59+02:00"),
            Some(ymd_hms(2024, 6, 30, 23, 59, 59))
        );
        // Offset is dropped, so a late-evening ride stays on its local day.
        assert_eq!(
            parse_departed_at("2024-12-31T22:00:00-08:00"),
            Some(ymd_hms(2024, 12, 31, 22, 0, 0))
        );
    }

    #[test]
    fn test_parse_fractional_seconds_and_date_only() {
        assert_eq!(
            parse_departed_at("2025-03-04T05:06:07.891"),
            NaiveDate::from_ymd_opt(2025, 3, 4)
                .unwrap()
                .and_hms_milli_opt(5, 6, 7, 891)
        );
        assert_eq!(
            parse_departed_at("2025-03-04"),
            Some(ymd_hms(2025, 3, 4, 0, 0, 0))
        );
    }

    #[test]
    fn test_parse_malformed() {
        assert_eq!(parse_departed_at(""), None);
        assert_eq!(parse_departed_at("yesterday"), None);
        assert_eq!(parse_departed_at("2025-13-01T00:00:00Z"), None);
    }

    #[test]
    fn test_month_key_and_year_bounds() {
        let date = ymd_hms(2024, 2, 29, 12, 0, 0);
        assert_eq!(month_key(&date), "2024-02");

        let (start, end) = calendar_year_bounds(date.date());
        assert_eq!(start, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2024, 12, 31).unwrap());
    }
}
