// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! RWGPS trip model as returned by the API and stored in the local cache.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;

use crate::time_utils::parse_departed_at;

/// Title used when a ride has no name.
pub const UNTITLED_RIDE: &str = "Untitled ride";

/// A single recorded ride (RWGPS "trip").
///
/// Numeric fields are parsed leniently: numbers and numeric strings are
/// accepted, anything else becomes `None`. Fields the tracker does not use are
/// kept in `extra` so the cache round-trips the API payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ride {
    /// RWGPS trip ID
    #[serde(
        default,
        deserialize_with = "lenient_u64",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<u64>,
    /// Distance in meters
    #[serde(
        default,
        deserialize_with = "lenient_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub distance: Option<f64>,
    /// Departure time (ISO 8601, optionally with `Z` or `±HH:MM`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub departed_at: Option<String>,
    /// Elevation gain in meters
    #[serde(
        default,
        deserialize_with = "lenient_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub elevation_gain: Option<f64>,
    /// Older payloads report gain as `elevation`
    #[serde(
        default,
        deserialize_with = "lenient_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub elevation: Option<f64>,
    /// Moving time in seconds
    #[serde(
        default,
        deserialize_with = "lenient_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub moving_time: Option<f64>,
    /// Elapsed duration in seconds, used when moving time is absent
    #[serde(
        default,
        deserialize_with = "lenient_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub duration: Option<f64>,
    /// Ride title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Ride {
    /// Parsed departure time, `None` when missing or malformed.
    pub fn departed_on(&self) -> Option<NaiveDateTime> {
        self.departed_at.as_deref().and_then(parse_departed_at)
    }

    /// Distance in meters as a decimal, `None` when missing.
    pub fn distance_meters(&self) -> Option<Decimal> {
        self.distance.and_then(decimal_from_f64)
    }

    /// Elevation gain in meters; a zero `elevation_gain` falls back to
    /// `elevation`, and a ride with neither contributes zero.
    pub fn elevation_gain_meters(&self) -> Decimal {
        first_nonzero(&[self.elevation_gain, self.elevation])
    }

    /// Moving time in seconds, falling back to `duration`.
    pub fn moving_time_seconds(&self) -> Decimal {
        first_nonzero(&[self.moving_time, self.duration])
    }

    /// Display title.
    pub fn title(&self) -> &str {
        match self.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name,
            _ => UNTITLED_RIDE,
        }
    }
}

/// Convert an API float into a decimal via its shortest round-trip text form.
///
/// `10000.0` becomes exactly `10000`, not the binary expansion of the float.
pub fn decimal_from_f64(value: f64) -> Option<Decimal> {
    if !value.is_finite() {
        return None;
    }
    Decimal::from_str(&value.to_string()).ok()
}

fn first_nonzero(candidates: &[Option<f64>]) -> Decimal {
    candidates
        .iter()
        .flatten()
        .filter_map(|v| decimal_from_f64(*v))
        .find(|v| !v.is_zero())
        .unwrap_or(Decimal::ZERO)
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|v| v.is_finite()))
}

fn lenient_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_u64(),
        Some(serde_json::Value::String(s)) => s.trim().parse::<u64>().ok(),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_deserialize_full_payload() {
        let ride: Ride = serde_json::from_value(json!({
            "id": 12345,
            "distance": 42195.5,
            "departed_at": "2025-04-01T08:00:00-07:00",
            "elevation_gain": 350.0,
            "moving_time": 5400,
            "name": "Morning loop",
            "is_stationary": false
        }))
        .unwrap();

        assert_eq!(ride.id, Some(12345));
        assert_eq!(ride.distance_meters(), Some(dec!(42195.5)));
        assert_eq!(ride.elevation_gain_meters(), dec!(350));
        assert_eq!(ride.moving_time_seconds(), dec!(5400));
        assert_eq!(ride.title(), "Morning loop");
        assert_eq!(ride.extra.get("is_stationary"), Some(&json!(false)));
        assert!(ride.departed_on().is_some());
    }

    #[test]
    fn test_deserialize_lenient_numbers() {
        let ride: Ride = serde_json::from_value(json!({
            "id": "77",
            "distance": "1000",
            "elevation": "abc",
            "duration": null
        }))
        .unwrap();

        assert_eq!(ride.id, Some(77));
        assert_eq!(ride.distance, Some(1000.0));
        assert_eq!(ride.elevation_gain_meters(), Decimal::ZERO);
        assert_eq!(ride.moving_time_seconds(), Decimal::ZERO);
        assert_eq!(ride.title(), UNTITLED_RIDE);
        assert_eq!(ride.departed_on(), None);
    }

    #[test]
    fn test_zero_elevation_gain_falls_back_to_elevation() {
        let ride = Ride {
            elevation_gain: Some(0.0),
            elevation: Some(120.0),
            moving_time: None,
            duration: Some(600.0),
            ..Default::default()
        };
        assert_eq!(ride.elevation_gain_meters(), dec!(120));
        assert_eq!(ride.moving_time_seconds(), dec!(600));
    }

    #[test]
    fn test_round_trip_keeps_unknown_fields() {
        let payload = json!({
            "id": 1,
            "distance": 1500.25,
            "departed_at": "2025-01-01T00:00:00Z",
            "name": "Commute",
            "track_id": 9981
        });
        let ride: Ride = serde_json::from_value(payload.clone()).unwrap();
        assert_eq!(serde_json::to_value(&ride).unwrap(), payload);
    }

    #[test]
    fn test_decimal_from_f64_uses_shortest_repr() {
        assert_eq!(decimal_from_f64(10000.0), Some(dec!(10000)));
        assert_eq!(decimal_from_f64(0.1), Some(dec!(0.1)));
        assert_eq!(decimal_from_f64(f64::NAN), None);
    }
}
