// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Unit conversion for distances (km/miles) and elevation (m/ft).
//!
//! All factors are exact decimals so that summing thousands of rides does not
//! drift the way repeated binary floating point multiplication would.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const METERS_TO_KM: Decimal = dec!(0.001);
pub const METERS_TO_MILES: Decimal = dec!(0.000621371192237334);
pub const KM_TO_MILES: Decimal = dec!(0.621371192237334);
pub const MILES_TO_KM: Decimal = dec!(1.609344);
pub const METERS_TO_FEET: Decimal = dec!(3.280839895013123);
pub const FEET_TO_METERS: Decimal = dec!(0.3048);

/// Unit used for ride distances and distance goals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DistanceUnit {
    #[serde(rename = "km")]
    Kilometers,
    #[serde(rename = "miles")]
    Miles,
}

/// Unit used for elevation gain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElevationUnit {
    #[serde(rename = "m")]
    Meters,
    #[serde(rename = "ft")]
    Feet,
}

/// Unit string that is not part of a supported family.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid unit: {0}")]
pub struct UnitError(pub String);

impl DistanceUnit {
    pub fn as_str(self) -> &'static str {
        match self {
            DistanceUnit::Kilometers => "km",
            DistanceUnit::Miles => "miles",
        }
    }

    /// The other distance unit (used by `unit toggle`).
    pub fn toggled(self) -> Self {
        match self {
            DistanceUnit::Kilometers => DistanceUnit::Miles,
            DistanceUnit::Miles => DistanceUnit::Kilometers,
        }
    }

    /// Elevation unit that pairs with this distance unit for display.
    pub fn elevation_unit(self) -> ElevationUnit {
        match self {
            DistanceUnit::Kilometers => ElevationUnit::Meters,
            DistanceUnit::Miles => ElevationUnit::Feet,
        }
    }
}

impl ElevationUnit {
    pub fn as_str(self) -> &'static str {
        match self {
            ElevationUnit::Meters => "m",
            ElevationUnit::Feet => "ft",
        }
    }
}

impl fmt::Display for DistanceUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for ElevationUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DistanceUnit {
    type Err = UnitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "km" => Ok(DistanceUnit::Kilometers),
            "miles" => Ok(DistanceUnit::Miles),
            other => Err(UnitError(other.to_string())),
        }
    }
}

impl FromStr for ElevationUnit {
    type Err = UnitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "m" => Ok(ElevationUnit::Meters),
            "ft" => Ok(ElevationUnit::Feet),
            other => Err(UnitError(other.to_string())),
        }
    }
}

/// Convert a distance in meters into `unit`.
pub fn meters_to(unit: DistanceUnit, meters: Decimal) -> Decimal {
    match unit {
        DistanceUnit::Kilometers => meters * METERS_TO_KM,
        DistanceUnit::Miles => meters * METERS_TO_MILES,
    }
}

/// Convert an elevation in meters into `unit`.
pub fn meters_to_elevation(unit: ElevationUnit, meters: Decimal) -> Decimal {
    match unit {
        ElevationUnit::Meters => meters,
        ElevationUnit::Feet => meters * METERS_TO_FEET,
    }
}

/// Convert `value` between two unit strings of the same family.
///
/// Identical units return `value` untouched. Pairs outside km/miles and m/ft
/// (including an empty unit on an old goal) also return `value` untouched.
pub fn convert(value: Decimal, from: &str, to: &str) -> Decimal {
    if from == to {
        return value;
    }
    match (from, to) {
        ("km", "miles") => value * KM_TO_MILES,
        ("miles", "km") => value * MILES_TO_KM,
        ("m", "ft") => value * METERS_TO_FEET,
        ("ft", "m") => value * FEET_TO_METERS,
        _ => value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meters_to_distance_units() {
        assert_eq!(meters_to(DistanceUnit::Kilometers, dec!(15000)), dec!(15));
        assert_eq!(
            meters_to(DistanceUnit::Miles, dec!(15000)),
            dec!(9.32056788356001)
        );
    }

    #[test]
    fn test_meters_to_elevation_units() {
        assert_eq!(meters_to_elevation(ElevationUnit::Meters, dec!(200)), dec!(200));
        assert_eq!(
            meters_to_elevation(ElevationUnit::Feet, dec!(200)),
            dec!(656.1679790026246)
        );
    }

    #[test]
    fn test_convert_same_unit_is_identity() {
        let value = dec!(123.456789012345678901234567);
        assert_eq!(convert(value, "km", "km"), value);
        assert_eq!(convert(value, "ft", "ft"), value);
    }

    #[test]
    fn test_convert_unknown_pair_is_lenient() {
        assert_eq!(convert(dec!(42), "", "miles"), dec!(42));
        assert_eq!(convert(dec!(42), "km", "ft"), dec!(42));
        assert_eq!(convert(dec!(42), "furlongs", "km"), dec!(42));
    }

    #[test]
    fn test_km_miles_round_trip() {
        let original = dec!(1234.5678);
        let back = convert(convert(original, "km", "miles"), "miles", "km");
        assert!((back - original).abs() < dec!(0.000000001));
    }

    #[test]
    fn test_elevation_round_trip() {
        let original = dec!(8848);
        let back = convert(convert(original, "m", "ft"), "ft", "m");
        assert!((back - original).abs() < dec!(0.000000001));
    }

    #[test]
    fn test_unit_parsing() {
        assert_eq!("km".parse::<DistanceUnit>(), Ok(DistanceUnit::Kilometers));
        assert_eq!("miles".parse::<DistanceUnit>(), Ok(DistanceUnit::Miles));
        assert!("mi".parse::<DistanceUnit>().is_err());
        assert_eq!("ft".parse::<ElevationUnit>(), Ok(ElevationUnit::Feet));
        assert!("feet".parse::<ElevationUnit>().is_err());
    }

    #[test]
    fn test_elevation_unit_pairing_and_toggle() {
        assert_eq!(DistanceUnit::Miles.elevation_unit(), ElevationUnit::Feet);
        assert_eq!(DistanceUnit::Kilometers.elevation_unit(), ElevationUnit::Meters);
        assert_eq!(DistanceUnit::Miles.toggled(), DistanceUnit::Kilometers);
    }
}
