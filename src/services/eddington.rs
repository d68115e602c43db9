// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Eddington number calculations.
//!
//! The Eddington number `E` of a set of rides is the largest `N` such that at
//! least `N` rides were at least `N` units long. Everything here is recomputed
//! from the distance list on every call.

use chrono::Datelike;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

use crate::models::ride::Ride;
use crate::models::stats::{DistanceBucket, EddingtonProgress, YearlyTarget};
use crate::services::units::{meters_to, DistanceUnit};

/// Lowest threshold reported by [`analyze_ride_distribution`].
pub const DISTRIBUTION_STEP: u32 = 20;
/// Highest threshold reported by [`analyze_ride_distribution`].
pub const DISTRIBUTION_MAX: u32 = 200;

/// Eddington number of `distances`; 0 for no rides.
pub fn calculate_eddington(distances: &[Decimal]) -> u32 {
    let mut sorted = distances.to_vec();
    sorted.sort_unstable_by(|a, b| b.cmp(a));

    let mut e = 0;
    for (i, distance) in sorted.iter().enumerate() {
        let n = Decimal::from(i + 1);
        if *distance >= n {
            e = i as u32 + 1;
        } else {
            break;
        }
    }
    e
}

/// Number of rides at least `threshold` long.
pub fn rides_at_or_above(distances: &[Decimal], threshold: u32) -> u32 {
    let threshold = Decimal::from(threshold);
    distances.iter().filter(|d| **d >= threshold).count() as u32
}

fn rides_short_of(distances: &[Decimal], target: u32) -> (u32, u32) {
    let at = rides_at_or_above(distances, target);
    (at, target.saturating_sub(at))
}

/// Additional rides of at least `E + 1` needed to reach `E + 1`.
pub fn calculate_rides_needed_next(distances: &[Decimal]) -> u32 {
    let e = calculate_eddington(distances);
    rides_short_of(distances, e + 1).1
}

/// Current `E` plus progress toward `E + 1` and `E + 2`.
pub fn calculate_overall_e_progress(distances: &[Decimal]) -> EddingtonProgress {
    let current = calculate_eddington(distances);
    let (rides_at_next, rides_needed_next) = rides_short_of(distances, current + 1);
    let (rides_at_next_next, rides_needed_next_next) = rides_short_of(distances, current + 2);

    EddingtonProgress {
        current,
        rides_at_next,
        rides_needed_next,
        rides_at_next_next,
        rides_needed_next_next,
    }
}

/// Rides grouped by departure year, as distances in `unit`.
///
/// Rides with a missing distance or an unparseable date are skipped.
pub fn distances_by_year(rides: &[Ride], unit: DistanceUnit) -> BTreeMap<i32, Vec<Decimal>> {
    let mut by_year: BTreeMap<i32, Vec<Decimal>> = BTreeMap::new();
    for ride in rides {
        let (Some(departed), Some(meters)) = (ride.departed_on(), ride.distance_meters()) else {
            continue;
        };
        by_year
            .entry(departed.year())
            .or_default()
            .push(meters_to(unit, meters));
    }
    by_year
}

/// Eddington number for each calendar year that has rides.
///
/// Each year only sees its own rides.
pub fn calculate_yearly_eddington(rides: &[Ride], unit: DistanceUnit) -> BTreeMap<i32, u32> {
    distances_by_year(rides, unit)
        .into_iter()
        .map(|(year, distances)| (year, calculate_eddington(&distances)))
        .collect()
}

/// Next Eddington level within `year` and how far away it is.
pub fn calculate_next_yearly_e(rides: &[Ride], year: i32, unit: DistanceUnit) -> YearlyTarget {
    let distances = distances_by_year(rides, unit)
        .remove(&year)
        .unwrap_or_default();
    next_target(&distances)
}

pub(crate) fn next_target(distances: &[Decimal]) -> YearlyTarget {
    let next_e = calculate_eddington(distances) + 1;
    let (rides_at_target, rides_needed) = rides_short_of(distances, next_e);
    YearlyTarget {
        next_e,
        rides_at_target,
        rides_needed,
    }
}

/// Year with the highest Eddington number, `(0, 0)` when there are none.
///
/// When several years share the highest value the most recent one is returned.
pub fn get_highest_yearly_eddington(yearly: &BTreeMap<i32, u32>) -> (i32, u32) {
    yearly
        .iter()
        .max_by(|(year_a, e_a), (year_b, e_b)| e_a.cmp(e_b).then(year_a.cmp(year_b)))
        .map(|(year, e)| (*year, *e))
        .unwrap_or((0, 0))
}

/// Number of rides at or above each threshold `20, 40, ..., 200`.
pub fn analyze_ride_distribution(distances: &[Decimal]) -> BTreeMap<u32, u32> {
    (DISTRIBUTION_STEP..=DISTRIBUTION_MAX)
        .step_by(DISTRIBUTION_STEP as usize)
        .map(|threshold| (threshold, rides_at_or_above(distances, threshold)))
        .collect()
}

/// Histogram of rides in `[lower, lower + bucket_size)` ranges.
///
/// Buckets without rides are left out. Percentages are of all rides.
pub fn bucket_distances(distances: &[Decimal], bucket_size: u32) -> Vec<DistanceBucket> {
    if distances.is_empty() || bucket_size == 0 {
        return Vec::new();
    }

    let size = Decimal::from(bucket_size);
    let mut counts: BTreeMap<u32, u32> = BTreeMap::new();
    for distance in distances {
        let Some(index) = ((*distance).max(Decimal::ZERO) / size).floor().to_u32() else {
            continue;
        };
        *counts.entry(index).or_default() += 1;
    }

    let total = distances.len() as f64;
    counts
        .into_iter()
        .map(|(index, count)| DistanceBucket {
            lower: index.saturating_mul(bucket_size),
            upper: index.saturating_add(1).saturating_mul(bucket_size),
            count,
            percentage: f64::from(count) / total * 100.0,
        })
        .collect()
}

/// Human-readable check that `e` is the Eddington number of `distances`.
pub fn verify_eddington(distances: &[Decimal], e: u32) -> String {
    let at_e = rides_at_or_above(distances, e);
    let at_next = rides_at_or_above(distances, e + 1);
    let holds = at_e >= e;
    let maximal = at_next < e + 1;

    let verdict = match (holds, maximal) {
        (true, true) => "verified".to_string(),
        (false, _) => format!("not reached, {} more rides needed", e - at_e),
        (true, false) => format!("E={} is also reached", e + 1),
    };

    format!(
        "E={e}: {at_e} rides of at least {e} (need {e}); {at_next} rides of at least {} (need {}); {verdict}",
        e + 1,
        e + 1
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn km(values: &[i64]) -> Vec<Decimal> {
        values.iter().map(|v| Decimal::from(*v)).collect()
    }

    fn ride(meters: f64, departed_at: &str) -> Ride {
        Ride {
            distance: Some(meters),
            departed_at: Some(departed_at.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_eddington_basic() {
        assert_eq!(calculate_eddington(&km(&[10, 20, 20, 30])), 4);
        assert_eq!(calculate_eddington(&[]), 0);
        assert_eq!(calculate_eddington(&[dec!(0.5)]), 0);
        assert_eq!(calculate_eddington(&[dec!(1)]), 1);
    }

    #[test]
    fn test_eddington_ignores_input_order() {
        assert_eq!(calculate_eddington(&km(&[1, 5, 3, 4, 2])), 3);
        assert_eq!(calculate_eddington(&km(&[2, 4, 1, 5, 3])), 3);
    }

    #[test]
    fn test_fractional_distances_compare_exactly() {
        // 2.999 does not count toward E=3
        assert_eq!(calculate_eddington(&[dec!(3), dec!(3), dec!(2.999)]), 2);
    }

    #[test]
    fn test_rides_needed_next() {
        assert_eq!(calculate_rides_needed_next(&km(&[10, 10, 1])), 1);
        assert_eq!(calculate_rides_needed_next(&[]), 1);
    }

    #[test]
    fn test_overall_progress_fixture() {
        let progress = calculate_overall_e_progress(&km(&[10, 20, 20, 5]));
        assert_eq!(
            progress,
            EddingtonProgress {
                current: 4,
                rides_at_next: 4,
                rides_needed_next: 1,
                rides_at_next_next: 3,
                rides_needed_next_next: 3,
            }
        );
    }

    #[test]
    fn test_yearly_isolated_by_year() {
        let rides = vec![
            ride(10000.0, "2025-01-01T00:00:00Z"),
            ride(20000.0, "2025-02-01T00:00:00Z"),
            ride(5000.0, "2024-05-01T00:00:00Z"),
            ride(9000.0, "not a date"),
        ];
        let yearly = calculate_yearly_eddington(&rides, DistanceUnit::Kilometers);
        assert_eq!(yearly.get(&2025), Some(&2));
        assert_eq!(yearly.get(&2024), Some(&1));
        assert_eq!(yearly.len(), 2);
    }

    #[test]
    fn test_next_yearly_e() {
        let rides = vec![
            ride(10000.0, "2025-03-01T00:00:00Z"),
            ride(20000.0, "2025-04-01T00:00:00Z"),
        ];
        let target = calculate_next_yearly_e(&rides, 2025, DistanceUnit::Kilometers);
        assert_eq!(target.next_e, 3);
        assert_eq!(target.rides_at_target, 2);
        assert_eq!(target.rides_needed, 1);

        let empty = calculate_next_yearly_e(&rides, 2019, DistanceUnit::Kilometers);
        assert_eq!(empty.next_e, 1);
        assert_eq!(empty.rides_needed, 1);
    }

    #[test]
    fn test_highest_yearly() {
        let yearly = BTreeMap::from([(2023, 10), (2024, 12)]);
        assert_eq!(get_highest_yearly_eddington(&yearly), (2024, 12));
        assert_eq!(get_highest_yearly_eddington(&BTreeMap::new()), (0, 0));
    }

    #[test]
    fn test_highest_yearly_tie_goes_to_latest() {
        let yearly = BTreeMap::from([(2021, 30), (2022, 25), (2023, 30)]);
        assert_eq!(get_highest_yearly_eddington(&yearly), (2023, 30));
    }

    #[test]
    fn test_distribution_thresholds() {
        let distribution = analyze_ride_distribution(&km(&[5, 15, 25, 35, 200]));
        assert_eq!(distribution.len(), 10);
        assert_eq!(distribution[&20], 3);
        assert_eq!(distribution[&40], 1);
        assert_eq!(distribution[&200], 1);
    }

    #[test]
    fn test_bucket_distances() {
        let buckets = bucket_distances(&km(&[10, 49, 50, 120]), 50);
        assert_eq!(buckets.len(), 3);
        assert_eq!((buckets[0].lower, buckets[0].upper, buckets[0].count), (0, 50, 2));
        assert_eq!((buckets[1].lower, buckets[1].count), (50, 1));
        // 50-100 has no second entry and 100-150 holds 120
        assert_eq!((buckets[2].lower, buckets[2].upper), (100, 150));
        assert!((buckets[0].percentage - 50.0).abs() < f64::EPSILON);
        assert!(bucket_distances(&[], 50).is_empty());
    }

    #[test]
    fn test_bucket_distances_saturates_at_u32_max() {
        let buckets = bucket_distances(&[Decimal::from(u32::MAX)], 50);
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].lower, u32::MAX / 50 * 50);
        assert_eq!(buckets[0].upper, u32::MAX);
    }

    #[test]
    fn test_verify_eddington_message() {
        let message = verify_eddington(&km(&[5, 10]), 5);
        assert!(message.contains("E=5"));
        assert!(message.contains("not reached"));

        let message = verify_eddington(&km(&[10, 20, 20, 30]), 4);
        assert!(message.contains("verified"));
    }
}
