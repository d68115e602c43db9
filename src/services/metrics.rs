// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Ride metrics: totals, milestones, monthly aggregates and rankings.

use chrono::Datelike;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

use crate::models::ride::Ride;
use crate::models::stats::{
    MilestoneCount, MilestoneRides, RideMetrics, RideStatistics, YearSummary,
};
use crate::services::eddington::{calculate_eddington, calculate_rides_needed_next, next_target};
use crate::services::units::{meters_to, DistanceUnit};
use crate::time_utils::month_key;

/// Mile milestones. Each is counted on its own, so a 250 mile ride is both a
/// century and a double century.
const MILE_MILESTONES: [(&str, &str, u32); 4] = [
    ("centuries", "Century rides", 100),
    ("double_centuries", "Double centuries", 200),
    ("triple_centuries", "Triple centuries", 300),
    ("quad_centuries", "Quad centuries", 400),
];

/// Kilometer brackets, `[lower, next lower)`; the last one is open-ended.
const KM_MILESTONES: [(&str, &str, u32); 8] = [
    ("range_50_to_99", "Randonneur 50", 50),
    ("range_100_to_149", "Randonneur 100", 100),
    ("range_150_to_199", "Randonneur 150", 150),
    ("range_200_to_299", "Randonneur 200", 200),
    ("range_300_to_399", "Randonneur 300", 300),
    ("range_400_to_599", "Randonneur 400", 400),
    ("range_600_to_999", "Randonneur 600", 600),
    ("range_1000_plus", "Randonneur 1000", 1000),
];

/// Rides that have both a distance and a parseable departure time.
///
/// Same order as `rides`; [`process_trips`] yields the matching distances.
pub fn qualifying_rides(rides: &[Ride]) -> Vec<&Ride> {
    rides
        .iter()
        .filter(|ride| {
            let ok = ride.distance_meters().is_some() && ride.departed_on().is_some();
            if !ok {
                tracing::debug!(ride_id = ?ride.id, "Skipping ride without distance or date");
            }
            ok
        })
        .collect()
}

/// Distances of the qualifying rides, converted to `unit`.
pub fn process_trips(rides: &[Ride], unit: DistanceUnit) -> Vec<Decimal> {
    qualifying_rides(rides)
        .into_iter()
        .filter_map(|ride| ride.distance_meters())
        .map(|meters| meters_to(unit, meters))
        .collect()
}

/// Total, average and longest ride. All zero for no rides.
pub fn calculate_statistics(distances: &[Decimal]) -> RideStatistics {
    let total_distance: Decimal = distances.iter().sum();
    let longest_ride = distances.iter().max().copied().unwrap_or(Decimal::ZERO);
    let average_ride = if distances.is_empty() {
        Decimal::ZERO
    } else {
        total_distance / Decimal::from(distances.len())
    };

    RideStatistics {
        total_distance,
        average_ride,
        longest_ride,
    }
}

/// Milestone counts for `unit`.
///
/// Miles use overlapping century thresholds; kilometers use exclusive
/// randonneur brackets.
pub fn get_milestone_rides(distances: &[Decimal], unit: DistanceUnit) -> MilestoneRides {
    match unit {
        DistanceUnit::Miles => MilestoneRides(
            MILE_MILESTONES
                .iter()
                .map(|&(key, label, threshold)| {
                    let lower = Decimal::from(threshold);
                    MilestoneCount {
                        key,
                        label,
                        threshold,
                        count: distances.iter().filter(|d| **d >= lower).count() as u32,
                    }
                })
                .collect(),
        ),
        DistanceUnit::Kilometers => MilestoneRides(
            KM_MILESTONES
                .iter()
                .enumerate()
                .map(|(i, &(key, label, threshold))| {
                    let lower = Decimal::from(threshold);
                    let upper = KM_MILESTONES.get(i + 1).map(|next| Decimal::from(next.2));
                    let count = distances
                        .iter()
                        .filter(|d| **d >= lower && upper.is_none_or(|upper| **d < upper))
                        .count() as u32;
                    MilestoneCount {
                        key,
                        label,
                        threshold,
                        count,
                    }
                })
                .collect(),
        ),
    }
}

/// Monthly totals and counts, milestones and the next overall E target.
pub fn analyze_ride_metrics(rides: &[Ride], unit: DistanceUnit) -> RideMetrics {
    let mut monthly_totals: BTreeMap<String, Decimal> = BTreeMap::new();
    let mut monthly_counts: BTreeMap<String, u32> = BTreeMap::new();
    let mut distances = Vec::new();

    for ride in rides {
        let (Some(departed), Some(meters)) = (ride.departed_on(), ride.distance_meters()) else {
            continue;
        };
        let distance = meters_to(unit, meters);
        let key = month_key(&departed);
        *monthly_totals.entry(key.clone()).or_default() += distance;
        *monthly_counts.entry(key).or_default() += 1;
        distances.push(distance);
    }

    RideMetrics {
        monthly_totals,
        monthly_counts,
        milestone_rides: get_milestone_rides(&distances, unit),
        next_e_target: calculate_eddington(&distances) + 1,
        rides_needed_next_e: calculate_rides_needed_next(&distances),
    }
}

/// `(distance, title)` pairs, longest first.
///
/// `distances` must be parallel to the qualifying rides of `rides`. If the
/// lengths disagree the distances are recomputed from `rides`.
pub fn get_ride_titles(
    rides: &[Ride],
    distances: &[Decimal],
    unit: DistanceUnit,
) -> Vec<(Decimal, String)> {
    let qualifying = qualifying_rides(rides);
    let recomputed;
    let distances = if distances.len() == qualifying.len() {
        distances
    } else {
        tracing::debug!(
            rides = qualifying.len(),
            distances = distances.len(),
            "Distance list not parallel to rides, recomputing"
        );
        recomputed = process_trips(rides, unit);
        &recomputed
    };

    let mut titled: Vec<(Decimal, String)> = distances
        .iter()
        .zip(qualifying)
        .map(|(distance, ride)| (*distance, ride.title().to_string()))
        .collect();
    // Stable sort keeps API order for rides of equal length.
    titled.sort_by(|a, b| b.0.cmp(&a.0));
    titled
}

/// Rides, distance and Eddington progress for one calendar year.
pub fn summarize_year(rides: &[Ride], year: i32, unit: DistanceUnit) -> YearSummary {
    let in_year: Vec<Ride> = rides
        .iter()
        .filter(|ride| ride.departed_on().is_some_and(|d| d.year() == year))
        .cloned()
        .collect();
    let distances = process_trips(&in_year, unit);

    YearSummary {
        year,
        ride_count: in_year.len() as u32,
        statistics: calculate_statistics(&distances),
        eddington: calculate_eddington(&distances),
        next: next_target(&distances),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn ride(meters: f64, departed_at: &str, name: &str) -> Ride {
        Ride {
            distance: Some(meters),
            departed_at: Some(departed_at.to_string()),
            name: Some(name.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_statistics() {
        let stats = calculate_statistics(&[dec!(10), dec!(20), dec!(20), dec!(30)]);
        assert_eq!(stats.total_distance, dec!(80));
        assert_eq!(stats.average_ride, dec!(20));
        assert_eq!(stats.longest_ride, dec!(30));
    }

    #[test]
    fn test_statistics_empty() {
        let stats = calculate_statistics(&[]);
        assert_eq!(stats.total_distance, Decimal::ZERO);
        assert_eq!(stats.average_ride, Decimal::ZERO);
        assert_eq!(stats.longest_ride, Decimal::ZERO);
    }

    #[test]
    fn test_process_trips_skips_incomplete_rides() {
        let rides = vec![
            ride(10000.0, "2025-01-01T08:00:00Z", "a"),
            Ride {
                distance: None,
                departed_at: Some("2025-01-02T08:00:00Z".to_string()),
                ..Default::default()
            },
            ride(5000.0, "garbage", "c"),
            ride(2500.0, "2025-01-03T08:00:00+01:00", "d"),
        ];
        assert_eq!(
            process_trips(&rides, DistanceUnit::Kilometers),
            vec![dec!(10), dec!(2.5)]
        );
        assert_eq!(qualifying_rides(&rides).len(), 2);
    }

    #[test]
    fn test_mile_milestones_overlap() {
        // A 250 mile ride counts as a century and a double century.
        let milestones = get_milestone_rides(&[dec!(50), dec!(120), dec!(250)], DistanceUnit::Miles);
        assert_eq!(milestones.get("centuries"), Some(2));
        assert_eq!(milestones.get("double_centuries"), Some(1));
        assert_eq!(milestones.get("triple_centuries"), Some(0));
        assert_eq!(milestones.get("quad_centuries"), Some(0));
    }

    #[test]
    fn test_km_milestones_exclusive() {
        let milestones = get_milestone_rides(
            &[dec!(55), dec!(160), dec!(220), dec!(305), dec!(1200), dec!(99.9)],
            DistanceUnit::Kilometers,
        );
        assert_eq!(milestones.get("range_50_to_99"), Some(2));
        assert_eq!(milestones.get("range_100_to_149"), Some(0));
        assert_eq!(milestones.get("range_150_to_199"), Some(1));
        assert_eq!(milestones.get("range_200_to_299"), Some(1));
        assert_eq!(milestones.get("range_300_to_399"), Some(1));
        assert_eq!(milestones.get("range_1000_plus"), Some(1));
        assert_eq!(milestones.iter().count(), 8);
    }

    #[test]
    fn test_analyze_ride_metrics() {
        let rides = vec![
            ride(10000.0, "2025-01-01T00:00:00Z", "a"),
            ride(20000.0, "2025-01-15T00:00:00Z", "b"),
            ride(20000.0, "2025-02-01T00:00:00Z", "c"),
        ];
        let metrics = analyze_ride_metrics(&rides, DistanceUnit::Kilometers);
        assert_eq!(metrics.monthly_totals["2025-01"], dec!(30));
        assert_eq!(metrics.monthly_counts["2025-01"], 2);
        assert_eq!(metrics.monthly_counts["2025-02"], 1);
        assert_eq!(metrics.next_e_target, 4);
        assert_eq!(metrics.rides_needed_next_e, 1);
    }

    #[test]
    fn test_ride_titles_sorted_longest_first() {
        let rides = vec![
            ride(10000.0, "2025-01-01T00:00:00Z", "short"),
            ride(30000.0, "2025-01-02T00:00:00Z", "long"),
            ride(20000.0, "2025-01-03T00:00:00Z", ""),
        ];
        let distances = process_trips(&rides, DistanceUnit::Kilometers);
        let titles = get_ride_titles(&rides, &distances, DistanceUnit::Kilometers);
        assert_eq!(titles[0], (dec!(30), "long".to_string()));
        assert_eq!(titles[1].1, crate::models::ride::UNTITLED_RIDE);
        assert_eq!(titles[2].1, "short");
    }

    #[test]
    fn test_ride_titles_recomputes_mismatched_distances() {
        let rides = vec![
            ride(10000.0, "2025-01-01T00:00:00Z", "short"),
            ride(30000.0, "2025-01-02T00:00:00Z", "long"),
        ];
        let titles = get_ride_titles(&rides, &[dec!(1)], DistanceUnit::Kilometers);
        assert_eq!(titles.len(), 2);
        assert_eq!(titles[0], (dec!(30), "long".to_string()));
    }

    #[test]
    fn test_summarize_year() {
        let rides = vec![
            ride(10000.0, "2025-03-01T00:00:00Z", "a"),
            ride(20000.0, "2025-04-01T00:00:00Z", "b"),
            ride(90000.0, "2024-04-01T00:00:00Z", "old"),
        ];
        let summary = summarize_year(&rides, 2025, DistanceUnit::Kilometers);
        assert_eq!(summary.ride_count, 2);
        assert_eq!(summary.statistics.total_distance, dec!(30));
        assert_eq!(summary.eddington, 2);
        assert_eq!(summary.next.next_e, 3);
        assert_eq!(summary.next.rides_needed, 1);
    }
}
