// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Display-ready statistics produced by the Eddington and metrics engines.

use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

/// Overall Eddington number plus two levels of lookahead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EddingtonProgress {
    /// Current Eddington number `E`
    pub current: u32,
    /// Rides of at least `E + 1`
    pub rides_at_next: u32,
    /// More rides needed for `E + 1`
    pub rides_needed_next: u32,
    /// Rides of at least `E + 2`
    pub rides_at_next_next: u32,
    /// More rides needed for `E + 2`
    pub rides_needed_next_next: u32,
}

/// Next Eddington level within a single calendar year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct YearlyTarget {
    pub next_e: u32,
    pub rides_at_target: u32,
    pub rides_needed: u32,
}

/// One `[lower, upper)` slice of the ride-length histogram.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistanceBucket {
    pub lower: u32,
    pub upper: u32,
    pub count: u32,
    pub percentage: f64,
}

/// Total, average and longest ride.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RideStatistics {
    pub total_distance: Decimal,
    pub average_ride: Decimal,
    pub longest_ride: Decimal,
}

/// Count of rides in one named milestone bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MilestoneCount {
    /// Stable key, e.g. `double_centuries` or `range_200_to_299`
    pub key: &'static str,
    /// Human label, e.g. `Double centuries`
    pub label: &'static str,
    /// Lower bound (inclusive), in the unit the counts were computed in
    pub threshold: u32,
    pub count: u32,
}

/// Milestone counts in display order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MilestoneRides(pub Vec<MilestoneCount>);

impl MilestoneRides {
    /// Count for a bucket key.
    pub fn get(&self, key: &str) -> Option<u32> {
        self.0.iter().find(|m| m.key == key).map(|m| m.count)
    }

    pub fn iter(&self) -> impl Iterator<Item = &MilestoneCount> {
        self.0.iter()
    }
}

/// Monthly aggregates plus milestone and next-E summaries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RideMetrics {
    /// Distance per "YYYY-MM"
    pub monthly_totals: BTreeMap<String, Decimal>,
    /// Ride count per "YYYY-MM"
    pub monthly_counts: BTreeMap<String, u32>,
    pub milestone_rides: MilestoneRides,
    pub next_e_target: u32,
    pub rides_needed_next_e: u32,
}

/// One month's totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthSummary {
    pub month: String,
    pub rides: u32,
    pub distance: Decimal,
}

impl RideMetrics {
    /// Newest `n` months, newest first.
    pub fn recent_months(&self, n: usize) -> Vec<MonthSummary> {
        self.monthly_totals
            .iter()
            .rev()
            .take(n)
            .map(|(month, distance)| MonthSummary {
                month: month.clone(),
                rides: self.monthly_counts.get(month).copied().unwrap_or(0),
                distance: *distance,
            })
            .collect()
    }
}

/// Year-to-date style summary for one calendar year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearSummary {
    pub year: i32,
    pub ride_count: u32,
    pub statistics: RideStatistics,
    pub eddington: u32,
    pub next: YearlyTarget,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_recent_months_newest_first() {
        let mut metrics = RideMetrics {
            monthly_totals: BTreeMap::new(),
            monthly_counts: BTreeMap::new(),
            milestone_rides: MilestoneRides::default(),
            next_e_target: 1,
            rides_needed_next_e: 1,
        };
        for (month, distance, rides) in [
            ("2024-11", dec!(10), 1),
            ("2025-01", dec!(30), 3),
            ("2024-12", dec!(20), 2),
        ] {
            metrics.monthly_totals.insert(month.to_string(), distance);
            metrics.monthly_counts.insert(month.to_string(), rides);
        }

        let recent = metrics.recent_months(2);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].month, "2025-01");
        assert_eq!(recent[0].rides, 3);
        assert_eq!(recent[1].month, "2024-12");
        assert_eq!(recent[1].distance, dec!(20));
    }
}
