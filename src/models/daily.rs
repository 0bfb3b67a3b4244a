// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Per-user-per-day activity rollups.
//!
//! These rollups keep report queries to one range scan instead of
//! O(runs) reads. They are updated in the same transaction that finalizes
//! a run, so a rollup row never exists without its runs.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Daily distance/time rollup, keyed by `(user_id, ymd)`.
///
/// Created lazily on the first finish of the day and only ever mutated by
/// addition. `ymd` is the UTC calendar date of the run's finish time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyStat {
    pub user_id: u64,
    pub ymd: NaiveDate,
    pub total_distance_m: i64,
    pub total_seconds: i64,
}

impl DailyStat {
    /// Empty rollup for a day.
    pub fn empty(user_id: u64, ymd: NaiveDate) -> Self {
        Self {
            user_id,
            ymd,
            total_distance_m: 0,
            total_seconds: 0,
        }
    }

    /// Document ID for the `(user_id, ymd)` composite key.
    pub fn doc_id(user_id: u64, ymd: NaiveDate) -> String {
        format!("{}_{}", user_id, ymd)
    }

    /// Add a finished run's totals.
    pub fn add(&mut self, distance_m: i64, seconds: i64) {
        self.total_distance_m += distance_m;
        self.total_seconds += seconds;
    }

    /// Rolled-up distance in km.
    pub fn distance_km(&self) -> Decimal {
        Decimal::from(self.total_distance_m) / Decimal::ONE_THOUSAND
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_add_accumulates() {
        let day = NaiveDate::from_ymd_opt(2026, 3, 4).unwrap();
        let mut stat = DailyStat::empty(42, day);

        stat.add(5000, 1500);
        stat.add(3000, 900);

        assert_eq!(stat.total_distance_m, 8000);
        assert_eq!(stat.total_seconds, 2400);
        assert_eq!(stat.distance_km(), dec!(8));
    }

    #[test]
    fn test_doc_id() {
        let day = NaiveDate::from_ymd_opt(2026, 3, 4).unwrap();
        assert_eq!(DailyStat::doc_id(42, day), "42_2026-03-04");
    }
}
