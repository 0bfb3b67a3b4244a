// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Run model and derived metrics.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Lifecycle state of a run. `Finished` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Active,
    Finished,
}

/// Stored run record in Firestore.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Run {
    /// Run ID (also used as document ID)
    pub id: String,
    /// Owning user
    pub user_id: u64,
    /// When the run started (RFC3339, UTC)
    pub started_at: String,
    /// When the run finished (set on finish)
    pub finished_at: Option<String>,
    /// Total distance in meters (set on finish)
    pub total_distance_m: Option<i64>,
    /// Total duration in seconds (set on finish)
    pub total_seconds: Option<i64>,
    /// Average pace in seconds per km (set on finish)
    pub avg_pace_sec_per_km: Option<i64>,
    /// Calories burned (set on finish)
    pub calories: Option<i64>,
    /// Lifecycle status
    pub status: RunStatus,
}

impl Run {
    /// Create a new active run.
    pub fn start(id: String, user_id: u64, started_at: String) -> Self {
        Self {
            id,
            user_id,
            started_at,
            finished_at: None,
            total_distance_m: None,
            total_seconds: None,
            avg_pace_sec_per_km: None,
            calories: None,
            status: RunStatus::Active,
        }
    }

    /// Write finish metrics onto the run. The caller checks that the run is
    /// still active.
    pub fn finish(&mut self, finished_at: String, metrics: &RunMetrics, calories: i64) {
        self.finished_at = Some(finished_at);
        self.total_distance_m = Some(metrics.total_distance_m);
        self.total_seconds = Some(metrics.total_seconds);
        self.avg_pace_sec_per_km = Some(metrics.avg_pace_sec_per_km);
        self.calories = Some(calories);
        self.status = RunStatus::Finished;
    }
}

/// Metrics derived from the raw distance/duration reported on finish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunMetrics {
    pub total_distance_m: i64,
    pub total_seconds: i64,
    pub avg_pace_sec_per_km: i64,
}

impl RunMetrics {
    /// Compute stored metrics from the reported totals.
    ///
    /// A zero-distance run gets pace 0 rather than a division error.
    pub fn compute(distance_km: Decimal, total_seconds: i64) -> Self {
        let total_distance_m = (distance_km * Decimal::ONE_THOUSAND)
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_i64()
            .unwrap_or(0);

        let avg_pace_sec_per_km = if distance_km > Decimal::ZERO {
            (Decimal::from(total_seconds) / distance_km)
                .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
                .to_i64()
                .unwrap_or(0)
        } else {
            0
        };

        Self {
            total_distance_m,
            total_seconds,
            avg_pace_sec_per_km,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_metrics_basic() {
        let metrics = RunMetrics::compute(dec!(5), 1500);
        assert_eq!(metrics.total_distance_m, 5000);
        assert_eq!(metrics.total_seconds, 1500);
        assert_eq!(metrics.avg_pace_sec_per_km, 300);
    }

    #[test]
    fn test_metrics_rounding() {
        let metrics = RunMetrics::compute(dec!(5.555), 1800);
        assert_eq!(metrics.total_distance_m, 5555);
        // 1800 / 5.555 = 324.03...
        assert_eq!(metrics.avg_pace_sec_per_km, 324);

        let metrics = RunMetrics::compute(dec!(5.5555), 1800);
        assert_eq!(metrics.total_distance_m, 5556);
    }

    #[test]
    fn test_metrics_zero_distance() {
        let metrics = RunMetrics::compute(Decimal::ZERO, 600);
        assert_eq!(metrics.total_distance_m, 0);
        assert_eq!(metrics.avg_pace_sec_per_km, 0);
    }

    #[test]
    fn test_run_lifecycle() {
        let mut run = Run::start("run-1".to_string(), 7, "2026-03-04T10:00:00Z".to_string());
        assert_eq!(run.status, RunStatus::Active);
        assert!(run.finished_at.is_none());

        let metrics = RunMetrics::compute(dec!(5), 1500);
        run.finish("2026-03-04T10:25:00Z".to_string(), &metrics, 250);

        assert_eq!(run.status, RunStatus::Finished);
        assert_eq!(run.total_distance_m, Some(5000));
        assert_eq!(run.avg_pace_sec_per_km, Some(300));
        assert_eq!(run.calories, Some(250));
    }
}
