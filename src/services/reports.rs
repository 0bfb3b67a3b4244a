// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Weekly/monthly distance reports and the lifetime summary.
//!
//! Reports read the pre-rolled `daily_stats` rows, so a week is one range
//! scan rather than a scan over runs. Run counts come from the `runs`
//! collection keyed on start time.

use chrono::{Datelike, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;

use crate::db::FirestoreDb;
use crate::error::{AppError, Result};
use crate::models::wallet::{round_km, LedgerEntryType};
use crate::time_utils::{day_start, monday_first_index, month_bounds, week_bounds};

/// Report aggregation over runs, daily rollups, the ledger, and the wallet.
#[derive(Clone)]
pub struct ReportService {
    db: FirestoreDb,
}

/// Weekly report: Monday-first daily distances for one week.
#[derive(Debug)]
pub struct WeeklyReport {
    pub week_label: String,
    /// Distance per day in km (2dp), index 0 = Monday .. 6 = Sunday
    pub daily_distances: [Decimal; 7],
    pub total_distance: Decimal,
    pub total_runs: u32,
}

/// One populated day in a monthly report.
#[derive(Debug)]
pub struct DailyRecord {
    pub day: u32,
    pub distance: Decimal,
}

/// Monthly report: per-day distances for one calendar month.
#[derive(Debug)]
pub struct MonthlyReport {
    pub month_label: String,
    pub daily_records: Vec<DailyRecord>,
    pub total_distance: Decimal,
    pub total_runs: u32,
}

/// Lifetime totals for the summary page.
#[derive(Debug)]
pub struct TotalSummary {
    pub total_distance_km: Decimal,
    pub donated_km: Decimal,
    pub available_km: Decimal,
}

impl ReportService {
    pub fn new(db: FirestoreDb) -> Self {
        Self { db }
    }

    /// Report for the current UTC week.
    pub async fn weekly_report(&self, user_id: u64) -> Result<WeeklyReport> {
        self.weekly_report_for(user_id, Utc::now().date_naive())
            .await
    }

    /// Report for the week containing `today`.
    pub async fn weekly_report_for(
        &self,
        user_id: u64,
        today: NaiveDate,
    ) -> Result<WeeklyReport> {
        let (monday, sunday) = week_bounds(today);

        let stats = self
            .db
            .get_daily_stats_range(user_id, monday, sunday)
            .await?;

        let mut daily_distances = [Decimal::ZERO; 7];
        for stat in &stats {
            daily_distances[monday_first_index(stat.ymd.weekday())] =
                round_km(stat.distance_km());
        }
        let total_distance: Decimal = daily_distances.iter().copied().sum();

        let total_runs = self
            .db
            .count_runs_started_between(
                user_id,
                &day_start(monday),
                &day_start(sunday + Duration::days(1)),
            )
            .await?;

        Ok(WeeklyReport {
            week_label: format!("Week of {}", monday),
            daily_distances,
            total_distance,
            total_runs,
        })
    }

    /// Report for one calendar month.
    pub async fn monthly_report(
        &self,
        user_id: u64,
        year: i32,
        month: u32,
    ) -> Result<MonthlyReport> {
        let (first, last) = month_bounds(year, month).ok_or_else(|| {
            AppError::InvalidInput(format!("Invalid year/month: {}-{}", year, month))
        })?;

        let stats = self.db.get_daily_stats_range(user_id, first, last).await?;

        let daily_records: Vec<DailyRecord> = stats
            .iter()
            .map(|stat| DailyRecord {
                day: stat.ymd.day(),
                distance: round_km(stat.distance_km()),
            })
            .collect();
        let total_distance: Decimal = daily_records.iter().map(|r| r.distance).sum();

        let total_runs = self
            .db
            .count_runs_started_between(
                user_id,
                &day_start(first),
                &day_start(last + Duration::days(1)),
            )
            .await?;

        Ok(MonthlyReport {
            month_label: format!("{}-{:02}", year, month),
            daily_records,
            total_distance,
            total_runs,
        })
    }

    /// Lifetime distance run, km donated, and km still available.
    pub async fn total_summary(&self, user_id: u64) -> Result<TotalSummary> {
        let finished = self.db.get_finished_runs(user_id).await?;
        let total_m: i64 = finished.iter().filter_map(|r| r.total_distance_m).sum();
        let total_distance_km = Decimal::from(total_m) / Decimal::ONE_THOUSAND;

        let entries = self.db.get_ledger_entries(user_id).await?;
        let donated_km: Decimal = entries
            .iter()
            .filter(|e| e.entry_type == LedgerEntryType::Debit)
            .map(|e| e.amount_km)
            .sum();

        let available_km = self.db.get_balance(user_id).await?;

        Ok(TotalSummary {
            total_distance_km,
            donated_km,
            available_km,
        })
    }
}
