// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Run lifecycle service.
//!
//! Owns the start → finish state machine and the accounting side effects of
//! finishing a run: the run finalization, daily rollup, wallet credit, and
//! ledger entry all commit in one transaction.

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::db::FirestoreDb;
use crate::error::{AppError, Result};
use crate::models::run::RunMetrics;
use crate::models::wallet::round_km;
use crate::models::Run;
use crate::time_utils::{format_utc_rfc3339, parse_timestamp};

/// Memo recorded on every run-credit ledger entry.
const CREDIT_MEMO: &str = "Run finished";

/// Run lifecycle operations.
#[derive(Clone)]
pub struct RunService {
    db: FirestoreDb,
}

/// Result of finishing a run.
#[derive(Debug)]
pub struct FinishSummary {
    /// Finished distance, fixed to the 2-decimal accounting resolution
    pub total_distance_km: Decimal,
    /// Wallet balance after the credit
    pub wallet_balance: Decimal,
}

impl RunService {
    pub fn new(db: FirestoreDb) -> Self {
        Self { db }
    }

    /// Start a new run. Returns the new run's ID.
    pub async fn start_run(&self, user_id: u64, started_at: &str) -> Result<String> {
        let started_at = parse_timestamp(started_at)?;

        let run = Run::start(
            Uuid::new_v4().to_string(),
            user_id,
            format_utc_rfc3339(started_at),
        );
        self.db.insert_run(&run).await?;

        tracing::info!(user_id, run_id = %run.id, "Run started");
        Ok(run.id)
    }

    /// Finish a run and settle its accounting.
    pub async fn finish_run(
        &self,
        run_id: &str,
        finished_at: &str,
        total_distance_km: Decimal,
        total_seconds: i64,
        calories: i64,
    ) -> Result<FinishSummary> {
        let finished_at = parse_timestamp(finished_at)?;

        if total_distance_km < Decimal::ZERO {
            return Err(AppError::InvalidInput(format!(
                "Distance must not be negative, got {}",
                total_distance_km
            )));
        }
        if total_seconds < 0 {
            return Err(AppError::InvalidInput(format!(
                "Duration must not be negative, got {}",
                total_seconds
            )));
        }

        let metrics = RunMetrics::compute(total_distance_km, total_seconds);

        // The credited amount is fixed to 2 decimals before it enters the
        // transaction; the ledger records exactly this value.
        let credit_km = round_km(total_distance_km);

        let outcome = self
            .db
            .finish_run_atomic(run_id, finished_at, metrics, calories, credit_km, CREDIT_MEMO)
            .await?;

        Ok(FinishSummary {
            total_distance_km: outcome.credited_km,
            wallet_balance: outcome.wallet_balance,
        })
    }
}
