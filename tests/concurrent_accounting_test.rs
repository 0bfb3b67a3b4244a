// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Concurrency tests for the accounting transactions.
//!
//! These reproduce the two lost-update hazards: concurrent finishes for the
//! same user/day must not lose rollup increments, and concurrent donations
//! must not both pass a stale balance check and overdraw the wallet.
//! Requires the Firestore emulator (skipped otherwise).

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use valuerun::error::AppError;
use valuerun::models::wallet::signed_sum;
use valuerun::services::{DonationService, RunService};

mod common;
use common::{test_db, unique_user_id};

const NUM_CONCURRENT_FINISHES: usize = 10;
const MAX_TRANSIENT_RETRIES: usize = 5;

/// Retry a transient (conflict/abort) store failure, as callers are expected
/// to do.
async fn finish_with_retry(
    runs: &RunService,
    run_id: &str,
    finished_at: &str,
    distance_km: Decimal,
    seconds: i64,
) -> Result<(), AppError> {
    let mut last_err = None;
    for _ in 0..MAX_TRANSIENT_RETRIES {
        match runs.finish_run(run_id, finished_at, distance_km, seconds, 0).await {
            Ok(_) => return Ok(()),
            Err(AppError::Database(msg)) => last_err = Some(AppError::Database(msg)),
            Err(other) => return Err(other),
        }
    }
    Err(last_err.unwrap_or_else(|| AppError::Database("retries exhausted".to_string())))
}

#[tokio::test]
async fn test_concurrent_finishes_sum_daily_rollup() {
    require_emulator!();

    let db = test_db().await;
    let runs = RunService::new(db.clone());
    let user_id = unique_user_id();

    // Start all runs first so the finishes race only on the shared documents
    let mut run_ids = Vec::new();
    for _ in 0..NUM_CONCURRENT_FINISHES {
        run_ids.push(
            runs.start_run(user_id, "2026-03-04T10:00:00Z")
                .await
                .expect("start_run failed"),
        );
    }

    let mut handles = vec![];
    for run_id in run_ids {
        let runs = runs.clone();
        handles.push(tokio::spawn(async move {
            finish_with_retry(&runs, &run_id, "2026-03-04T11:00:00Z", dec!(1.00), 600).await
        }));
    }

    for handle in handles {
        handle
            .await
            .expect("Task join failed")
            .expect("finish_run failed");
    }

    // Every increment must survive the race
    let day = NaiveDate::from_ymd_opt(2026, 3, 4).unwrap();
    let daily = db.get_daily_stat(user_id, day).await.unwrap().unwrap();
    assert_eq!(
        daily.total_distance_m,
        (NUM_CONCURRENT_FINISHES * 1000) as i64,
        "Daily rollup lost an increment under concurrency"
    );
    assert_eq!(daily.total_seconds, (NUM_CONCURRENT_FINISHES * 600) as i64);

    // As must every wallet credit and ledger entry
    let wallet = db.get_wallet(user_id).await.unwrap().unwrap();
    assert_eq!(wallet.km_balance, Decimal::from(NUM_CONCURRENT_FINISHES));

    let entries = db.get_ledger_entries(user_id).await.unwrap();
    assert_eq!(entries.len(), NUM_CONCURRENT_FINISHES);
    assert_eq!(wallet.km_balance, signed_sum(&entries));
}

#[tokio::test]
async fn test_concurrent_donations_never_overdraw() {
    require_emulator!();

    let db = test_db().await;
    let runs = RunService::new(db.clone());
    let donations = DonationService::new(db.clone());
    let user_id = unique_user_id();

    // Seed a 10.00 km balance
    let run_id = runs
        .start_run(user_id, "2026-03-04T10:00:00Z")
        .await
        .unwrap();
    runs.finish_run(&run_id, "2026-03-04T11:00:00Z", dec!(10), 3600, 0)
        .await
        .unwrap();

    // Four donations of 3.00 each against a 10.00 balance: at most three
    // can succeed.
    let mut handles = vec![];
    for _ in 0..4 {
        let donations = donations.clone();
        handles.push(tokio::spawn(async move {
            donations.donate(user_id, 1, dec!(3.00)).await
        }));
    }

    let mut successes = 0u32;
    for handle in handles {
        match handle.await.expect("Task join failed") {
            Ok(_) => successes += 1,
            Err(AppError::InsufficientBalance(_)) => {}
            // Commit conflicts surface as transient store errors; for this
            // property only the conserved balance matters.
            Err(AppError::Database(_)) => {}
            Err(other) => panic!("Unexpected error: {}", other),
        }
    }
    assert!(successes <= 3, "Overdraw: {} donations succeeded", successes);

    // The balance never goes negative and always matches the ledger replay
    let wallet = db.get_wallet(user_id).await.unwrap().unwrap();
    assert!(wallet.km_balance >= Decimal::ZERO);
    assert_eq!(
        wallet.km_balance,
        dec!(10.00) - Decimal::from(successes * 3)
    );

    let entries = db.get_ledger_entries(user_id).await.unwrap();
    assert_eq!(wallet.km_balance, signed_sum(&entries));
}
