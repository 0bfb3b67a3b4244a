// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Runs (lifecycle records)
//! - Daily stats (per-user-per-day rollups)
//! - Donation wallet (denormalized km balances)
//! - Donation ledger (append-only balance events)
//!
//! The finish-run and donate flows are multi-document transactions: a wallet
//! mutation always commits together with its ledger entry (and, for a
//! finish, the run update and daily rollup), or not at all.

use chrono::{NaiveDate, Utc};
use futures_util::TryStreamExt;
use rust_decimal::Decimal;

use crate::db::collections;
use crate::error::AppError;
use crate::models::run::RunMetrics;
use crate::models::{DailyStat, LedgerEntry, Run, RunStatus, Wallet};
use crate::time_utils::format_utc_rfc3339;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

/// Result of the atomic finish-run transaction.
#[derive(Debug)]
pub struct FinishOutcome {
    pub user_id: u64,
    pub credited_km: Decimal,
    pub wallet_balance: Decimal,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        // Use ExternalJwtFunctionSource to provide a dummy token without needing async-trait
        // or a custom TokenSource implementation struct.
        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    // ─── Run Operations ──────────────────────────────────────────

    /// Insert a new run.
    pub async fn insert_run(&self, run: &Run) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::RUNS)
            .document_id(&run.id)
            .object(run)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Get a run by ID.
    pub async fn get_run(&self, run_id: &str) -> Result<Option<Run>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::RUNS)
            .obj()
            .one(run_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All finished runs for a user (lifetime totals).
    pub async fn get_finished_runs(&self, user_id: u64) -> Result<Vec<Run>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::RUNS)
            .filter(move |q| {
                q.for_all([
                    q.field("user_id").eq(user_id),
                    q.field("status").eq("finished"),
                ])
            })
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count runs started in the half-open RFC3339 range `[from, to)`.
    pub async fn count_runs_started_between(
        &self,
        user_id: u64,
        from: &str,
        to: &str,
    ) -> Result<u32, AppError> {
        let from = from.to_string();
        let to = to.to_string();

        let runs: Vec<Run> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::RUNS)
            .filter(move |q| {
                q.for_all([
                    q.field("user_id").eq(user_id),
                    q.field("started_at").greater_than_or_equal(from.clone()),
                    q.field("started_at").less_than(to.clone()),
                ])
            })
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(runs.len() as u32)
    }

    // ─── Daily Stats Operations ──────────────────────────────────

    /// Get one day's rollup.
    pub async fn get_daily_stat(
        &self,
        user_id: u64,
        ymd: NaiveDate,
    ) -> Result<Option<DailyStat>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::DAILY_STATS)
            .obj()
            .one(&DailyStat::doc_id(user_id, ymd))
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Daily rollups for a user in an inclusive `ymd` range, oldest first.
    pub async fn get_daily_stats_range(
        &self,
        user_id: u64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DailyStat>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::DAILY_STATS)
            .filter(move |q| {
                q.for_all([
                    q.field("user_id").eq(user_id),
                    q.field("ymd").greater_than_or_equal(from.to_string()),
                    q.field("ymd").less_than_or_equal(to.to_string()),
                ])
            })
            .order_by([("ymd", firestore::FirestoreQueryDirection::Ascending)])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ─── Wallet & Ledger Operations ──────────────────────────────

    /// Get a user's wallet.
    pub async fn get_wallet(&self, user_id: u64) -> Result<Option<Wallet>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::DONATION_WALLET)
            .obj()
            .one(&user_id.to_string())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Current km balance; a missing wallet reads as zero, never an error.
    pub async fn get_balance(&self, user_id: u64) -> Result<Decimal, AppError> {
        Ok(self
            .get_wallet(user_id)
            .await?
            .map(|w| w.km_balance)
            .unwrap_or(Decimal::ZERO))
    }

    /// All ledger entries for a user (invariant checks, lifetime sums).
    pub async fn get_ledger_entries(&self, user_id: u64) -> Result<Vec<LedgerEntry>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::DONATION_LEDGER)
            .filter(move |q| q.for_all([q.field("user_id").eq(user_id)]))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Most recent debit entries, newest first.
    ///
    /// The query is streamed so the limit bounds what gets deserialized;
    /// each call re-runs the query.
    pub async fn recent_debits(
        &self,
        user_id: u64,
        limit: u32,
    ) -> Result<Vec<LedgerEntry>, AppError> {
        let stream = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::DONATION_LEDGER)
            .filter(move |q| {
                q.for_all([
                    q.field("user_id").eq(user_id),
                    q.field("entry_type").eq("debit"),
                ])
            })
            .order_by([(
                "created_at",
                firestore::FirestoreQueryDirection::Descending,
            )])
            .limit(limit)
            .obj::<LedgerEntry>()
            .stream_query_with_errors()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        stream
            .try_collect()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ─── Atomic Accounting Operations ────────────────────────────

    /// Atomically finish a run: finalize the run record, add to the day's
    /// rollup, credit the wallet, and append the ledger credit.
    ///
    /// All writes go through one Firestore transaction and commit together.
    /// If another request modifies the same documents concurrently, Firestore
    /// retries the transaction with fresh data, so rollup increments and
    /// wallet credits are never lost.
    ///
    /// Fails with `NotFound` when the run does not exist or was already
    /// finished; a finished run is terminal and cannot be re-credited.
    pub async fn finish_run_atomic(
        &self,
        run_id: &str,
        finished_at: chrono::DateTime<Utc>,
        metrics: RunMetrics,
        calories: i64,
        credit_km: Decimal,
        memo: &str,
    ) -> Result<FinishOutcome, AppError> {
        // Begin a transaction
        let mut transaction = self
            .get_client()?
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        // 1. Load the run and check it is still active
        let run: Option<Run> = self
            .get_client()?
            .fluent()
            .select()
            .by_id_in(collections::RUNS)
            .obj()
            .one(run_id)
            .await
            .map_err(|e| {
                AppError::Database(format!("Failed to read run in transaction: {}", e))
            })?;

        let mut run = match run {
            Some(run) if run.status == RunStatus::Active => run,
            Some(_) => {
                let _ = transaction.rollback().await;
                return Err(AppError::NotFound(format!(
                    "Run {} is already finished",
                    run_id
                )));
            }
            None => {
                let _ = transaction.rollback().await;
                return Err(AppError::NotFound(format!("Run {} not found", run_id)));
            }
        };

        let user_id = run.user_id;
        let day = finished_at.date_naive();

        // 2. Finalize the run record
        run.finish(format_utc_rfc3339(finished_at), &metrics, calories);

        // 3. Add to the day's rollup, upserting with zero totals when absent
        let mut daily: DailyStat = self
            .get_client()?
            .fluent()
            .select()
            .by_id_in(collections::DAILY_STATS)
            .obj()
            .one(&DailyStat::doc_id(user_id, day))
            .await
            .map_err(|e| {
                AppError::Database(format!("Failed to read daily stats in transaction: {}", e))
            })?
            .unwrap_or_else(|| DailyStat::empty(user_id, day));
        daily.add(metrics.total_distance_m, metrics.total_seconds);

        // 4. Credit the wallet and build the ledger entry. A zero-distance
        //    finish changes no balance and therefore writes no ledger entry.
        let mut wallet: Wallet = self
            .get_client()?
            .fluent()
            .select()
            .by_id_in(collections::DONATION_WALLET)
            .obj()
            .one(&user_id.to_string())
            .await
            .map_err(|e| {
                AppError::Database(format!("Failed to read wallet in transaction: {}", e))
            })?
            .unwrap_or_else(|| Wallet::empty(user_id));

        let ledger_entry = if credit_km > Decimal::ZERO {
            wallet.credit(credit_km)?;
            Some(LedgerEntry::credit(
                user_id,
                credit_km,
                run_id,
                memo,
                format_utc_rfc3339(Utc::now()),
            ))
        } else {
            None
        };

        // 5. Stage all writes
        self.get_client()?
            .fluent()
            .update()
            .in_col(collections::RUNS)
            .document_id(run_id)
            .object(&run)
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add run to transaction: {}", e))
            })?;

        self.get_client()?
            .fluent()
            .update()
            .in_col(collections::DAILY_STATS)
            .document_id(DailyStat::doc_id(user_id, day))
            .object(&daily)
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add daily stats to transaction: {}", e))
            })?;

        if let Some(entry) = &ledger_entry {
            self.get_client()?
                .fluent()
                .update()
                .in_col(collections::DONATION_WALLET)
                .document_id(user_id.to_string())
                .object(&wallet)
                .add_to_transaction(&mut transaction)
                .map_err(|e| {
                    AppError::Database(format!("Failed to add wallet to transaction: {}", e))
                })?;

            self.get_client()?
                .fluent()
                .update()
                .in_col(collections::DONATION_LEDGER)
                .document_id(&entry.id)
                .object(entry)
                .add_to_transaction(&mut transaction)
                .map_err(|e| {
                    AppError::Database(format!(
                        "Failed to add ledger entry to transaction: {}",
                        e
                    ))
                })?;
        }

        // 6. Commit the transaction atomically
        transaction
            .commit()
            .await
            .map_err(|e| AppError::Database(format!("Transaction commit failed: {}", e)))?;

        tracing::info!(
            user_id,
            run_id,
            distance_m = metrics.total_distance_m,
            credited_km = %credit_km,
            "Run finished and credited"
        );

        Ok(FinishOutcome {
            user_id,
            credited_km: credit_km,
            wallet_balance: wallet.km_balance,
        })
    }

    /// Atomically donate: check the balance, debit the wallet, and append
    /// the ledger debit.
    ///
    /// The balance read and both writes share one transaction, so two
    /// concurrent donations cannot both pass a stale sufficiency check and
    /// overdraw the wallet.
    ///
    /// Returns the balance after the debit.
    pub async fn donate_atomic(
        &self,
        user_id: u64,
        campaign_id: u32,
        amount_km: Decimal,
        memo: &str,
    ) -> Result<Decimal, AppError> {
        // Begin a transaction
        let mut transaction = self
            .get_client()?
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        // 1. Read the balance within the transaction
        let wallet: Option<Wallet> = self
            .get_client()?
            .fluent()
            .select()
            .by_id_in(collections::DONATION_WALLET)
            .obj()
            .one(&user_id.to_string())
            .await
            .map_err(|e| {
                AppError::Database(format!("Failed to read wallet in transaction: {}", e))
            })?;

        let mut wallet = match wallet {
            Some(wallet) => wallet,
            None => {
                let _ = transaction.rollback().await;
                return Err(AppError::InsufficientBalance(format!(
                    "User {} has no donation balance",
                    user_id
                )));
            }
        };

        // 2. Check sufficiency and debit
        if let Err(e) = wallet.debit(amount_km) {
            let _ = transaction.rollback().await;
            return Err(e);
        }

        let entry = LedgerEntry::debit(
            user_id,
            amount_km,
            campaign_id,
            memo,
            format_utc_rfc3339(Utc::now()),
        );

        // 3. Stage the wallet and ledger writes
        self.get_client()?
            .fluent()
            .update()
            .in_col(collections::DONATION_WALLET)
            .document_id(user_id.to_string())
            .object(&wallet)
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add wallet to transaction: {}", e))
            })?;

        self.get_client()?
            .fluent()
            .update()
            .in_col(collections::DONATION_LEDGER)
            .document_id(&entry.id)
            .object(&entry)
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!(
                    "Failed to add ledger entry to transaction: {}",
                    e
                ))
            })?;

        // 4. Commit the transaction atomically
        transaction
            .commit()
            .await
            .map_err(|e| AppError::Database(format!("Transaction commit failed: {}", e)))?;

        tracing::info!(
            user_id,
            campaign_id,
            amount_km = %amount_km,
            balance = %wallet.km_balance,
            "Donation debited"
        );

        Ok(wallet.km_balance)
    }
}
