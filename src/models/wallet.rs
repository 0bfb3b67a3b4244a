// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Donation wallet and ledger models.
//!
//! The wallet is a materialized view of the ledger: every balance change is
//! paired with an append-only ledger entry in the same transaction, and
//! `km_balance` must always equal the signed sum of the user's entries.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Round a km amount to the 2-decimal resolution used for accounting.
pub fn round_km(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Format a km amount with exactly 2 decimals for API responses.
pub fn format_km(amount: Decimal) -> String {
    let mut rounded = round_km(amount);
    rounded.rescale(2);
    rounded.to_string()
}

/// Per-user donation balance, denominated in kilometers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wallet {
    pub user_id: u64,
    pub km_balance: Decimal,
}

impl Wallet {
    /// Empty wallet, created lazily on first credit.
    pub fn empty(user_id: u64) -> Self {
        Self {
            user_id,
            km_balance: Decimal::ZERO,
        }
    }

    /// Add a credit. Amounts must be positive.
    pub fn credit(&mut self, amount_km: Decimal) -> Result<(), AppError> {
        if amount_km <= Decimal::ZERO {
            return Err(AppError::InvalidInput(format!(
                "Credit amount must be positive, got {}",
                amount_km
            )));
        }
        self.km_balance += amount_km;
        Ok(())
    }

    /// Subtract a debit, refusing to overdraw.
    pub fn debit(&mut self, amount_km: Decimal) -> Result<(), AppError> {
        if amount_km <= Decimal::ZERO {
            return Err(AppError::InvalidInput(format!(
                "Debit amount must be positive, got {}",
                amount_km
            )));
        }
        if amount_km > self.km_balance {
            return Err(AppError::InsufficientBalance(format!(
                "Balance {} km is less than requested {} km",
                self.km_balance, amount_km
            )));
        }
        self.km_balance -= amount_km;
        Ok(())
    }
}

/// Direction of a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LedgerEntryType {
    Credit,
    Debit,
}

/// Append-only record of a balance-affecting event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Entry ID (also used as document ID)
    pub id: String,
    pub user_id: u64,
    pub entry_type: LedgerEntryType,
    /// Always positive; the sign comes from `entry_type`.
    pub amount_km: Decimal,
    /// Source run for credits
    pub ref_run_id: Option<String>,
    /// Target campaign for debits
    pub campaign_id: Option<u32>,
    pub memo: String,
    /// When the entry was written (RFC3339, UTC)
    pub created_at: String,
}

impl LedgerEntry {
    /// Credit entry for a finished run. The document ID is derived from the
    /// run ID, so a run can be credited at most once.
    pub fn credit(
        user_id: u64,
        amount_km: Decimal,
        run_id: &str,
        memo: &str,
        created_at: String,
    ) -> Self {
        Self {
            id: format!("credit_{}", run_id),
            user_id,
            entry_type: LedgerEntryType::Credit,
            amount_km,
            ref_run_id: Some(run_id.to_string()),
            campaign_id: None,
            memo: memo.to_string(),
            created_at,
        }
    }

    /// Debit entry for a campaign donation.
    pub fn debit(
        user_id: u64,
        amount_km: Decimal,
        campaign_id: u32,
        memo: &str,
        created_at: String,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id,
            entry_type: LedgerEntryType::Debit,
            amount_km,
            ref_run_id: None,
            campaign_id: Some(campaign_id),
            memo: memo.to_string(),
            created_at,
        }
    }

    /// Signed contribution of this entry to the balance.
    pub fn signed_amount(&self) -> Decimal {
        match self.entry_type {
            LedgerEntryType::Credit => self.amount_km,
            LedgerEntryType::Debit => -self.amount_km,
        }
    }
}

/// Replay a set of entries into the balance they imply.
///
/// The wallet must always match this sum; integration and property tests
/// check the two against each other.
pub fn signed_sum<'a>(entries: impl IntoIterator<Item = &'a LedgerEntry>) -> Decimal {
    entries.into_iter().map(LedgerEntry::signed_amount).sum()
}
