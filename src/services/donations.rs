// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Donation flows: spending earned km on campaigns.

use rust_decimal::Decimal;

use crate::db::FirestoreDb;
use crate::error::{AppError, Result};
use crate::models::campaign;
use crate::models::wallet::format_km;
use crate::models::Campaign;

/// Memo recorded on every donation ledger entry.
const DONATION_MEMO: &str = "Campaign donation";

/// How many entries the recent-donations feed returns.
const RECENT_DONATIONS_LIMIT: u32 = 5;

/// Donation operations.
#[derive(Clone)]
pub struct DonationService {
    db: FirestoreDb,
}

/// One line of the recent-donations feed.
#[derive(Debug, PartialEq)]
pub struct DonationRecord {
    /// Calendar date (YYYY-MM-DD) of the donation
    pub date: String,
    /// Donated amount, 2-decimal formatted
    pub distance_km: String,
}

impl DonationService {
    pub fn new(db: FirestoreDb) -> Self {
        Self { db }
    }

    /// Donate km from the user's wallet to a campaign.
    ///
    /// Returns the donated amount on success.
    pub async fn donate(
        &self,
        user_id: u64,
        campaign_id: u32,
        donate_km: Decimal,
    ) -> Result<Decimal> {
        if donate_km <= Decimal::ZERO {
            return Err(AppError::InvalidInput(format!(
                "Donation amount must be positive, got {}",
                donate_km
            )));
        }

        self.db
            .donate_atomic(user_id, campaign_id, donate_km, DONATION_MEMO)
            .await?;

        Ok(donate_km)
    }

    /// The user's most recent donations, newest first.
    pub async fn recent_donations(&self, user_id: u64) -> Result<Vec<DonationRecord>> {
        let entries = self
            .db
            .recent_debits(user_id, RECENT_DONATIONS_LIMIT)
            .await?;

        Ok(entries
            .iter()
            .map(|entry| DonationRecord {
                date: entry_date(&entry.created_at),
                distance_km: format_km(entry.amount_km),
            })
            .collect())
    }

    /// Static campaign catalog.
    pub fn campaigns(&self) -> Vec<Campaign> {
        campaign::catalog()
    }
}

/// Extract "YYYY-MM-DD" from an RFC3339 timestamp.
fn entry_date(created_at: &str) -> String {
    created_at.get(..10).unwrap_or(created_at).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_date() {
        assert_eq!(entry_date("2026-03-04T10:30:00Z"), "2026-03-04");
        // Too-short input passes through unchanged
        assert_eq!(entry_date("2026"), "2026");
    }
}
