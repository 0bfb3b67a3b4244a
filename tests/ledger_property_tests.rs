// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Property-based tests for the wallet/ledger accounting model.
//!
//! Invariants checked:
//! - The wallet balance always equals the signed sum of the ledger
//! - The balance never goes negative; over-debits are rejected without effect

use proptest::prelude::*;
use rust_decimal::Decimal;
use valuerun::models::wallet::{signed_sum, LedgerEntry, Wallet};

/// Positive km amounts at the 2-decimal accounting resolution.
fn amount_strategy() -> impl Strategy<Value = Decimal> {
    (1u64..100_000u64).prop_map(|hundredths| Decimal::new(hundredths as i64, 2))
}

#[derive(Debug, Clone)]
enum Op {
    Credit(Decimal),
    Debit(Decimal),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        amount_strategy().prop_map(Op::Credit),
        amount_strategy().prop_map(Op::Debit),
    ]
}

proptest! {
    #[test]
    fn wallet_always_matches_ledger_sum(ops in prop::collection::vec(op_strategy(), 0..50)) {
        let mut wallet = Wallet::empty(1);
        let mut ledger: Vec<LedgerEntry> = Vec::new();
        let now = "2026-01-01T00:00:00Z".to_string();

        for (i, op) in ops.iter().enumerate() {
            match op {
                Op::Credit(amount) => {
                    wallet.credit(*amount).unwrap();
                    ledger.push(LedgerEntry::credit(
                        1,
                        *amount,
                        &format!("run-{}", i),
                        "Run finished",
                        now.clone(),
                    ));
                }
                Op::Debit(amount) => {
                    // A rejected debit appends nothing
                    if wallet.debit(*amount).is_ok() {
                        ledger.push(LedgerEntry::debit(
                            1,
                            *amount,
                            1,
                            "Campaign donation",
                            now.clone(),
                        ));
                    }
                }
            }

            prop_assert_eq!(wallet.km_balance, signed_sum(&ledger));
            prop_assert!(wallet.km_balance >= Decimal::ZERO);
        }
    }

    #[test]
    fn debit_never_overdraws(credit in amount_strategy(), debit in amount_strategy()) {
        let mut wallet = Wallet::empty(7);
        wallet.credit(credit).unwrap();

        let result = wallet.debit(debit);
        if debit > credit {
            prop_assert!(result.is_err());
            prop_assert_eq!(wallet.km_balance, credit);
        } else {
            prop_assert!(result.is_ok());
            prop_assert_eq!(wallet.km_balance, credit - debit);
        }
    }

    #[test]
    fn ledger_entries_always_positive(amount in amount_strategy()) {
        let credit = LedgerEntry::credit(1, amount, "run-1", "Run finished",
            "2026-01-01T00:00:00Z".to_string());
        let debit = LedgerEntry::debit(1, amount, 2, "Campaign donation",
            "2026-01-01T00:00:00Z".to_string());

        prop_assert!(credit.amount_km > Decimal::ZERO);
        prop_assert!(debit.amount_km > Decimal::ZERO);
        prop_assert_eq!(credit.signed_amount(), amount);
        prop_assert_eq!(debit.signed_amount(), -amount);
    }
}
