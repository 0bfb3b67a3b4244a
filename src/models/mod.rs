// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod campaign;
pub mod daily;
pub mod run;
pub mod wallet;

pub use campaign::Campaign;
pub use daily::DailyStat;
pub use run::{Run, RunMetrics, RunStatus};
pub use wallet::{LedgerEntry, LedgerEntryType, Wallet};
