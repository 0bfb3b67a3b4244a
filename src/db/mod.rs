//! Database layer (Firestore).

pub mod firestore;

pub use firestore::FirestoreDb;

/// Collection names as constants.
pub mod collections {
    pub const RUNS: &str = "runs";
    pub const DAILY_STATS: &str = "daily_stats";
    pub const DONATION_WALLET: &str = "donation_wallet";
    pub const DONATION_LEDGER: &str = "donation_ledger";
}
