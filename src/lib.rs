// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! ValueRun: turn finished runs into donatable kilometers
//!
//! This crate provides the backend API for recording runs, rolling up daily
//! distance, and managing the donation wallet and ledger that finished runs
//! feed into.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::FirestoreDb;
use services::{DonationService, ReportService, RunService};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: FirestoreDb,
    pub runs: RunService,
    pub reports: ReportService,
    pub donations: DonationService,
}
