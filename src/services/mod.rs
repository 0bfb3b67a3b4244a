// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Business logic services.

pub mod donations;
pub mod reports;
pub mod runs;

pub use donations::DonationService;
pub use reports::ReportService;
pub use runs::RunService;
