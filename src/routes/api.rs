// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API routes for runs, reports, and donations.
//!
//! `userId` is taken from the request as-is; authentication happens
//! upstream of this service.

use crate::error::Result;
use crate::models::wallet::format_km;
use crate::models::Campaign;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/runs/start", post(start_run))
        .route("/api/runs/{run_id}/finish", post(finish_run))
        .route("/api/report/weekly", get(weekly_report))
        .route("/api/report/monthly", get(monthly_report))
        .route("/api/summary/total", get(total_summary))
        .route("/api/donation/recent", get(recent_donations))
        .route("/api/donation/campaigns", get(list_campaigns))
        .route("/api/donation/donate", post(donate))
}

// ─── Runs ────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StartRunRequest {
    user_id: u64,
    started_at: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartRunResponse {
    pub run_id: String,
}

/// Start a new run.
async fn start_run(
    State(state): State<Arc<AppState>>,
    Json(req): Json<StartRunRequest>,
) -> Result<Json<StartRunResponse>> {
    let run_id = state.runs.start_run(req.user_id, &req.started_at).await?;
    Ok(Json(StartRunResponse { run_id }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FinishRunRequest {
    finished_at: String,
    total_distance_km: Decimal,
    total_seconds: i64,
    #[serde(default)]
    calories: i64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinishRunResponse {
    pub total_distance_km: Decimal,
    pub wallet_balance: Decimal,
}

/// Finish a run and settle its accounting.
async fn finish_run(
    State(state): State<Arc<AppState>>,
    Path(run_id): Path<String>,
    Json(req): Json<FinishRunRequest>,
) -> Result<Json<FinishRunResponse>> {
    let summary = state
        .runs
        .finish_run(
            &run_id,
            &req.finished_at,
            req.total_distance_km,
            req.total_seconds,
            req.calories,
        )
        .await?;

    Ok(Json(FinishRunResponse {
        total_distance_km: summary.total_distance_km,
        wallet_balance: summary.wallet_balance,
    }))
}

// ─── Reports ─────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserQuery {
    user_id: u64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyReportResponse {
    pub week_label: String,
    pub daily_distances: [Decimal; 7],
    pub total_distance: Decimal,
    pub total_runs: u32,
}

/// Distances for the current week, Monday-first.
async fn weekly_report(
    State(state): State<Arc<AppState>>,
    Query(params): Query<UserQuery>,
) -> Result<Json<WeeklyReportResponse>> {
    let report = state.reports.weekly_report(params.user_id).await?;

    Ok(Json(WeeklyReportResponse {
        week_label: report.week_label,
        daily_distances: report.daily_distances,
        total_distance: report.total_distance,
        total_runs: report.total_runs,
    }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MonthlyQuery {
    user_id: u64,
    year: i32,
    month: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyRecordResponse {
    pub day: u32,
    pub distance: Decimal,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyReportResponse {
    pub month_label: String,
    pub daily_records: Vec<DailyRecordResponse>,
    pub total_distance: Decimal,
    pub total_runs: u32,
}

/// Per-day distances for one calendar month.
async fn monthly_report(
    State(state): State<Arc<AppState>>,
    Query(params): Query<MonthlyQuery>,
) -> Result<Json<MonthlyReportResponse>> {
    let report = state
        .reports
        .monthly_report(params.user_id, params.year, params.month)
        .await?;

    Ok(Json(MonthlyReportResponse {
        month_label: report.month_label,
        daily_records: report
            .daily_records
            .into_iter()
            .map(|r| DailyRecordResponse {
                day: r.day,
                distance: r.distance,
            })
            .collect(),
        total_distance: report.total_distance,
        total_runs: report.total_runs,
    }))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalSummaryResponse {
    pub total_distance_km: String,
    pub donated_km: String,
    pub available_km: String,
}

/// Lifetime distance run, donated, and available.
async fn total_summary(
    State(state): State<Arc<AppState>>,
    Query(params): Query<UserQuery>,
) -> Result<Json<TotalSummaryResponse>> {
    let summary = state.reports.total_summary(params.user_id).await?;

    Ok(Json(TotalSummaryResponse {
        total_distance_km: format_km(summary.total_distance_km),
        donated_km: format_km(summary.donated_km),
        available_km: format_km(summary.available_km),
    }))
}

// ─── Donations ───────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DonationHistoryEntry {
    pub date: String,
    pub distance_km: String,
}

#[derive(Serialize)]
pub struct RecentDonationsResponse {
    pub history: Vec<DonationHistoryEntry>,
}

/// The user's most recent donations, newest first.
async fn recent_donations(
    State(state): State<Arc<AppState>>,
    Query(params): Query<UserQuery>,
) -> Result<Json<RecentDonationsResponse>> {
    let records = state.donations.recent_donations(params.user_id).await?;

    Ok(Json(RecentDonationsResponse {
        history: records
            .into_iter()
            .map(|r| DonationHistoryEntry {
                date: r.date,
                distance_km: r.distance_km,
            })
            .collect(),
    }))
}

#[derive(Serialize)]
pub struct CampaignsResponse {
    pub campaigns: Vec<Campaign>,
}

/// Static campaign catalog.
async fn list_campaigns(State(state): State<Arc<AppState>>) -> Json<CampaignsResponse> {
    Json(CampaignsResponse {
        campaigns: state.donations.campaigns(),
    })
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DonateRequest {
    user_id: u64,
    campaign_id: u32,
    donate_km: Decimal,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DonateResponse {
    pub success: bool,
    pub donated_km: Decimal,
}

/// Donate km from the wallet to a campaign.
async fn donate(
    State(state): State<Arc<AppState>>,
    Json(req): Json<DonateRequest>,
) -> Result<Json<DonateResponse>> {
    let donated = state
        .donations
        .donate(req.user_id, req.campaign_id, req.donate_km)
        .await?;

    Ok(Json(DonateResponse {
        success: true,
        donated_km: donated,
    }))
}
