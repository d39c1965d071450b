//! Report routes: profit-and-loss, balance sheet, cash flow, and tax.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use chrono::{Datelike, NaiveDate, Utc};
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use super::internal_error;
use crate::{AppState, middleware::AuthUser};
use tally_core::reports::{ReportError, ReportWindow};
use tally_db::ReportRepository;

/// Creates the report routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/reports/profit-and-loss", get(profit_and_loss))
        .route("/reports/balance-sheet", get(balance_sheet))
        .route("/reports/cash-flow", get(cash_flow))
        .route("/reports/tax", get(tax_report))
}

// ============================================================================
// Request Types
// ============================================================================

/// Query parameters for windowed reports.
#[derive(Debug, Deserialize)]
pub struct WindowQuery {
    /// Report year; defaults to the current year.
    pub year: Option<i32>,
    /// 1-indexed month narrowing the window to one calendar month.
    pub month: Option<u32>,
}

/// Query parameters for the tax report.
#[derive(Debug, Deserialize)]
pub struct TaxQuery {
    /// Range start (YYYY-MM-DD), inclusive.
    pub start_date: Option<NaiveDate>,
    /// Range end (YYYY-MM-DD), inclusive.
    pub end_date: Option<NaiveDate>,
    /// Narrow to one payment method.
    pub payment_method: Option<String>,
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET `/reports/profit-and-loss` - Income vs expense over a window.
async fn profit_and_loss(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<WindowQuery>,
) -> impl IntoResponse {
    let window = match resolve_window(&query) {
        Ok(window) => window,
        Err(response) => return response,
    };

    let repo = ReportRepository::new((*state.db).clone());
    match repo.profit_and_loss(window).await {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to build profit-and-loss report");
            internal_error()
        }
    }
}

/// GET `/reports/balance-sheet` - Instantaneous asset/liability snapshot.
async fn balance_sheet(State(state): State<AppState>, _auth: AuthUser) -> impl IntoResponse {
    let repo = ReportRepository::new((*state.db).clone());

    match repo.balance_sheet().await {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to build balance sheet");
            internal_error()
        }
    }
}

/// GET `/reports/cash-flow` - Inflow/outflow/financing over a window.
async fn cash_flow(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<WindowQuery>,
) -> impl IntoResponse {
    let window = match resolve_window(&query) {
        Ok(window) => window,
        Err(response) => return response,
    };

    let repo = ReportRepository::new((*state.db).clone());
    match repo.cash_flow(window).await {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to build cash-flow report");
            internal_error()
        }
    }
}

/// GET `/reports/tax` - Tax collected vs tax paid.
async fn tax_report(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<TaxQuery>,
) -> impl IntoResponse {
    if let (Some(start), Some(end)) = (query.start_date, query.end_date)
        && let Err(e) = ReportWindow::from_bounds(start, end)
    {
        return invalid_period(&e);
    }

    let repo = ReportRepository::new((*state.db).clone());
    match repo
        .tax_summary(query.start_date, query.end_date, query.payment_method)
        .await
    {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to build tax report");
            internal_error()
        }
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

fn resolve_window(query: &WindowQuery) -> Result<ReportWindow, axum::response::Response> {
    let year = query.year.unwrap_or_else(|| Utc::now().year());
    ReportWindow::resolve(year, query.month).map_err(|e| invalid_period(&e))
}

fn invalid_period(err: &ReportError) -> axum::response::Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({
            "error": "invalid_period",
            "message": err.to_string()
        })),
    )
        .into_response()
}
