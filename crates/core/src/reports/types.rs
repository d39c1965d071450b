//! Report data types.
//!
//! Profit-and-loss and cash-flow figures are pre-tax `amount` sums; account
//! balances (and therefore the balance sheet) carry post-tax cash effects.
//! The tax report holds the tax component that separates the two views.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Tri-state outcome of a profit-and-loss window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProfitLossStatus {
    /// Net is positive.
    Profit,
    /// Net is negative.
    Loss,
    /// Net is exactly zero.
    BreakEven,
}

impl std::fmt::Display for ProfitLossStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Profit => write!(f, "profit"),
            Self::Loss => write!(f, "loss"),
            Self::BreakEven => write!(f, "break-even"),
        }
    }
}

/// Profit-and-loss report over a window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfitAndLossReport {
    /// Window start, inclusive.
    pub period_start: NaiveDate,
    /// Window end, inclusive.
    pub period_end: NaiveDate,
    /// Pre-tax income sum.
    pub total_income: Decimal,
    /// Pre-tax expense sum.
    pub total_expense: Decimal,
    /// `total_income - total_expense`.
    pub net: Decimal,
    /// Profit, loss, or break-even.
    pub status: ProfitLossStatus,
}

/// Instantaneous balance-sheet snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceSheetReport {
    /// Snapshot date.
    pub as_of: NaiveDate,
    /// Sum of asset account balances.
    pub total_assets: Decimal,
    /// Sum of liability account balances.
    pub total_liabilities: Decimal,
    /// `total_assets - total_liabilities`.
    pub equity: Decimal,
}

/// Cash-flow report over a window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashFlowReport {
    /// Window start, inclusive.
    pub period_start: NaiveDate,
    /// Window end, inclusive.
    pub period_end: NaiveDate,
    /// Pre-tax income sum.
    pub inflow: Decimal,
    /// Pre-tax expense sum.
    pub outflow: Decimal,
    /// Pre-tax loan + investment sum.
    pub financing: Decimal,
    /// `inflow - outflow`.
    pub net: Decimal,
}

/// Tax summary over an optional window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxReport {
    /// Range start, if the caller narrowed it.
    pub period_start: Option<NaiveDate>,
    /// Range end, if the caller narrowed it.
    pub period_end: Option<NaiveDate>,
    /// Payment method filter, if any.
    pub payment_method: Option<String>,
    /// Tax collected on income.
    pub output_tax: Decimal,
    /// Tax paid on expenses.
    pub input_tax: Decimal,
    /// `output_tax - input_tax`.
    pub net_tax: Decimal,
}
