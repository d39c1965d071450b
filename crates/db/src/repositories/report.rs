//! Report repository: read-only aggregate queries feeding the pure report
//! builders.
//!
//! Results are point-in-time snapshots; no locks are taken. Soft-deleted
//! transactions never contribute to a report.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, FromQueryResult, QueryFilter, QuerySelect,
};

use tally_core::reports::{
    BalanceSheetReport, CashFlowReport, ProfitAndLossReport, ReportService, ReportWindow,
    TaxReport,
};

use crate::entities::{
    accounts,
    sea_orm_active_enums::{AccountType, TransactionKind},
    transactions,
};

/// Error types for report queries.
#[derive(Debug, thiserror::Error)]
pub enum ReportQueryError {
    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

#[derive(Debug, FromQueryResult)]
struct SumRow {
    total: Option<Decimal>,
}

/// Report repository for financial aggregate queries.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    db: DatabaseConnection,
}

impl ReportRepository {
    /// Creates a new report repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Builds a profit-and-loss report over the window.
    ///
    /// Income and expense figures are pre-tax `amount` sums; the tax
    /// component lives in [`Self::tax_summary`].
    pub async fn profit_and_loss(
        &self,
        window: ReportWindow,
    ) -> Result<ProfitAndLossReport, ReportQueryError> {
        let total_income = self
            .sum_amount(&[TransactionKind::Income], window)
            .await?;
        let total_expense = self
            .sum_amount(&[TransactionKind::Expense], window)
            .await?;

        Ok(ReportService::build_profit_and_loss(
            window,
            total_income,
            total_expense,
        ))
    }

    /// Builds an instantaneous balance-sheet snapshot from current account
    /// balances.
    pub async fn balance_sheet(&self) -> Result<BalanceSheetReport, ReportQueryError> {
        let total_assets = self.sum_balance(AccountType::Asset).await?;
        let total_liabilities = self.sum_balance(AccountType::Liability).await?;

        Ok(ReportService::build_balance_sheet(
            Utc::now().date_naive(),
            total_assets,
            total_liabilities,
        ))
    }

    /// Builds a cash-flow report over the window.
    pub async fn cash_flow(&self, window: ReportWindow) -> Result<CashFlowReport, ReportQueryError> {
        let inflow = self.sum_amount(&[TransactionKind::Income], window).await?;
        let outflow = self.sum_amount(&[TransactionKind::Expense], window).await?;
        let financing = self
            .sum_amount(&[TransactionKind::Loan, TransactionKind::Investment], window)
            .await?;

        Ok(ReportService::build_cash_flow(
            window, inflow, outflow, financing,
        ))
    }

    /// Builds a tax summary: tax collected on income versus tax paid on
    /// expenses, optionally narrowed by date range and payment method.
    pub async fn tax_summary(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        payment_method: Option<String>,
    ) -> Result<TaxReport, ReportQueryError> {
        let output_tax = self
            .sum_tax(TransactionKind::Income, start, end, payment_method.as_deref())
            .await?;
        let input_tax = self
            .sum_tax(TransactionKind::Expense, start, end, payment_method.as_deref())
            .await?;

        Ok(ReportService::build_tax_report(
            start,
            end,
            payment_method,
            output_tax,
            input_tax,
        ))
    }

    /// Sums the pre-tax `amount` of visible transactions of the given kinds
    /// inside the window.
    async fn sum_amount(
        &self,
        kinds: &[TransactionKind],
        window: ReportWindow,
    ) -> Result<Decimal, ReportQueryError> {
        let row = transactions::Entity::find()
            .select_only()
            .column_as(transactions::Column::Amount.sum(), "total")
            .filter(transactions::Column::IsDeleted.eq(false))
            .filter(transactions::Column::Kind.is_in(kinds.iter().copied()))
            .filter(transactions::Column::TxnDate.gte(window.start))
            .filter(transactions::Column::TxnDate.lte(window.end))
            .into_model::<SumRow>()
            .one(&self.db)
            .await?;

        Ok(row.and_then(|r| r.total).unwrap_or_default())
    }

    /// Sums the `tax_amount` of visible transactions of one kind, with
    /// optional date and payment-method narrowing.
    async fn sum_tax(
        &self,
        kind: TransactionKind,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        payment_method: Option<&str>,
    ) -> Result<Decimal, ReportQueryError> {
        let mut query = transactions::Entity::find()
            .select_only()
            .column_as(transactions::Column::TaxAmount.sum(), "total")
            .filter(transactions::Column::IsDeleted.eq(false))
            .filter(transactions::Column::Kind.eq(kind));

        if let Some(start) = start {
            query = query.filter(transactions::Column::TxnDate.gte(start));
        }
        if let Some(end) = end {
            query = query.filter(transactions::Column::TxnDate.lte(end));
        }
        if let Some(payment_method) = payment_method {
            query = query.filter(transactions::Column::PaymentMode.eq(payment_method));
        }

        let row = query.into_model::<SumRow>().one(&self.db).await?;
        Ok(row.and_then(|r| r.total).unwrap_or_default())
    }

    /// Sums current balances over accounts of one classification.
    async fn sum_balance(&self, account_type: AccountType) -> Result<Decimal, ReportQueryError> {
        let row = accounts::Entity::find()
            .select_only()
            .column_as(accounts::Column::Balance.sum(), "total")
            .filter(accounts::Column::AccountType.eq(account_type))
            .into_model::<SumRow>()
            .one(&self.db)
            .await?;

        Ok(row.and_then(|r| r.total).unwrap_or_default())
    }
}
