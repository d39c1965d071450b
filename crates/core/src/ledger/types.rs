//! Ledger domain types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Transaction kind.
///
/// The kind fixes the sign of the balance effect: income, loan, and
/// investment add the taxed total to the owning account, expense subtracts it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money earned.
    Income,
    /// Money spent.
    Expense,
    /// Borrowed funds received.
    Loan,
    /// Capital injected.
    Investment,
}

impl TransactionKind {
    /// Whether this kind increases the owning account's balance.
    #[must_use]
    pub const fn is_inflow(self) -> bool {
        matches!(self, Self::Income | Self::Loan | Self::Investment)
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Income => write!(f, "income"),
            Self::Expense => write!(f, "expense"),
            Self::Loan => write!(f, "loan"),
            Self::Investment => write!(f, "investment"),
        }
    }
}

impl std::str::FromStr for TransactionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            "loan" => Ok(Self::Loan),
            "investment" => Ok(Self::Investment),
            _ => Err(format!("Unknown transaction kind: {s}")),
        }
    }
}

/// Input for creating a transaction, before resolution.
#[derive(Debug, Clone)]
pub struct NewTransactionInput {
    /// Transaction kind.
    pub kind: TransactionKind,
    /// Category label, e.g. "Sales".
    pub category: String,
    /// Pre-tax base amount.
    pub amount: Decimal,
    /// Flat tax percentage; missing means zero.
    pub tax_rate: Option<Decimal>,
    /// How the money moved, e.g. "Cash".
    pub payment_mode: String,
    /// Owning account.
    pub account_id: Uuid,
    /// Effective date; missing means today.
    pub txn_date: Option<NaiveDate>,
    /// Free-text description.
    pub description: Option<String>,
    /// Creating user.
    pub created_by: Uuid,
}

/// A transaction with all derived fields computed.
///
/// This is what the database layer persists, together with the
/// [`BalanceChange`] it implies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTransaction {
    /// Transaction kind.
    pub kind: TransactionKind,
    /// Category label.
    pub category: String,
    /// Pre-tax base amount.
    pub amount: Decimal,
    /// Flat tax percentage.
    pub tax_rate: Decimal,
    /// Derived tax portion.
    pub tax_amount: Decimal,
    /// Derived taxed total (`amount + tax_amount`).
    pub total: Decimal,
    /// Payment mode.
    pub payment_mode: String,
    /// Owning account.
    pub account_id: Uuid,
    /// Effective date.
    pub txn_date: NaiveDate,
    /// Free-text description.
    pub description: Option<String>,
    /// Creating user.
    pub created_by: Uuid,
}

/// Allow-listed partial update of a transaction.
///
/// Changing `amount` or `tax_rate` forces a tax/total recomputation;
/// changing `kind` or `account_id` redirects the signed balance effect.
#[derive(Debug, Clone, Default)]
pub struct TransactionPatch {
    /// New kind.
    pub kind: Option<TransactionKind>,
    /// New category label.
    pub category: Option<String>,
    /// New pre-tax amount.
    pub amount: Option<Decimal>,
    /// New tax percentage.
    pub tax_rate: Option<Decimal>,
    /// New payment mode.
    pub payment_mode: Option<String>,
    /// New owning account.
    pub account_id: Option<Uuid>,
    /// New effective date.
    pub txn_date: Option<NaiveDate>,
    /// New description (`Some(None)` clears it).
    pub description: Option<Option<String>>,
}

impl TransactionPatch {
    /// Whether applying this patch requires recomputing tax and total.
    #[must_use]
    pub const fn needs_repricing(&self) -> bool {
        self.amount.is_some() || self.tax_rate.is_some()
    }
}

/// A signed delta to apply to one account's balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BalanceChange {
    /// Account whose balance moves.
    pub account_id: Uuid,
    /// Signed amount to add.
    pub delta: Decimal,
}

/// Outcome of resolving a transaction edit.
///
/// The database layer applies `reversal`, persists `updated`, and applies
/// `apply`, all inside one atomic unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditResolution {
    /// Undo of the currently stored effect, against the current account.
    pub reversal: BalanceChange,
    /// The new effect, against the (possibly different) new account.
    pub apply: BalanceChange,
    /// The merged and recomputed record to persist.
    pub updated: ResolvedTransaction,
}
