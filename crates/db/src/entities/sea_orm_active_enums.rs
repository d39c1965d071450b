//! Database-side enums and conversions to the core domain enums.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Account classification stored in Postgres.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "account_type")]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    /// Things the business owns.
    #[sea_orm(string_value = "asset")]
    Asset,
    /// Things the business owes.
    #[sea_orm(string_value = "liability")]
    Liability,
    /// Revenue buckets.
    #[sea_orm(string_value = "income")]
    Income,
    /// Cost buckets.
    #[sea_orm(string_value = "expense")]
    Expense,
}

/// Transaction kind stored in Postgres.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "transaction_kind")]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money earned.
    #[sea_orm(string_value = "income")]
    Income,
    /// Money spent.
    #[sea_orm(string_value = "expense")]
    Expense,
    /// Borrowed funds received.
    #[sea_orm(string_value = "loan")]
    Loan,
    /// Capital injected.
    #[sea_orm(string_value = "investment")]
    Investment,
}

/// Invoice payment status stored in Postgres.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "payment_status")]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// Awaiting payment.
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Settled.
    #[sea_orm(string_value = "paid")]
    Paid,
}

/// User role stored in Postgres.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "user_role")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Full access.
    #[sea_orm(string_value = "admin")]
    Admin,
    /// Ledger mutation access.
    #[sea_orm(string_value = "accountant")]
    Accountant,
    /// Read-only access.
    #[sea_orm(string_value = "staff")]
    Staff,
}

impl From<tally_core::ledger::TransactionKind> for TransactionKind {
    fn from(kind: tally_core::ledger::TransactionKind) -> Self {
        use tally_core::ledger::TransactionKind as Core;
        match kind {
            Core::Income => Self::Income,
            Core::Expense => Self::Expense,
            Core::Loan => Self::Loan,
            Core::Investment => Self::Investment,
        }
    }
}

impl From<TransactionKind> for tally_core::ledger::TransactionKind {
    fn from(kind: TransactionKind) -> Self {
        match kind {
            TransactionKind::Income => Self::Income,
            TransactionKind::Expense => Self::Expense,
            TransactionKind::Loan => Self::Loan,
            TransactionKind::Investment => Self::Investment,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_round_trips_through_core() {
        for kind in [
            TransactionKind::Income,
            TransactionKind::Expense,
            TransactionKind::Loan,
            TransactionKind::Investment,
        ] {
            let core: tally_core::ledger::TransactionKind = kind.into();
            assert_eq!(TransactionKind::from(core), kind);
        }
    }
}
