//! Transaction repository: atomic create, reverse-then-reapply edit, and
//! soft delete.
//!
//! Every mutation pairs the transaction record with its account-balance
//! effect inside one database transaction; either both become visible or
//! neither does.

use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set, TransactionTrait,
};
use tracing::info;
use uuid::Uuid;

use tally_core::ledger::{
    LedgerError, NewTransactionInput, PostingService, ResolvedTransaction, TransactionPatch,
};

use crate::entities::{sea_orm_active_enums::TransactionKind, transactions};
use crate::repositories::account::{AccountError, AccountRepository};

/// Error types for transaction operations.
#[derive(Debug, thiserror::Error)]
pub enum TransactionError {
    /// Transaction not found (or already soft-deleted).
    #[error("Transaction not found: {0}")]
    NotFound(Uuid),

    /// Referenced account not found.
    #[error("Account not found: {0}")]
    AccountNotFound(Uuid),

    /// A required field is missing or empty.
    #[error(transparent)]
    Validation(#[from] LedgerError),

    /// Another writer updated the account balance first.
    #[error("Concurrent modification detected for account {0}, please retry")]
    ConcurrentModification(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<AccountError> for TransactionError {
    fn from(err: AccountError) -> Self {
        match err {
            AccountError::NotFound(id) => Self::AccountNotFound(id),
            AccountError::ConcurrentModification(id) => Self::ConcurrentModification(id),
            AccountError::Database(e) => Self::Database(e),
            other => Self::Database(DbErr::Custom(other.to_string())),
        }
    }
}

/// Filter options for listing transactions.
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    /// Filter by kind.
    pub kind: Option<TransactionKind>,
    /// Filter by owning account.
    pub account_id: Option<Uuid>,
    /// Filter by date range start (inclusive).
    pub date_from: Option<NaiveDate>,
    /// Filter by date range end (inclusive).
    pub date_to: Option<NaiveDate>,
    /// Include soft-deleted records. Off by default.
    pub include_deleted: bool,
}

/// Transaction repository for atomic ledger mutations.
#[derive(Debug, Clone)]
pub struct TransactionRepository {
    db: DatabaseConnection,
}

impl TransactionRepository {
    /// Creates a new transaction repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a transaction and applies its signed total to the owning
    /// account, atomically.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for missing fields, `AccountNotFound` when the
    /// account is absent, and `ConcurrentModification` when the balance
    /// write loses a race.
    pub async fn create_transaction(
        &self,
        input: NewTransactionInput,
    ) -> Result<transactions::Model, TransactionError> {
        let resolved = PostingService::resolve_create(input, Utc::now().date_naive())?;
        let change = PostingService::balance_change(&resolved);

        let txn = self.db.begin().await?;

        AccountRepository::apply_delta(&txn, change.account_id, change.delta).await?;

        let now = Utc::now().into();
        let model = transactions::ActiveModel {
            id: Set(Uuid::new_v4()),
            kind: Set(resolved.kind.into()),
            category: Set(resolved.category),
            amount: Set(resolved.amount),
            tax_rate: Set(resolved.tax_rate),
            tax_amount: Set(resolved.tax_amount),
            total: Set(resolved.total),
            payment_mode: Set(resolved.payment_mode),
            account_id: Set(resolved.account_id),
            txn_date: Set(resolved.txn_date),
            description: Set(resolved.description),
            created_by: Set(resolved.created_by),
            is_deleted: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        info!(
            transaction_id = %model.id,
            account_id = %model.account_id,
            total = %model.total,
            "Transaction created"
        );
        Ok(model)
    }

    /// Edits a transaction by reversing its current effect, merging the
    /// patch, and applying the new effect, all in one atomic unit.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the record is absent or soft-deleted.
    pub async fn edit_transaction(
        &self,
        id: Uuid,
        patch: TransactionPatch,
    ) -> Result<transactions::Model, TransactionError> {
        let txn = self.db.begin().await?;

        let model = transactions::Entity::find_by_id(id)
            .filter(transactions::Column::IsDeleted.eq(false))
            .one(&txn)
            .await?
            .ok_or(TransactionError::NotFound(id))?;

        let current = resolved_from_model(&model);
        let edit = PostingService::resolve_edit(&current, patch)?;

        AccountRepository::apply_delta(&txn, edit.reversal.account_id, edit.reversal.delta).await?;
        AccountRepository::apply_delta(&txn, edit.apply.account_id, edit.apply.delta).await?;

        let updated = edit.updated;
        let mut active: transactions::ActiveModel = model.into();
        active.kind = Set(updated.kind.into());
        active.category = Set(updated.category);
        active.amount = Set(updated.amount);
        active.tax_rate = Set(updated.tax_rate);
        active.tax_amount = Set(updated.tax_amount);
        active.total = Set(updated.total);
        active.payment_mode = Set(updated.payment_mode);
        active.account_id = Set(updated.account_id);
        active.txn_date = Set(updated.txn_date);
        active.description = Set(updated.description);
        active.updated_at = Set(Utc::now().into());

        let model = active.update(&txn).await?;

        txn.commit().await?;

        info!(transaction_id = %model.id, "Transaction edited");
        Ok(model)
    }

    /// Soft-deletes a transaction and reverses its balance effect in the
    /// same unit, so account balances always equal the sum of visible
    /// transactions.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the record is absent or already deleted.
    pub async fn soft_delete_transaction(
        &self,
        id: Uuid,
    ) -> Result<transactions::Model, TransactionError> {
        let txn = self.db.begin().await?;

        let model = transactions::Entity::find_by_id(id)
            .filter(transactions::Column::IsDeleted.eq(false))
            .one(&txn)
            .await?
            .ok_or(TransactionError::NotFound(id))?;

        let delta = PostingService::reversal_delta(model.kind.into(), model.total);
        AccountRepository::apply_delta(&txn, model.account_id, delta).await?;

        let mut active: transactions::ActiveModel = model.into();
        active.is_deleted = Set(true);
        active.updated_at = Set(Utc::now().into());
        let model = active.update(&txn).await?;

        txn.commit().await?;

        info!(transaction_id = %model.id, "Transaction soft-deleted");
        Ok(model)
    }

    /// Lists transactions with optional filters. Soft-deleted records are
    /// excluded unless explicitly requested.
    pub async fn list_transactions(
        &self,
        filter: TransactionFilter,
    ) -> Result<Vec<transactions::Model>, TransactionError> {
        let mut query = transactions::Entity::find();

        if !filter.include_deleted {
            query = query.filter(transactions::Column::IsDeleted.eq(false));
        }
        if let Some(kind) = filter.kind {
            query = query.filter(transactions::Column::Kind.eq(kind));
        }
        if let Some(account_id) = filter.account_id {
            query = query.filter(transactions::Column::AccountId.eq(account_id));
        }
        if let Some(date_from) = filter.date_from {
            query = query.filter(transactions::Column::TxnDate.gte(date_from));
        }
        if let Some(date_to) = filter.date_to {
            query = query.filter(transactions::Column::TxnDate.lte(date_to));
        }

        Ok(query
            .order_by_desc(transactions::Column::TxnDate)
            .order_by_desc(transactions::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }

    /// Gets a transaction by ID. Soft-deleted records count as absent unless
    /// explicitly requested.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the record is absent or hidden.
    pub async fn get_transaction(
        &self,
        id: Uuid,
        include_deleted: bool,
    ) -> Result<transactions::Model, TransactionError> {
        let mut query = transactions::Entity::find_by_id(id);

        if !include_deleted {
            query = query.filter(transactions::Column::IsDeleted.eq(false));
        }

        query
            .one(&self.db)
            .await?
            .ok_or(TransactionError::NotFound(id))
    }
}

/// Rebuilds the core view of a stored transaction for edit resolution.
fn resolved_from_model(model: &transactions::Model) -> ResolvedTransaction {
    ResolvedTransaction {
        kind: model.kind.into(),
        category: model.category.clone(),
        amount: model.amount,
        tax_rate: model.tax_rate,
        tax_amount: model.tax_amount,
        total: model.total,
        payment_mode: model.payment_mode.clone(),
        account_id: model.account_id,
        txn_date: model.txn_date,
        description: model.description.clone(),
        created_by: model.created_by,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample_model(kind: TransactionKind) -> transactions::Model {
        let now = Utc::now().fixed_offset();
        transactions::Model {
            id: Uuid::new_v4(),
            kind,
            category: "Sales".to_string(),
            amount: dec!(1000),
            tax_rate: dec!(10),
            tax_amount: dec!(100),
            total: dec!(1100),
            payment_mode: "Cash".to_string(),
            account_id: Uuid::new_v4(),
            txn_date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            description: Some("March batch".to_string()),
            created_by: Uuid::new_v4(),
            is_deleted: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_resolved_from_model_preserves_fields() {
        let model = sample_model(TransactionKind::Income);
        let resolved = resolved_from_model(&model);

        assert_eq!(resolved.amount, model.amount);
        assert_eq!(resolved.total, model.total);
        assert_eq!(resolved.account_id, model.account_id);
        assert_eq!(resolved.txn_date, model.txn_date);
        assert_eq!(resolved.description.as_deref(), Some("March batch"));
    }

    #[test]
    fn test_soft_delete_reversal_sign() {
        let income = sample_model(TransactionKind::Income);
        let delta = PostingService::reversal_delta(income.kind.into(), income.total);
        assert_eq!(delta, dec!(-1100));

        let expense = sample_model(TransactionKind::Expense);
        let delta = PostingService::reversal_delta(expense.kind.into(), expense.total);
        assert_eq!(delta, dec!(1100));
    }

    #[test]
    fn test_account_error_mapping() {
        let id = Uuid::new_v4();
        assert!(matches!(
            TransactionError::from(AccountError::NotFound(id)),
            TransactionError::AccountNotFound(mapped) if mapped == id
        ));
        assert!(matches!(
            TransactionError::from(AccountError::ConcurrentModification(id)),
            TransactionError::ConcurrentModification(mapped) if mapped == id
        ));
    }
}
