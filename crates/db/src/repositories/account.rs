//! Account repository: CRUD plus the single place balances are mutated.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait, sea_query::Expr,
};
use tracing::info;
use uuid::Uuid;

use crate::entities::{accounts, sea_orm_active_enums::AccountType, transactions};

/// Error types for account operations.
#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    /// Account name already exists.
    #[error("Account name '{0}' already exists")]
    DuplicateName(String),

    /// Account not found.
    #[error("Account not found: {0}")]
    NotFound(Uuid),

    /// Cannot delete an account that still has visible transactions.
    #[error("Cannot delete account: {0} transactions reference it")]
    HasTransactions(u64),

    /// Another writer updated the account balance first.
    #[error("Concurrent modification detected for account {0}, please retry")]
    ConcurrentModification(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating an account.
#[derive(Debug, Clone)]
pub struct CreateAccountInput {
    /// Account classification.
    pub account_type: AccountType,
    /// Unique display name.
    pub name: String,
    /// Opening balance.
    pub opening_balance: Decimal,
    /// Free-form sub-classification tag, e.g. "Bank Account".
    pub subtype: String,
}

/// Input for updating an account. Balance is deliberately absent: it only
/// moves through [`AccountRepository::apply_delta`].
#[derive(Debug, Clone, Default)]
pub struct UpdateAccountInput {
    /// New display name.
    pub name: Option<String>,
    /// New sub-classification tag.
    pub subtype: Option<String>,
    /// New classification.
    pub account_type: Option<AccountType>,
}

/// Filter options for listing accounts.
#[derive(Debug, Clone, Default)]
pub struct AccountFilter {
    /// Filter by classification.
    pub account_type: Option<AccountType>,
}

/// Account repository for CRUD operations and balance deltas.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    db: DatabaseConnection,
}

impl AccountRepository {
    /// Creates a new account repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a new account with a unique name.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateName` if the name is taken.
    pub async fn create_account(
        &self,
        input: CreateAccountInput,
    ) -> Result<accounts::Model, AccountError> {
        let existing = accounts::Entity::find()
            .filter(accounts::Column::Name.eq(&input.name))
            .one(&self.db)
            .await?;

        if existing.is_some() {
            return Err(AccountError::DuplicateName(input.name));
        }

        let now = Utc::now().into();
        let account = accounts::ActiveModel {
            id: Set(Uuid::new_v4()),
            account_type: Set(input.account_type),
            name: Set(input.name),
            balance: Set(input.opening_balance),
            subtype: Set(input.subtype),
            lock_version: Set(0),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let account = account.insert(&self.db).await?;
        info!(account_id = %account.id, name = %account.name, "Account created");
        Ok(account)
    }

    /// Lists accounts, most recently created last.
    pub async fn list_accounts(
        &self,
        filter: AccountFilter,
    ) -> Result<Vec<accounts::Model>, AccountError> {
        let mut query = accounts::Entity::find().order_by_asc(accounts::Column::CreatedAt);

        if let Some(account_type) = filter.account_type {
            query = query.filter(accounts::Column::AccountType.eq(account_type));
        }

        Ok(query.all(&self.db).await?)
    }

    /// Finds an account by ID.
    pub async fn find_account_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<accounts::Model>, AccountError> {
        Ok(accounts::Entity::find_by_id(id).one(&self.db).await?)
    }

    /// Updates an account's allow-listed fields (name, subtype, type).
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the account is absent and `DuplicateName` if a
    /// rename collides with an existing account.
    pub async fn update_account(
        &self,
        id: Uuid,
        input: UpdateAccountInput,
    ) -> Result<accounts::Model, AccountError> {
        let account = accounts::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AccountError::NotFound(id))?;

        if let Some(new_name) = &input.name
            && *new_name != account.name
        {
            let existing = accounts::Entity::find()
                .filter(accounts::Column::Name.eq(new_name))
                .filter(accounts::Column::Id.ne(id))
                .one(&self.db)
                .await?;

            if existing.is_some() {
                return Err(AccountError::DuplicateName(new_name.clone()));
            }
        }

        let mut active: accounts::ActiveModel = account.into();

        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(subtype) = input.subtype {
            active.subtype = Set(subtype);
        }
        if let Some(account_type) = input.account_type {
            active.account_type = Set(account_type);
        }
        active.updated_at = Set(Utc::now().into());

        Ok(active.update(&self.db).await?)
    }

    /// Deletes an account.
    ///
    /// The referencing-transaction check and the delete share one database
    /// transaction, so a concurrent posting cannot slip in between. Hidden
    /// (soft-deleted) history rows are balance-neutral and get purged in the
    /// same unit; the RESTRICT foreign key backs all of this up.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the account is absent and `HasTransactions` if
    /// any visible transaction still references it.
    pub async fn delete_account(&self, id: Uuid) -> Result<(), AccountError> {
        let txn = self.db.begin().await?;

        accounts::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(AccountError::NotFound(id))?;

        let visible = transactions::Entity::find()
            .filter(transactions::Column::AccountId.eq(id))
            .filter(transactions::Column::IsDeleted.eq(false))
            .count(&txn)
            .await?;

        if visible > 0 {
            return Err(AccountError::HasTransactions(visible));
        }

        transactions::Entity::delete_many()
            .filter(transactions::Column::AccountId.eq(id))
            .exec(&txn)
            .await?;

        accounts::Entity::delete_by_id(id).exec(&txn).await?;

        txn.commit().await?;
        info!(account_id = %id, "Account deleted");
        Ok(())
    }

    /// Applies a signed delta to one account's balance, inside the caller's
    /// database transaction.
    ///
    /// The write is guarded by the account's `lock_version`: if another unit
    /// committed a balance change between our read and write, zero rows match
    /// and the caller's whole unit aborts with `ConcurrentModification`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the account is absent within the unit's view.
    pub async fn apply_delta(
        txn: &DatabaseTransaction,
        account_id: Uuid,
        delta: Decimal,
    ) -> Result<Decimal, AccountError> {
        let account = accounts::Entity::find_by_id(account_id)
            .one(txn)
            .await?
            .ok_or(AccountError::NotFound(account_id))?;

        let new_balance = account.balance + delta;

        let result = accounts::Entity::update_many()
            .col_expr(accounts::Column::Balance, Expr::value(new_balance))
            .col_expr(
                accounts::Column::LockVersion,
                Expr::value(account.lock_version + 1),
            )
            .col_expr(
                accounts::Column::UpdatedAt,
                Expr::value(Utc::now().fixed_offset()),
            )
            .filter(accounts::Column::Id.eq(account_id))
            .filter(accounts::Column::LockVersion.eq(account.lock_version))
            .exec(txn)
            .await?;

        if result.rows_affected == 0 {
            return Err(AccountError::ConcurrentModification(account_id));
        }

        Ok(new_balance)
    }
}

// ============================================================================
// Pure validation functions for testing without a database
// ============================================================================

/// Checks whether a name is free given the set of existing account names.
#[must_use]
pub fn is_name_available<S: std::hash::BuildHasher>(
    existing_names: &std::collections::HashSet<String, S>,
    candidate: &str,
) -> bool {
    !existing_names.contains(candidate)
}

/// Checks whether renaming an account is conflict-free. Renaming to the
/// current name is always a no-op.
#[must_use]
pub fn is_rename_valid<S: std::hash::BuildHasher>(
    existing_names: &std::collections::HashSet<String, S>,
    current_name: &str,
    candidate: &str,
) -> bool {
    current_name == candidate || !existing_names.contains(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn names(values: &[&str]) -> HashSet<String> {
        values.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_empty_set_allows_any_name() {
        let existing = HashSet::new();
        assert!(is_name_available(&existing, "Cash"));
        assert!(is_name_available(&existing, ""));
    }

    #[test]
    fn test_taken_name_rejected() {
        let existing = names(&["Cash", "Payroll"]);
        assert!(!is_name_available(&existing, "Cash"));
        assert!(is_name_available(&existing, "Savings"));
    }

    #[test]
    fn test_names_are_case_sensitive() {
        let existing = names(&["Cash"]);
        assert!(is_name_available(&existing, "cash"));
        assert!(is_name_available(&existing, "CASH"));
    }

    #[test]
    fn test_rename_to_self_is_valid() {
        let existing = names(&["Cash"]);
        assert!(is_rename_valid(&existing, "Cash", "Cash"));
    }

    #[test]
    fn test_rename_to_taken_name_rejected() {
        let existing = names(&["Cash", "Savings"]);
        assert!(!is_rename_valid(&existing, "Cash", "Savings"));
        assert!(is_rename_valid(&existing, "Cash", "Checking"));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Renaming to the current value never conflicts, no matter what
        /// else exists.
        #[test]
        fn prop_rename_to_self_always_valid(
            existing in prop::collection::hash_set("[A-Za-z ]{1,12}", 0..16),
            name in "[A-Za-z ]{1,12}",
        ) {
            prop_assert!(is_rename_valid(&existing, &name, &name));
        }

        /// Availability matches set membership exactly.
        #[test]
        fn prop_availability_is_set_membership(
            existing in prop::collection::hash_set("[A-Za-z ]{1,12}", 0..16),
            name in "[A-Za-z ]{1,12}",
        ) {
            prop_assert_eq!(is_name_available(&existing, &name), !existing.contains(&name));
        }
    }
}
