//! Posting rules: sign conventions, create resolution, and edit resolution.
//!
//! The resolution functions are pure. They compute every derived field of a
//! transaction plus the signed balance deltas it implies, so the database
//! layer only has to persist records and apply deltas inside one atomic unit.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::error::LedgerError;
use super::types::{
    BalanceChange, EditResolution, NewTransactionInput, ResolvedTransaction, TransactionKind,
    TransactionPatch,
};
use crate::tax::compute_tax;

/// Pure posting logic for the ledger.
pub struct PostingService;

impl PostingService {
    /// Returns the signed effect a transaction has on its owning account.
    ///
    /// Income, loan, and investment add the taxed total; expense subtracts it.
    #[must_use]
    pub fn signed_effect(kind: TransactionKind, total: Decimal) -> Decimal {
        if kind.is_inflow() { total } else { -total }
    }

    /// Returns the delta that undoes a stored transaction's balance effect.
    #[must_use]
    pub fn reversal_delta(kind: TransactionKind, total: Decimal) -> Decimal {
        -Self::signed_effect(kind, total)
    }

    /// Validates and resolves a new transaction.
    ///
    /// Checks field presence, computes tax and total, and defaults the
    /// effective date to `today`.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::MissingField` when a required text field is
    /// empty.
    pub fn resolve_create(
        input: NewTransactionInput,
        today: NaiveDate,
    ) -> Result<ResolvedTransaction, LedgerError> {
        if input.category.trim().is_empty() {
            return Err(LedgerError::MissingField("category"));
        }
        if input.payment_mode.trim().is_empty() {
            return Err(LedgerError::MissingField("payment_mode"));
        }

        let tax_rate = input.tax_rate.unwrap_or_default();
        let breakdown = compute_tax(input.amount, Some(tax_rate));

        Ok(ResolvedTransaction {
            kind: input.kind,
            category: input.category,
            amount: input.amount,
            tax_rate,
            tax_amount: breakdown.tax_amount,
            total: breakdown.total,
            payment_mode: input.payment_mode,
            account_id: input.account_id,
            txn_date: input.txn_date.unwrap_or(today),
            description: input.description,
            created_by: input.created_by,
        })
    }

    /// Returns the balance change implied by a resolved transaction.
    #[must_use]
    pub fn balance_change(resolved: &ResolvedTransaction) -> BalanceChange {
        BalanceChange {
            account_id: resolved.account_id,
            delta: Self::signed_effect(resolved.kind, resolved.total),
        }
    }

    /// Resolves an edit of a stored transaction.
    ///
    /// Produces the reversal of the currently stored effect (against the
    /// current account), the merged-and-recomputed record, and the new
    /// effect (against the possibly-updated account and kind). Tax and total
    /// are recomputed only when `amount` or `tax_rate` changed.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::MissingField` when a patched text field is
    /// empty.
    pub fn resolve_edit(
        current: &ResolvedTransaction,
        patch: TransactionPatch,
    ) -> Result<EditResolution, LedgerError> {
        if matches!(&patch.category, Some(c) if c.trim().is_empty()) {
            return Err(LedgerError::MissingField("category"));
        }
        if matches!(&patch.payment_mode, Some(m) if m.trim().is_empty()) {
            return Err(LedgerError::MissingField("payment_mode"));
        }

        let reversal = BalanceChange {
            account_id: current.account_id,
            delta: Self::reversal_delta(current.kind, current.total),
        };

        let needs_repricing = patch.needs_repricing();

        let mut updated = current.clone();
        if let Some(kind) = patch.kind {
            updated.kind = kind;
        }
        if let Some(category) = patch.category {
            updated.category = category;
        }
        if let Some(amount) = patch.amount {
            updated.amount = amount;
        }
        if let Some(tax_rate) = patch.tax_rate {
            updated.tax_rate = tax_rate;
        }
        if let Some(payment_mode) = patch.payment_mode {
            updated.payment_mode = payment_mode;
        }
        if let Some(account_id) = patch.account_id {
            updated.account_id = account_id;
        }
        if let Some(txn_date) = patch.txn_date {
            updated.txn_date = txn_date;
        }
        if let Some(description) = patch.description {
            updated.description = description;
        }

        if needs_repricing {
            let breakdown = compute_tax(updated.amount, Some(updated.tax_rate));
            updated.tax_amount = breakdown.tax_amount;
            updated.total = breakdown.total;
        }

        let apply = Self::balance_change(&updated);

        Ok(EditResolution {
            reversal,
            apply,
            updated,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 15).unwrap()
    }

    fn sales_input(account_id: Uuid) -> NewTransactionInput {
        NewTransactionInput {
            kind: TransactionKind::Income,
            category: "Sales".to_string(),
            amount: dec!(1000),
            tax_rate: Some(dec!(10)),
            payment_mode: "Cash".to_string(),
            account_id,
            txn_date: None,
            description: None,
            created_by: Uuid::new_v4(),
        }
    }

    #[test]
    fn test_signed_effect_by_kind() {
        assert_eq!(
            PostingService::signed_effect(TransactionKind::Income, dec!(1100)),
            dec!(1100)
        );
        assert_eq!(
            PostingService::signed_effect(TransactionKind::Loan, dec!(500)),
            dec!(500)
        );
        assert_eq!(
            PostingService::signed_effect(TransactionKind::Investment, dec!(250)),
            dec!(250)
        );
        assert_eq!(
            PostingService::signed_effect(TransactionKind::Expense, dec!(400)),
            dec!(-400)
        );
    }

    #[test]
    fn test_resolve_create_computes_tax_and_total() {
        let account_id = Uuid::new_v4();
        let resolved = PostingService::resolve_create(sales_input(account_id), today()).unwrap();

        assert_eq!(resolved.tax_amount, dec!(100));
        assert_eq!(resolved.total, dec!(1100));
        assert_eq!(resolved.txn_date, today());

        let change = PostingService::balance_change(&resolved);
        assert_eq!(change.account_id, account_id);
        assert_eq!(change.delta, dec!(1100));
    }

    #[test]
    fn test_resolve_create_defaults_tax_rate_to_zero() {
        let mut input = sales_input(Uuid::new_v4());
        input.tax_rate = None;
        let resolved = PostingService::resolve_create(input, today()).unwrap();

        assert_eq!(resolved.tax_rate, dec!(0));
        assert_eq!(resolved.total, dec!(1000));
    }

    #[test]
    fn test_resolve_create_keeps_explicit_date() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 2).unwrap();
        let mut input = sales_input(Uuid::new_v4());
        input.txn_date = Some(date);
        let resolved = PostingService::resolve_create(input, today()).unwrap();
        assert_eq!(resolved.txn_date, date);
    }

    #[test]
    fn test_resolve_create_rejects_empty_category() {
        let mut input = sales_input(Uuid::new_v4());
        input.category = "  ".to_string();
        assert_eq!(
            PostingService::resolve_create(input, today()),
            Err(LedgerError::MissingField("category"))
        );
    }

    #[test]
    fn test_resolve_create_rejects_empty_payment_mode() {
        let mut input = sales_input(Uuid::new_v4());
        input.payment_mode = String::new();
        assert_eq!(
            PostingService::resolve_create(input, today()),
            Err(LedgerError::MissingField("payment_mode"))
        );
    }

    #[test]
    fn test_edit_amount_reprices_and_nets_the_difference() {
        let resolved = PostingService::resolve_create(sales_input(Uuid::new_v4()), today()).unwrap();

        let patch = TransactionPatch {
            amount: Some(dec!(2000)),
            ..TransactionPatch::default()
        };
        let edit = PostingService::resolve_edit(&resolved, patch).unwrap();

        assert_eq!(edit.updated.tax_amount, dec!(200));
        assert_eq!(edit.updated.total, dec!(2200));
        // Old effect fully reversed, new effect fully applied: 1100 -> 2200.
        assert_eq!(edit.reversal.delta, dec!(-1100));
        assert_eq!(edit.apply.delta, dec!(2200));
        assert_eq!(edit.reversal.delta + edit.apply.delta, dec!(1100));
    }

    #[test]
    fn test_edit_without_amount_keeps_totals() {
        let resolved = PostingService::resolve_create(sales_input(Uuid::new_v4()), today()).unwrap();

        let patch = TransactionPatch {
            category: Some("Consulting".to_string()),
            ..TransactionPatch::default()
        };
        let edit = PostingService::resolve_edit(&resolved, patch).unwrap();

        assert_eq!(edit.updated.category, "Consulting");
        assert_eq!(edit.updated.total, resolved.total);
        assert_eq!(edit.reversal.delta + edit.apply.delta, dec!(0));
    }

    #[test]
    fn test_edit_kind_flips_the_sign() {
        let resolved = PostingService::resolve_create(sales_input(Uuid::new_v4()), today()).unwrap();

        let patch = TransactionPatch {
            kind: Some(TransactionKind::Expense),
            ..TransactionPatch::default()
        };
        let edit = PostingService::resolve_edit(&resolved, patch).unwrap();

        assert_eq!(edit.reversal.delta, dec!(-1100));
        assert_eq!(edit.apply.delta, dec!(-1100));
    }

    #[test]
    fn test_edit_moves_account() {
        let resolved = PostingService::resolve_create(sales_input(Uuid::new_v4()), today()).unwrap();
        let new_account = Uuid::new_v4();

        let patch = TransactionPatch {
            account_id: Some(new_account),
            ..TransactionPatch::default()
        };
        let edit = PostingService::resolve_edit(&resolved, patch).unwrap();

        assert_eq!(edit.reversal.account_id, resolved.account_id);
        assert_eq!(edit.apply.account_id, new_account);
        assert_eq!(edit.reversal.delta, dec!(-1100));
        assert_eq!(edit.apply.delta, dec!(1100));
    }

    #[test]
    fn test_edit_clears_description() {
        let mut input = sales_input(Uuid::new_v4());
        input.description = Some("March invoice run".to_string());
        let resolved = PostingService::resolve_create(input, today()).unwrap();

        let patch = TransactionPatch {
            description: Some(None),
            ..TransactionPatch::default()
        };
        let edit = PostingService::resolve_edit(&resolved, patch).unwrap();
        assert_eq!(edit.updated.description, None);
    }

    #[test]
    fn test_edit_rejects_empty_patched_fields() {
        let resolved = PostingService::resolve_create(sales_input(Uuid::new_v4()), today()).unwrap();

        let patch = TransactionPatch {
            category: Some(String::new()),
            ..TransactionPatch::default()
        };
        assert_eq!(
            PostingService::resolve_edit(&resolved, patch),
            Err(LedgerError::MissingField("category"))
        );
    }
}
