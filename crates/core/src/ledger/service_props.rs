//! Property tests for the posting rules.

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::service::PostingService;
use super::types::{NewTransactionInput, TransactionKind, TransactionPatch};

fn amount_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..1_000_000_00i64).prop_map(|n| Decimal::new(n, 2))
}

fn rate_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..100_00i64).prop_map(|n| Decimal::new(n, 2))
}

fn kind_strategy() -> impl Strategy<Value = TransactionKind> {
    prop_oneof![
        Just(TransactionKind::Income),
        Just(TransactionKind::Expense),
        Just(TransactionKind::Loan),
        Just(TransactionKind::Investment),
    ]
}

fn make_input(kind: TransactionKind, amount: Decimal, rate: Decimal) -> NewTransactionInput {
    NewTransactionInput {
        kind,
        category: "Sales".to_string(),
        amount,
        tax_rate: Some(rate),
        payment_mode: "Cash".to_string(),
        account_id: Uuid::from_u128(1),
        txn_date: None,
        description: None,
        created_by: Uuid::from_u128(2),
    }
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 6, 1).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Every resolved transaction satisfies
    /// `total == amount + amount * rate / 100`.
    #[test]
    fn prop_total_formula_holds(
        kind in kind_strategy(),
        amount in amount_strategy(),
        rate in rate_strategy(),
    ) {
        let resolved =
            PostingService::resolve_create(make_input(kind, amount, rate), today()).unwrap();

        prop_assert_eq!(resolved.tax_amount, amount * rate / Decimal::ONE_HUNDRED);
        prop_assert_eq!(resolved.total, resolved.amount + resolved.tax_amount);
    }

    /// Reversal exactly cancels the original effect.
    #[test]
    fn prop_reversal_cancels_effect(
        kind in kind_strategy(),
        total in amount_strategy(),
    ) {
        let effect = PostingService::signed_effect(kind, total);
        let reversal = PostingService::reversal_delta(kind, total);
        prop_assert_eq!(effect + reversal, Decimal::ZERO);
    }

    /// Inflow kinds post positively, expense posts negatively.
    #[test]
    fn prop_sign_convention(
        kind in kind_strategy(),
        total in amount_strategy(),
    ) {
        prop_assume!(total > Decimal::ZERO);
        let effect = PostingService::signed_effect(kind, total);
        if kind.is_inflow() {
            prop_assert!(effect > Decimal::ZERO);
        } else {
            prop_assert!(effect < Decimal::ZERO);
        }
    }

    /// Editing only the amount moves the balance by exactly the difference
    /// of the two signed totals.
    #[test]
    fn prop_edit_round_trip_delta(
        kind in kind_strategy(),
        amount_a in amount_strategy(),
        amount_b in amount_strategy(),
        rate in rate_strategy(),
    ) {
        let original =
            PostingService::resolve_create(make_input(kind, amount_a, rate), today()).unwrap();

        let patch = TransactionPatch {
            amount: Some(amount_b),
            ..TransactionPatch::default()
        };
        let edit = PostingService::resolve_edit(&original, patch).unwrap();

        let before = PostingService::signed_effect(kind, original.total);
        let after = PostingService::signed_effect(kind, edit.updated.total);
        prop_assert_eq!(edit.reversal.delta + edit.apply.delta, after - before);
    }

    /// An edit that changes nothing leaves the balance untouched.
    #[test]
    fn prop_empty_patch_is_balance_neutral(
        kind in kind_strategy(),
        amount in amount_strategy(),
        rate in rate_strategy(),
    ) {
        let original =
            PostingService::resolve_create(make_input(kind, amount, rate), today()).unwrap();

        let edit =
            PostingService::resolve_edit(&original, TransactionPatch::default()).unwrap();

        prop_assert_eq!(edit.reversal.delta + edit.apply.delta, Decimal::ZERO);
        prop_assert_eq!(edit.updated, original);
    }
}
