//! Invoice pricing.
//!
//! Totals are a pure function of the current items. They are recomputed in
//! full whenever items are created or replaced, never edited directly.

use rust_decimal::Decimal;

use super::types::{LineItemInput, PricedInvoice, PricedLineItem};
use crate::tax::compute_tax;

/// Pure invoice pricing logic.
pub struct InvoiceCalculator;

impl InvoiceCalculator {
    /// The standard tax rate applied when a line does not name one.
    #[must_use]
    pub fn default_tax_rate() -> Decimal {
        Decimal::from(18)
    }

    /// Prices a single line item.
    ///
    /// The tax base is `quantity * unit_price`; a missing rate means the
    /// standard rate.
    #[must_use]
    pub fn price_line(item: LineItemInput) -> PricedLineItem {
        let tax_rate = item.tax_rate.unwrap_or_else(Self::default_tax_rate);
        let base = item.quantity * item.unit_price;
        let breakdown = compute_tax(base, Some(tax_rate));

        PricedLineItem {
            description: item.description,
            quantity: item.quantity,
            unit_price: item.unit_price,
            tax_rate,
            tax_amount: breakdown.tax_amount,
            line_total: breakdown.total,
        }
    }

    /// Prices a full invoice body.
    #[must_use]
    pub fn price_invoice(items: Vec<LineItemInput>) -> PricedInvoice {
        let items: Vec<PricedLineItem> = items.into_iter().map(Self::price_line).collect();

        let sub_total: Decimal = items.iter().map(|i| i.quantity * i.unit_price).sum();
        let tax_total: Decimal = items.iter().map(|i| i.tax_amount).sum();

        PricedInvoice {
            items,
            sub_total,
            tax_total,
            grand_total: sub_total + tax_total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn line(quantity: Decimal, unit_price: Decimal, tax_rate: Option<Decimal>) -> LineItemInput {
        LineItemInput {
            description: "Widget".to_string(),
            quantity,
            unit_price,
            tax_rate,
        }
    }

    #[test]
    fn test_price_line_standard_rate() {
        let priced = InvoiceCalculator::price_line(line(dec!(2), dec!(50), None));
        assert_eq!(priced.tax_rate, dec!(18));
        assert_eq!(priced.tax_amount, dec!(18));
        assert_eq!(priced.line_total, dec!(118));
    }

    #[test]
    fn test_price_line_explicit_rate() {
        let priced = InvoiceCalculator::price_line(line(dec!(1), dec!(200), Some(dec!(5))));
        assert_eq!(priced.tax_amount, dec!(10));
        assert_eq!(priced.line_total, dec!(210));
    }

    #[test]
    fn test_price_invoice_single_item() {
        let priced = InvoiceCalculator::price_invoice(vec![line(dec!(2), dec!(50), Some(dec!(18)))]);

        assert_eq!(priced.sub_total, dec!(100));
        assert_eq!(priced.tax_total, dec!(18));
        assert_eq!(priced.grand_total, dec!(118));
        assert_eq!(priced.items.len(), 1);
        assert_eq!(priced.items[0].line_total, dec!(118));
    }

    #[test]
    fn test_price_invoice_mixed_rates() {
        let priced = InvoiceCalculator::price_invoice(vec![
            line(dec!(1), dec!(100), Some(dec!(18))),
            line(dec!(3), dec!(10), Some(dec!(0))),
        ]);

        assert_eq!(priced.sub_total, dec!(130));
        assert_eq!(priced.tax_total, dec!(18));
        assert_eq!(priced.grand_total, dec!(148));
    }

    #[test]
    fn test_price_invoice_empty_items() {
        let priced = InvoiceCalculator::price_invoice(vec![]);
        assert_eq!(priced.sub_total, dec!(0));
        assert_eq!(priced.tax_total, dec!(0));
        assert_eq!(priced.grand_total, dec!(0));
        assert!(priced.items.is_empty());
    }

    #[test]
    fn test_pricing_is_idempotent() {
        let items = vec![
            line(dec!(2), dec!(50), None),
            line(dec!(1), dec!(19.99), Some(dec!(12))),
        ];
        let first = InvoiceCalculator::price_invoice(items.clone());
        let second = InvoiceCalculator::price_invoice(items);
        assert_eq!(first, second);
    }

    #[test]
    fn test_item_order_is_preserved() {
        let priced = InvoiceCalculator::price_invoice(vec![
            LineItemInput {
                description: "Design".to_string(),
                quantity: dec!(1),
                unit_price: dec!(500),
                tax_rate: None,
            },
            LineItemInput {
                description: "Hosting".to_string(),
                quantity: dec!(12),
                unit_price: dec!(25),
                tax_rate: None,
            },
        ]);
        assert_eq!(priced.items[0].description, "Design");
        assert_eq!(priced.items[1].description, "Hosting");
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// The grand total always equals subtotal plus tax total, and both
        /// equal the sums of per-line computed values.
        #[test]
        fn prop_totals_are_sums_of_lines(
            lines in prop::collection::vec(
                (1i64..1000i64, 1i64..100_000i64, 0i64..50_00i64),
                0..8,
            ),
        ) {
            let items: Vec<LineItemInput> = lines
                .iter()
                .map(|&(qty, price, rate)| line(
                    Decimal::from(qty),
                    Decimal::new(price, 2),
                    Some(Decimal::new(rate, 2)),
                ))
                .collect();

            let priced = InvoiceCalculator::price_invoice(items);

            let line_bases: Decimal =
                priced.items.iter().map(|i| i.quantity * i.unit_price).sum();
            let line_taxes: Decimal = priced.items.iter().map(|i| i.tax_amount).sum();

            prop_assert_eq!(priced.sub_total, line_bases);
            prop_assert_eq!(priced.tax_total, line_taxes);
            prop_assert_eq!(priced.grand_total, priced.sub_total + priced.tax_total);
        }
    }
}
