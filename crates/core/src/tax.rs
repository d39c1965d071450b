//! Flat-rate tax computation.
//!
//! Every taxed figure in the system (transaction totals, invoice lines) is
//! derived through [`compute_tax`], so the rounding behaviour lives in
//! exactly one place.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Result of applying a tax rate to a base amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBreakdown {
    /// The tax portion: `base * rate / 100`.
    pub tax_amount: Decimal,
    /// The taxed total: `base + tax_amount`.
    pub total: Decimal,
}

/// Computes the tax amount and taxed total for a base amount.
///
/// A missing rate is treated as zero. Negative bases and rates are passed
/// through unchanged; callers own input sanity.
#[must_use]
pub fn compute_tax(base: Decimal, rate: Option<Decimal>) -> TaxBreakdown {
    let rate = rate.unwrap_or_default();
    let tax_amount = base * rate / Decimal::ONE_HUNDRED;
    TaxBreakdown {
        tax_amount,
        total: base + tax_amount,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_ten_percent() {
        let breakdown = compute_tax(dec!(1000), Some(dec!(10)));
        assert_eq!(breakdown.tax_amount, dec!(100));
        assert_eq!(breakdown.total, dec!(1100));
    }

    #[test]
    fn test_missing_rate_defaults_to_zero() {
        let breakdown = compute_tax(dec!(500), None);
        assert_eq!(breakdown.tax_amount, dec!(0));
        assert_eq!(breakdown.total, dec!(500));
    }

    #[test]
    fn test_zero_base() {
        let breakdown = compute_tax(dec!(0), Some(dec!(18)));
        assert_eq!(breakdown.tax_amount, dec!(0));
        assert_eq!(breakdown.total, dec!(0));
    }

    #[test]
    fn test_fractional_rate() {
        let breakdown = compute_tax(dec!(200), Some(dec!(2.5)));
        assert_eq!(breakdown.tax_amount, dec!(5));
        assert_eq!(breakdown.total, dec!(205));
    }

    #[test]
    fn test_negative_inputs_pass_through() {
        // No domain check here; callers own sanity.
        let breakdown = compute_tax(dec!(-100), Some(dec!(10)));
        assert_eq!(breakdown.tax_amount, dec!(-10));
        assert_eq!(breakdown.total, dec!(-110));

        let breakdown = compute_tax(dec!(100), Some(dec!(-10)));
        assert_eq!(breakdown.tax_amount, dec!(-10));
        assert_eq!(breakdown.total, dec!(90));
    }
}
