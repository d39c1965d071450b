//! Invoice domain types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A line item as submitted by the client, before pricing.
#[derive(Debug, Clone, Deserialize)]
pub struct LineItemInput {
    /// What was sold.
    pub description: String,
    /// How many units.
    pub quantity: Decimal,
    /// Price per unit, pre-tax.
    pub unit_price: Decimal,
    /// Flat tax percentage; missing means the standard 18%.
    pub tax_rate: Option<Decimal>,
}

/// A line item with derived fields computed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PricedLineItem {
    /// What was sold.
    pub description: String,
    /// How many units.
    pub quantity: Decimal,
    /// Price per unit, pre-tax.
    pub unit_price: Decimal,
    /// Applied tax percentage.
    pub tax_rate: Decimal,
    /// Derived tax portion for the line.
    pub tax_amount: Decimal,
    /// Derived line total: `quantity * unit_price + tax_amount`.
    pub line_total: Decimal,
}

/// A fully priced invoice body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PricedInvoice {
    /// Priced line items, in submission order.
    pub items: Vec<PricedLineItem>,
    /// Sum of `quantity * unit_price` over all items.
    pub sub_total: Decimal,
    /// Sum of line tax amounts.
    pub tax_total: Decimal,
    /// `sub_total + tax_total`.
    pub grand_total: Decimal,
}
