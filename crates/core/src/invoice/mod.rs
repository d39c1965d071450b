//! Invoice line and total pricing.

mod service;
mod types;

pub use service::InvoiceCalculator;
pub use types::{LineItemInput, PricedInvoice, PricedLineItem};
