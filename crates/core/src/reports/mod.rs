//! Report builders and period windows.
//!
//! The database layer supplies pre-aggregated sums; everything here is pure
//! assembly and date arithmetic.

mod error;
mod period;
mod service;
mod types;

pub use error::ReportError;
pub use period::ReportWindow;
pub use service::ReportService;
pub use types::{
    BalanceSheetReport, CashFlowReport, ProfitAndLossReport, ProfitLossStatus, TaxReport,
};
