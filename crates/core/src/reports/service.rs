//! Report assembly from pre-aggregated sums.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::period::ReportWindow;
use super::types::{
    BalanceSheetReport, CashFlowReport, ProfitAndLossReport, ProfitLossStatus, TaxReport,
};

/// Service for assembling financial reports.
pub struct ReportService;

impl ReportService {
    /// Builds a profit-and-loss report from income and expense sums.
    #[must_use]
    pub fn build_profit_and_loss(
        window: ReportWindow,
        total_income: Decimal,
        total_expense: Decimal,
    ) -> ProfitAndLossReport {
        let net = total_income - total_expense;
        let status = if net > Decimal::ZERO {
            ProfitLossStatus::Profit
        } else if net < Decimal::ZERO {
            ProfitLossStatus::Loss
        } else {
            ProfitLossStatus::BreakEven
        };

        ProfitAndLossReport {
            period_start: window.start,
            period_end: window.end,
            total_income,
            total_expense,
            net,
            status,
        }
    }

    /// Builds a balance-sheet snapshot from per-classification balance sums.
    #[must_use]
    pub fn build_balance_sheet(
        as_of: NaiveDate,
        total_assets: Decimal,
        total_liabilities: Decimal,
    ) -> BalanceSheetReport {
        BalanceSheetReport {
            as_of,
            total_assets,
            total_liabilities,
            equity: total_assets - total_liabilities,
        }
    }

    /// Builds a cash-flow report from per-kind sums.
    #[must_use]
    pub fn build_cash_flow(
        window: ReportWindow,
        inflow: Decimal,
        outflow: Decimal,
        financing: Decimal,
    ) -> CashFlowReport {
        CashFlowReport {
            period_start: window.start,
            period_end: window.end,
            inflow,
            outflow,
            financing,
            net: inflow - outflow,
        }
    }

    /// Builds a tax summary from collected and paid tax sums.
    #[must_use]
    pub fn build_tax_report(
        period_start: Option<NaiveDate>,
        period_end: Option<NaiveDate>,
        payment_method: Option<String>,
        output_tax: Decimal,
        input_tax: Decimal,
    ) -> TaxReport {
        TaxReport {
            period_start,
            period_end,
            payment_method,
            output_tax,
            input_tax,
            net_tax: output_tax - input_tax,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn window() -> ReportWindow {
        ReportWindow::year(2026).unwrap()
    }

    #[test]
    fn test_profit_and_loss_profit() {
        let report = ReportService::build_profit_and_loss(window(), dec!(1000), dec!(400));
        assert_eq!(report.total_income, dec!(1000));
        assert_eq!(report.total_expense, dec!(400));
        assert_eq!(report.net, dec!(600));
        assert_eq!(report.status, ProfitLossStatus::Profit);
    }

    #[test]
    fn test_profit_and_loss_loss() {
        let report = ReportService::build_profit_and_loss(window(), dec!(300), dec!(450));
        assert_eq!(report.net, dec!(-150));
        assert_eq!(report.status, ProfitLossStatus::Loss);
    }

    #[test]
    fn test_profit_and_loss_break_even() {
        let report = ReportService::build_profit_and_loss(window(), dec!(500), dec!(500));
        assert_eq!(report.net, dec!(0));
        assert_eq!(report.status, ProfitLossStatus::BreakEven);
    }

    #[test]
    fn test_balance_sheet_equity() {
        let as_of = NaiveDate::from_ymd_opt(2026, 8, 1).unwrap();
        let report = ReportService::build_balance_sheet(as_of, dec!(9000), dec!(2500));
        assert_eq!(report.equity, dec!(6500));
        assert_eq!(report.as_of, as_of);
    }

    #[test]
    fn test_cash_flow_net_ignores_financing() {
        let report = ReportService::build_cash_flow(window(), dec!(1200), dec!(700), dec!(5000));
        assert_eq!(report.net, dec!(500));
        assert_eq!(report.financing, dec!(5000));
    }

    #[test]
    fn test_tax_report_net() {
        let report =
            ReportService::build_tax_report(None, None, Some("Cash".to_string()), dec!(180), dec!(45));
        assert_eq!(report.net_tax, dec!(135));
        assert_eq!(report.payment_method.as_deref(), Some("Cash"));
    }

    #[test]
    fn test_status_display() {
        assert_eq!(ProfitLossStatus::Profit.to_string(), "profit");
        assert_eq!(ProfitLossStatus::Loss.to_string(), "loss");
        assert_eq!(ProfitLossStatus::BreakEven.to_string(), "break-even");
    }
}
