use crate::domain::financials::StatementKind;
use crate::domain::market::types::{DateRange, Ticker};

pub const EXTENSION: &str = "csv";

pub fn price_history(ticker: &Ticker, range: &DateRange) -> String {
    format!("{}_stock_data_{}.{}", ticker, range, EXTENSION)
}

pub fn statement(ticker: &Ticker, kind: StatementKind) -> String {
    format!("{}_{}.{}", ticker, kind.file_stem(), EXTENSION)
}

pub fn comparison(first: &Ticker, second: &Ticker) -> String {
    format!("{}_vs_{}_comparison.{}", first, second, EXTENSION)
}

pub fn gap_analysis(ticker: &Ticker) -> String {
    format!("{}_gap_analysis.{}", ticker, EXTENSION)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_names() {
        let aapl: Ticker = "aapl".parse().unwrap();
        let msft: Ticker = "MSFT".parse().unwrap();
        let range = DateRange::parse("2014-01-01", "2024-01-01").unwrap();

        assert_eq!(
            price_history(&aapl, &range),
            "AAPL_stock_data_2014-01-01_to_2024-01-01.csv"
        );
        assert_eq!(
            statement(&aapl, StatementKind::IncomeStatement),
            "AAPL_income_statement.csv"
        );
        assert_eq!(statement(&aapl, StatementKind::CashFlow), "AAPL_cash_flow.csv");
        assert_eq!(
            statement(&aapl, StatementKind::BalanceSheet),
            "AAPL_balance_sheet.csv"
        );
        assert_eq!(comparison(&aapl, &msft), "AAPL_vs_MSFT_comparison.csv");
        assert_eq!(gap_analysis(&aapl), "AAPL_gap_analysis.csv");
    }
}
