use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The three annual statements the dashboard shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatementKind {
    IncomeStatement,
    CashFlow,
    BalanceSheet,
}

const INCOME_FIELDS: &[&str] = &[
    "TotalRevenue",
    "CostOfRevenue",
    "GrossProfit",
    "ResearchAndDevelopment",
    "SellingGeneralAndAdministration",
    "OperatingExpense",
    "OperatingIncome",
    "InterestExpense",
    "PretaxIncome",
    "TaxProvision",
    "NetIncome",
    "BasicEPS",
    "DilutedEPS",
    "EBITDA",
];

const CASH_FLOW_FIELDS: &[&str] = &[
    "OperatingCashFlow",
    "DepreciationAndAmortization",
    "ChangeInWorkingCapital",
    "InvestingCashFlow",
    "CapitalExpenditure",
    "FinancingCashFlow",
    "RepurchaseOfCapitalStock",
    "CashDividendsPaid",
    "EndCashPosition",
    "FreeCashFlow",
];

const BALANCE_SHEET_FIELDS: &[&str] = &[
    "TotalAssets",
    "CurrentAssets",
    "CashAndCashEquivalents",
    "TotalLiabilitiesNetMinorityInterest",
    "CurrentLiabilities",
    "TotalDebt",
    "NetDebt",
    "StockholdersEquity",
    "RetainedEarnings",
    "WorkingCapital",
    "InvestedCapital",
    "OrdinarySharesNumber",
];

impl StatementKind {
    pub const ALL: [StatementKind; 3] = [
        StatementKind::IncomeStatement,
        StatementKind::CashFlow,
        StatementKind::BalanceSheet,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            StatementKind::IncomeStatement => "Income Statement",
            StatementKind::CashFlow => "Cash Flow",
            StatementKind::BalanceSheet => "Balance Sheet",
        }
    }

    /// Suffix used in export file names (`{T}_{stem}.csv`)
    pub fn file_stem(&self) -> &'static str {
        match self {
            StatementKind::IncomeStatement => "income_statement",
            StatementKind::CashFlow => "cash_flow",
            StatementKind::BalanceSheet => "balance_sheet",
        }
    }

    /// Line items requested from the fundamentals timeseries, in display order
    pub fn fields(&self) -> &'static [&'static str] {
        match self {
            StatementKind::IncomeStatement => INCOME_FIELDS,
            StatementKind::CashFlow => CASH_FLOW_FIELDS,
            StatementKind::BalanceSheet => BALANCE_SHEET_FIELDS,
        }
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

impl FromStr for StatementKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace([' ', '-'], "_").as_str() {
            "income" | "income_statement" => Ok(StatementKind::IncomeStatement),
            "cash" | "cashflow" | "cash_flow" => Ok(StatementKind::CashFlow),
            "balance" | "balance_sheet" => Ok(StatementKind::BalanceSheet),
            _ => anyhow::bail!(
                "Invalid statement: '{}'. Valid options: income_statement, cash_flow, balance_sheet",
                s
            ),
        }
    }
}

/// Splits a camel-case field name into words, keeping acronyms together.
///
/// `"DilutedEPS"` becomes `"Diluted EPS"`, `"EBITDA"` stays as is.
pub fn humanize_field(field: &str) -> String {
    let chars: Vec<char> = field.chars().collect();
    let mut out = String::with_capacity(field.len() + 8);

    for (i, &c) in chars.iter().enumerate() {
        if i > 0 && c.is_uppercase() {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if prev.is_lowercase() || (prev.is_uppercase() && next_is_lower) {
                out.push(' ');
            }
        }
        out.push(c);
    }
    out
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub name: String,
    /// One value per period, aligned with `FinancialStatement::periods`
    pub values: Vec<Option<Decimal>>,
}

/// Line items by reporting period, newest period first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialStatement {
    pub kind: StatementKind,
    pub periods: Vec<NaiveDate>,
    pub items: Vec<LineItem>,
}

impl FinancialStatement {
    pub fn empty(kind: StatementKind) -> Self {
        Self {
            kind,
            periods: Vec::new(),
            items: Vec::new(),
        }
    }

    /// True when no period carries any value
    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
            || self
                .items
                .iter()
                .all(|item| item.values.iter().all(Option::is_none))
    }

    pub fn value(&self, item: &str, period: NaiveDate) -> Option<Decimal> {
        let column = self.periods.iter().position(|p| *p == period)?;
        self.items
            .iter()
            .find(|i| i.name == item)
            .and_then(|i| i.values.get(column).copied().flatten())
    }
}

/// Income statement, cash flow and balance sheet for one ticker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementSet {
    pub income_statement: FinancialStatement,
    pub cash_flow: FinancialStatement,
    pub balance_sheet: FinancialStatement,
}

impl StatementSet {
    pub fn empty() -> Self {
        Self {
            income_statement: FinancialStatement::empty(StatementKind::IncomeStatement),
            cash_flow: FinancialStatement::empty(StatementKind::CashFlow),
            balance_sheet: FinancialStatement::empty(StatementKind::BalanceSheet),
        }
    }

    pub fn get(&self, kind: StatementKind) -> &FinancialStatement {
        match kind {
            StatementKind::IncomeStatement => &self.income_statement,
            StatementKind::CashFlow => &self.cash_flow,
            StatementKind::BalanceSheet => &self.balance_sheet,
        }
    }

    pub fn is_empty(&self) -> bool {
        StatementKind::ALL.iter().all(|kind| self.get(*kind).is_empty())
    }
}

impl Default for StatementSet {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_humanize_field() {
        assert_eq!(humanize_field("TotalRevenue"), "Total Revenue");
        assert_eq!(humanize_field("DilutedEPS"), "Diluted EPS");
        assert_eq!(humanize_field("EBITDA"), "EBITDA");
        assert_eq!(
            humanize_field("TotalLiabilitiesNetMinorityInterest"),
            "Total Liabilities Net Minority Interest"
        );
    }

    #[test]
    fn test_statement_kind_parsing() {
        assert_eq!(
            "cash-flow".parse::<StatementKind>().unwrap(),
            StatementKind::CashFlow
        );
        assert_eq!(
            "Balance Sheet".parse::<StatementKind>().unwrap(),
            StatementKind::BalanceSheet
        );
        assert!("ledger".parse::<StatementKind>().is_err());
    }

    #[test]
    fn test_value_lookup_and_emptiness() {
        let fy23 = NaiveDate::from_ymd_opt(2023, 9, 30).unwrap();
        let fy22 = NaiveDate::from_ymd_opt(2022, 9, 30).unwrap();
        let statement = FinancialStatement {
            kind: StatementKind::IncomeStatement,
            periods: vec![fy23, fy22],
            items: vec![LineItem {
                name: "Net Income".to_string(),
                values: vec![Some(dec!(96995000000)), None],
            }],
        };

        assert!(!statement.is_empty());
        assert_eq!(statement.value("Net Income", fy23), Some(dec!(96995000000)));
        assert_eq!(statement.value("Net Income", fy22), None);
        assert!(StatementSet::empty().is_empty());
    }
}
