//! Page selection and the data each page presents.
//!
//! Lists keep the collection's insertion order; only the monthly report is
//! ordered, chronologically.

use std::{fmt, str::FromStr};

use crate::core::services::{CategoryTotals, MonthlyTotals, SummaryService, Totals};
use crate::domain::transaction::{ExpenseStatus, Transaction};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Page {
    #[default]
    Dashboard,
    Payable,
    Paid,
    Income,
    Outflows,
    Reports,
}

impl Page {
    pub const ALL: [Page; 6] = [
        Page::Dashboard,
        Page::Payable,
        Page::Paid,
        Page::Income,
        Page::Outflows,
        Page::Reports,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            Page::Dashboard => "dashboard",
            Page::Payable => "payable",
            Page::Paid => "paid",
            Page::Income => "income",
            Page::Outflows => "outflows",
            Page::Reports => "reports",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Page::Dashboard => "Dashboard",
            Page::Payable => "Bills to Pay",
            Page::Paid => "Paid Bills",
            Page::Income => "Income",
            Page::Outflows => "Outflows",
            Page::Reports => "Reports",
        }
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPage(pub String);

impl fmt::Display for UnknownPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown page `{}`", self.0)
    }
}

impl std::error::Error for UnknownPage {}

impl FromStr for Page {
    type Err = UnknownPage;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "dashboard" => Ok(Page::Dashboard),
            "payable" => Ok(Page::Payable),
            "paid" => Ok(Page::Paid),
            "income" => Ok(Page::Income),
            "outflows" | "saidas" => Ok(Page::Outflows),
            "reports" => Ok(Page::Reports),
            _ => Err(UnknownPage(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    pub totals: Totals,
    pub payable_count: usize,
    pub transaction_count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub categories: Vec<CategoryTotals>,
    pub months: Vec<MonthlyTotals>,
}

/// What a page renders, borrowed from the current collection.
#[derive(Debug, Clone, PartialEq)]
pub enum PageView<'a> {
    Dashboard(Dashboard),
    List {
        page: Page,
        rows: Vec<&'a Transaction>,
        total: f64,
    },
    Reports(Report),
}

impl<'a> PageView<'a> {
    pub fn build(page: Page, transactions: &'a [Transaction], initial_balance: f64) -> Self {
        match page {
            Page::Dashboard => PageView::Dashboard(Dashboard {
                totals: SummaryService::totals(transactions, initial_balance),
                payable_count: transactions
                    .iter()
                    .filter(|t| t.status() == Some(ExpenseStatus::Pending))
                    .count(),
                transaction_count: transactions.len(),
            }),
            Page::Reports => PageView::Reports(Report {
                categories: SummaryService::by_category(transactions),
                months: SummaryService::by_month(transactions),
            }),
            list_page => {
                let rows: Vec<&Transaction> = transactions
                    .iter()
                    .filter(|t| page_includes(list_page, t))
                    .collect();
                let total: f64 = rows.iter().map(|t| t.amount).sum();
                PageView::List {
                    page: list_page,
                    rows,
                    total,
                }
            }
        }
    }
}

fn page_includes(page: Page, txn: &Transaction) -> bool {
    match page {
        Page::Payable => txn.status() == Some(ExpenseStatus::Pending),
        Page::Paid => txn.status() == Some(ExpenseStatus::Paid),
        Page::Income => txn.is_income(),
        Page::Outflows => txn.is_expense(),
        Page::Dashboard | Page::Reports => true,
    }
}
