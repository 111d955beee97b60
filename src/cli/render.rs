//! Turns page views into terminal text. Colour is applied by the caller.

use crate::cli::table::{Table, TableColumn};
use crate::config::{Config, NumberStyle};
use crate::core::views::{Dashboard, Page, PageView, Report};
use crate::domain::transaction::Transaction;

const SHORT_ID_LEN: usize = 8;

/// Currency symbol plus the digit separators of the configured locale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmountFormat {
    pub symbol: String,
    pub style: NumberStyle,
}

impl AmountFormat {
    pub fn new(symbol: impl Into<String>, style: NumberStyle) -> Self {
        Self {
            symbol: symbol.into(),
            style,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.currency_symbol.clone(), config.number_style())
    }

    /// Two decimals, grouped thousands, and a leading sign when negative.
    pub fn format(&self, value: f64) -> String {
        let cents = (value.abs() * 100.0).round() as u64;
        let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
        format!(
            "{sign}{}{}{}{:02}",
            self.symbol,
            group_thousands(cents / 100, self.style.grouping),
            self.style.decimal,
            cents % 100
        )
    }
}

fn group_thousands(value: u64, separator: char) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(separator);
        }
        out.push(ch);
    }
    out
}

pub fn short_id(txn: &Transaction) -> String {
    txn.id.as_str().chars().take(SHORT_ID_LEN).collect()
}

/// Returns the page title and its rendered body.
pub fn render_page(view: &PageView<'_>, amounts: &AmountFormat) -> (&'static str, String) {
    match view {
        PageView::Dashboard(dashboard) => {
            (Page::Dashboard.title(), render_dashboard(dashboard, amounts))
        }
        PageView::List { page, rows, total } => {
            (page.title(), render_list(*page, rows, *total, amounts))
        }
        PageView::Reports(report) => (Page::Reports.title(), render_report(report, amounts)),
    }
}

fn render_dashboard(dashboard: &Dashboard, amounts: &AmountFormat) -> String {
    let totals = &dashboard.totals;
    let lines = [
        ("Initial balance", amounts.format(totals.initial_balance)),
        ("Income", amounts.format(totals.income)),
        ("Paid expenses", amounts.format(totals.paid_expenses)),
        ("Pending expenses", amounts.format(totals.pending_expenses)),
        ("Balance", amounts.format(totals.balance)),
        (
            "Bills to pay",
            format!(
                "{} of {} records",
                dashboard.payable_count, dashboard.transaction_count
            ),
        ),
    ];
    lines
        .iter()
        .map(|(label, value)| format!("{label:<18}{value}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_list(page: Page, rows: &[&Transaction], total: f64, amounts: &AmountFormat) -> String {
    if rows.is_empty() {
        return "No records.".to_string();
    }
    let show_status = matches!(page, Page::Outflows);
    let mut columns = vec![
        TableColumn::left("ID"),
        TableColumn::left("Date"),
        TableColumn::left("Description").max_width(32),
        TableColumn::left("Category").max_width(18),
        TableColumn::right("Amount"),
    ];
    if show_status {
        columns.push(TableColumn::left("Status"));
    }
    let mut table = Table::new(columns);
    for txn in rows {
        let mut row = vec![
            short_id(txn),
            txn.date.format("%Y-%m-%d").to_string(),
            txn.description.clone(),
            txn.category().unwrap_or("-").to_string(),
            amounts.format(txn.amount),
        ];
        if show_status {
            row.push(txn.status().map(|s| s.to_string()).unwrap_or_default());
        }
        table.push_row(row);
    }
    format!(
        "{}\n\nTotal: {} ({} records)",
        table.render(),
        amounts.format(total),
        rows.len()
    )
}

fn render_report(report: &Report, amounts: &AmountFormat) -> String {
    if report.categories.is_empty() {
        return "No records.".to_string();
    }
    let mut categories = Table::new(vec![
        TableColumn::left("Category").max_width(24),
        TableColumn::right("Income"),
        TableColumn::right("Expenses"),
    ]);
    for row in &report.categories {
        categories.push_row(vec![
            row.category.clone(),
            amounts.format(row.income),
            amounts.format(row.expenses),
        ]);
    }
    let mut months = Table::new(vec![
        TableColumn::left("Month"),
        TableColumn::right("Income"),
        TableColumn::right("Expenses"),
        TableColumn::right("Net"),
    ]);
    for row in &report.months {
        months.push_row(vec![
            row.month.clone(),
            amounts.format(row.income),
            amounts.format(row.expenses),
            amounts.format(row.net()),
        ]);
    }
    format!(
        "By category\n{}\n\nBy month\n{}",
        categories.render(),
        months.render()
    )
}
