use std::collections::BTreeMap;

use chrono::Datelike;

use crate::domain::transaction::{ExpenseStatus, Transaction, TransactionKind};

/// Label used for records without a category in reports.
pub const UNCATEGORIZED: &str = "(none)";

/// Headline figures shown on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Totals {
    pub initial_balance: f64,
    pub income: f64,
    pub paid_expenses: f64,
    pub pending_expenses: f64,
    pub balance: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTotals {
    pub category: String,
    pub income: f64,
    pub expenses: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyTotals {
    /// `YYYY-MM`
    pub month: String,
    pub income: f64,
    pub expenses: f64,
}

impl MonthlyTotals {
    pub fn net(&self) -> f64 {
        self.income - self.expenses
    }
}

pub struct SummaryService;

impl SummaryService {
    /// `initial_balance + income - paid expenses`. Pending expenses do not count.
    pub fn compute_balance(transactions: &[Transaction], initial_balance: f64) -> f64 {
        let income: f64 = transactions
            .iter()
            .filter(|t| t.is_income())
            .map(|t| t.amount)
            .sum();
        let paid: f64 = transactions
            .iter()
            .filter(|t| t.status() == Some(ExpenseStatus::Paid))
            .map(|t| t.amount)
            .sum();
        initial_balance + income - paid
    }

    pub fn totals(transactions: &[Transaction], initial_balance: f64) -> Totals {
        let mut totals = Totals {
            initial_balance,
            ..Totals::default()
        };
        for txn in transactions {
            match txn.kind {
                TransactionKind::Income { .. } => totals.income += txn.amount,
                TransactionKind::Expense {
                    status: ExpenseStatus::Paid,
                    ..
                } => totals.paid_expenses += txn.amount,
                TransactionKind::Expense {
                    status: ExpenseStatus::Pending,
                    ..
                } => totals.pending_expenses += txn.amount,
            }
        }
        totals.balance = Self::compute_balance(transactions, initial_balance);
        totals
    }

    /// Income and expense sums per category, in order of first appearance.
    /// Expenses count regardless of status.
    pub fn by_category(transactions: &[Transaction]) -> Vec<CategoryTotals> {
        let mut rows: Vec<CategoryTotals> = Vec::new();
        for txn in transactions {
            let name = txn.category().unwrap_or(UNCATEGORIZED);
            let index = match rows.iter().position(|row| row.category == name) {
                Some(index) => index,
                None => {
                    rows.push(CategoryTotals {
                        category: name.to_string(),
                        income: 0.0,
                        expenses: 0.0,
                    });
                    rows.len() - 1
                }
            };
            if txn.is_income() {
                rows[index].income += txn.amount;
            } else {
                rows[index].expenses += txn.amount;
            }
        }
        rows
    }

    /// Income and expense sums per calendar month, oldest first.
    pub fn by_month(transactions: &[Transaction]) -> Vec<MonthlyTotals> {
        let mut months: BTreeMap<(i32, u32), (f64, f64)> = BTreeMap::new();
        for txn in transactions {
            let entry = months
                .entry((txn.date.year(), txn.date.month()))
                .or_insert((0.0, 0.0));
            if txn.is_income() {
                entry.0 += txn.amount;
            } else {
                entry.1 += txn.amount;
            }
        }
        months
            .into_iter()
            .map(|((year, month), (income, expenses))| MonthlyTotals {
                month: format!("{year:04}-{month:02}"),
                income,
                expenses,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::transaction::{TransactionDraft, TransactionId};
    use chrono::NaiveDate;

    fn on(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(draft: TransactionDraft) -> Transaction {
        draft.into_transaction(TransactionId::generate())
    }

    fn sample() -> Vec<Transaction> {
        vec![
            record(
                TransactionDraft::income("Salary", 2000.0, on(2024, 1, 5)).with_category("Work"),
            ),
            record(
                TransactionDraft::expense("Rent", 800.0, on(2024, 1, 1))
                    .with_category("Housing")
                    .with_status(ExpenseStatus::Paid),
            ),
            record(TransactionDraft::expense("Gym", 40.0, on(2024, 2, 3))),
            record(TransactionDraft::income("Bonus", 300.0, on(2024, 2, 20)).with_category("Work")),
        ]
    }

    #[test]
    fn balance_ignores_pending_expenses() {
        assert_eq!(SummaryService::compute_balance(&sample(), 100.0), 1600.0);
    }

    fn parse(records: &str) -> Vec<Transaction> {
        serde_json::from_str(records).expect("valid transaction list")
    }

    #[test]
    fn balance_is_initial_plus_income_minus_paid_for_mixed_collections() {
        let cases = [
            ("[]", 0.0, 0.0),
            (
                r#"[
                    {"id": "a", "type": "INCOME", "status": "PAID", "description": "Refund",
                     "amount": 50, "date": "2024-01-02"},
                    {"id": "b", "type": "EXPENSE", "description": "Phone",
                     "amount": 20, "date": "2024-01-03"},
                    {"id": "c", "type": "EXPENSE", "status": "PAID", "description": "Free trial",
                     "amount": 0, "date": "2024-01-04"}
                ]"#,
                10.0,
                60.0,
            ),
            (
                r#"[
                    {"id": "d", "type": "INCOME", "description": "Nothing",
                     "amount": 0, "date": "2024-02-01"},
                    {"id": "e", "type": "EXPENSE", "status": "PAID", "description": "Taxi",
                     "amount": 12.5, "date": "2024-02-02"},
                    {"id": "f", "type": "INCOME", "description": "Tip",
                     "amount": 7.25, "date": "2024-02-03"}
                ]"#,
                -5.0,
                -10.25,
            ),
            (
                r#"[
                    {"id": "g", "type": "INCOME", "status": "PENDING", "description": "Salary",
                     "amount": 100, "date": "2024-03-01"},
                    {"id": "h", "type": "INCOME", "description": "Sale",
                     "amount": 25.5, "date": "2024-03-02"},
                    {"id": "i", "type": "EXPENSE", "status": "PAID", "description": "Food",
                     "amount": 30, "date": "2024-03-03"},
                    {"id": "j", "type": "EXPENSE", "status": "PAID", "description": "Gum",
                     "amount": 0.5, "date": "2024-03-04"},
                    {"id": "k", "type": "EXPENSE", "status": "PENDING", "description": "Car",
                     "amount": 1000, "date": "2024-03-05"}
                ]"#,
                1000.0,
                1095.0,
            ),
        ];

        for (records, initial, expected) in cases {
            let transactions = parse(records);
            let by_kind = transactions.iter().fold(initial, |acc, t| match &t.kind {
                TransactionKind::Income { .. } => acc + t.amount,
                TransactionKind::Expense {
                    status: ExpenseStatus::Paid,
                    ..
                } => acc - t.amount,
                TransactionKind::Expense { .. } => acc,
            });
            let balance = SummaryService::compute_balance(&transactions, initial);
            assert_eq!(balance, expected, "records: {records}");
            assert_eq!(balance, by_kind, "records: {records}");
        }
    }

    #[test]
    fn balance_of_empty_collection_is_initial_balance() {
        assert_eq!(SummaryService::compute_balance(&[], -12.5), -12.5);
    }

    #[test]
    fn totals_split_expenses_by_status() {
        let totals = SummaryService::totals(&sample(), 0.0);
        assert_eq!(totals.income, 2300.0);
        assert_eq!(totals.paid_expenses, 800.0);
        assert_eq!(totals.pending_expenses, 40.0);
        assert_eq!(totals.balance, 1500.0);
    }

    #[test]
    fn categories_keep_first_appearance_order() {
        let rows = SummaryService::by_category(&sample());
        let names: Vec<_> = rows.iter().map(|r| r.category.as_str()).collect();
        assert_eq!(names, vec!["Work", "Housing", UNCATEGORIZED]);
        assert_eq!(rows[0].income, 2300.0);
        assert_eq!(rows[2].expenses, 40.0);
    }

    #[test]
    fn months_are_sorted_chronologically() {
        let rows = SummaryService::by_month(&sample());
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].month, "2024-01");
        assert_eq!(rows[0].net(), 1200.0);
        assert_eq!(rows[1].month, "2024-02");
        assert_eq!(rows[1].net(), 260.0);
    }
}
