//! Domain models for income and expense records.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::Displayable;

/// Stable identifier of a transaction.
///
/// Stored as a plain string so records written by older builds (which used
/// `<millis>-<random>` identifiers) keep loading; fresh ids are UUID v4.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(String);

impl TransactionId {
    /// Generates a new random identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TransactionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for TransactionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl AsRef<str> for TransactionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "UPPERCASE")]
/// Payment state of an expense.
pub enum ExpenseStatus {
    #[default]
    Pending,
    Paid,
}

impl fmt::Display for ExpenseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ExpenseStatus::Pending => "Pending",
            ExpenseStatus::Paid => "Paid",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Discriminant of [`TransactionKind`] without its payload.
pub enum TransactionType {
    Income,
    Expense,
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TransactionType::Income => "Income",
            TransactionType::Expense => "Expense",
        };
        f.write_str(label)
    }
}

/// Type-specific part of a transaction. Only expenses carry a payment status.
///
/// Serialized inline with the parent record under a `"type"` tag, so the
/// stored JSON stays flat: `{"type": "EXPENSE", "status": "PAID", ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "UPPERCASE")]
pub enum TransactionKind {
    Income {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        category: Option<String>,
    },
    Expense {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        category: Option<String>,
        #[serde(default)]
        status: ExpenseStatus,
    },
}

impl TransactionKind {
    pub fn transaction_type(&self) -> TransactionType {
        match self {
            TransactionKind::Income { .. } => TransactionType::Income,
            TransactionKind::Expense { .. } => TransactionType::Expense,
        }
    }

    pub fn category(&self) -> Option<&str> {
        match self {
            TransactionKind::Income { category } | TransactionKind::Expense { category, .. } => {
                category.as_deref()
            }
        }
    }

    pub fn status(&self) -> Option<ExpenseStatus> {
        match self {
            TransactionKind::Income { .. } => None,
            TransactionKind::Expense { status, .. } => Some(*status),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    #[serde(flatten)]
    pub kind: TransactionKind,
    pub description: String,
    pub amount: f64,
    #[serde(with = "iso_date")]
    pub date: NaiveDate,
}

impl Transaction {
    pub fn transaction_type(&self) -> TransactionType {
        self.kind.transaction_type()
    }

    pub fn is_income(&self) -> bool {
        matches!(self.kind, TransactionKind::Income { .. })
    }

    pub fn is_expense(&self) -> bool {
        matches!(self.kind, TransactionKind::Expense { .. })
    }

    pub fn status(&self) -> Option<ExpenseStatus> {
        self.kind.status()
    }

    pub fn category(&self) -> Option<&str> {
        self.kind.category()
    }

    pub fn validate(&self) -> Result<(), String> {
        validate_amount(self.amount)
    }

    /// Sets the payment status. Returns `false` (and changes nothing) for income.
    pub fn set_status(&mut self, new_status: ExpenseStatus) -> bool {
        match &mut self.kind {
            TransactionKind::Expense { status, .. } => {
                *status = new_status;
                true
            }
            TransactionKind::Income { .. } => false,
        }
    }
}

impl Displayable for Transaction {
    fn display_label(&self) -> String {
        match self.status() {
            Some(status) => format!("{} {} [{}]", self.transaction_type(), self.id, status),
            None => format!("{} {}", self.transaction_type(), self.id),
        }
    }
}

/// Everything needed to create a transaction except its identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionDraft {
    pub kind: TransactionKind,
    pub description: String,
    pub amount: f64,
    pub date: NaiveDate,
}

impl TransactionDraft {
    pub fn income(description: impl Into<String>, amount: f64, date: NaiveDate) -> Self {
        Self {
            kind: TransactionKind::Income { category: None },
            description: description.into(),
            amount,
            date,
        }
    }

    /// New expense, pending until marked paid.
    pub fn expense(description: impl Into<String>, amount: f64, date: NaiveDate) -> Self {
        Self {
            kind: TransactionKind::Expense {
                category: None,
                status: ExpenseStatus::Pending,
            },
            description: description.into(),
            amount,
            date,
        }
    }

    pub fn with_category(mut self, value: impl Into<String>) -> Self {
        match &mut self.kind {
            TransactionKind::Income { category } | TransactionKind::Expense { category, .. } => {
                *category = Some(value.into());
            }
        }
        self
    }

    /// Ignored for income drafts.
    pub fn with_status(mut self, value: ExpenseStatus) -> Self {
        if let TransactionKind::Expense { status, .. } = &mut self.kind {
            *status = value;
        }
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        validate_amount(self.amount)
    }

    pub fn into_transaction(self, id: TransactionId) -> Transaction {
        Transaction {
            id,
            kind: self.kind,
            description: self.description,
            amount: self.amount,
            date: self.date,
        }
    }
}

/// Amounts must be finite and non-negative.
pub fn validate_amount(amount: f64) -> Result<(), String> {
    if !amount.is_finite() {
        return Err(format!("amount {amount} is not a finite number"));
    }
    if amount < 0.0 {
        return Err(format!("amount {amount} must not be negative"));
    }
    Ok(())
}

/// Dates are written as `YYYY-MM-DD`; full RFC 3339 timestamps are accepted
/// on read and truncated to their calendar date.
mod iso_date {
    use chrono::{DateTime, NaiveDate};
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d";

    pub fn serialize<S>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&date.format(FORMAT))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        let trimmed = raw.trim();
        NaiveDate::parse_from_str(trimmed, FORMAT)
            .or_else(|_| DateTime::parse_from_rfc3339(trimmed).map(|dt| dt.date_naive()))
            .map_err(|_| D::Error::custom(format!("invalid ISO-8601 date `{raw}`")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn expense_serializes_flat_with_type_tag() {
        let txn = TransactionDraft::expense("Rent", 900.0, date(2024, 3, 1))
            .with_category("Housing")
            .into_transaction(TransactionId::from("abc"));

        let value = serde_json::to_value(&txn).unwrap();
        assert_eq!(
            value,
            json!({
                "id": "abc",
                "type": "EXPENSE",
                "category": "Housing",
                "status": "PENDING",
                "description": "Rent",
                "amount": 900.0,
                "date": "2024-03-01"
            })
        );
    }

    #[test]
    fn income_omits_status_and_empty_category() {
        let txn = TransactionDraft::income("Salary", 3000.0, date(2024, 3, 5))
            .into_transaction(TransactionId::from("inc"));
        let value = serde_json::to_value(&txn).unwrap();
        assert_eq!(value["type"], "INCOME");
        assert!(value.get("status").is_none());
        assert!(value.get("category").is_none());
    }

    #[test]
    fn legacy_records_load() {
        let raw = json!([
            {
                "id": "1712345678901-0.123456",
                "type": "INCOME",
                "description": "Freelance",
                "amount": 250,
                "date": "2024-04-05",
                "status": "PAID"
            },
            {
                "id": "1712345678902-0.654321",
                "type": "EXPENSE",
                "description": "Groceries",
                "amount": 80.5,
                "date": "2024-04-06T00:00:00.000Z"
            }
        ]);

        let parsed: Vec<Transaction> = serde_json::from_value(raw).unwrap();
        assert_eq!(parsed[0].id.as_str(), "1712345678901-0.123456");
        assert_eq!(parsed[0].status(), None);
        assert_eq!(parsed[1].status(), Some(ExpenseStatus::Pending));
        assert_eq!(parsed[1].date, date(2024, 4, 6));
    }

    #[test]
    fn set_status_is_rejected_for_income() {
        let mut income = TransactionDraft::income("Gift", 10.0, date(2024, 1, 1))
            .into_transaction(TransactionId::generate());
        assert!(!income.set_status(ExpenseStatus::Paid));
        assert_eq!(income.status(), None);
    }

    #[test]
    fn validate_rejects_negative_and_nan_amounts() {
        let today = date(2024, 1, 1);
        assert!(TransactionDraft::expense("x", -1.0, today).validate().is_err());
        assert!(TransactionDraft::expense("x", f64::NAN, today).validate().is_err());
        assert!(TransactionDraft::expense("x", 0.0, today).validate().is_ok());
    }
}
