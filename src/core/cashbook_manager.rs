use std::sync::Arc;

use crate::core::services::{SummaryService, Totals, TransactionService};
use crate::domain::transaction::{Transaction, TransactionDraft, TransactionId};
use crate::errors::{CashbookError, Result};
use crate::storage::{KeyValueStore, PersistentSlot, INITIAL_BALANCE_KEY, TRANSACTIONS_KEY};

/// Facade that owns the in-memory transaction list and the initial balance,
/// mirroring both to the injected store after every change.
pub struct CashbookManager {
    transactions: PersistentSlot<Vec<Transaction>>,
    initial_balance: PersistentSlot<f64>,
}

impl CashbookManager {
    /// Loads state from `store`, starting empty when nothing usable is stored.
    pub fn open(store: Arc<dyn KeyValueStore>) -> Self {
        let transactions = PersistentSlot::open(store.clone(), TRANSACTIONS_KEY, Vec::new());
        let initial_balance = PersistentSlot::open(store, INITIAL_BALANCE_KEY, 0.0);
        tracing::info!(
            transactions = transactions.get().len(),
            initial_balance = *initial_balance.get(),
            "cashbook loaded"
        );
        Self {
            transactions,
            initial_balance,
        }
    }

    pub fn transactions(&self) -> &[Transaction] {
        self.transactions.get()
    }

    pub fn transaction(&self, id: &TransactionId) -> Option<&Transaction> {
        TransactionService::find(self.transactions(), id)
    }

    pub fn initial_balance(&self) -> f64 {
        *self.initial_balance.get()
    }

    pub fn set_initial_balance(&mut self, value: f64) -> Result<()> {
        if !value.is_finite() {
            return Err(CashbookError::Validation(format!(
                "initial balance {value} is not a finite number"
            )));
        }
        self.initial_balance.set(value)?;
        tracing::info!(initial_balance = value, "initial balance updated");
        Ok(())
    }

    /// Derived on every call from the current state.
    pub fn balance(&self) -> f64 {
        SummaryService::compute_balance(self.transactions(), self.initial_balance())
    }

    pub fn totals(&self) -> Totals {
        SummaryService::totals(self.transactions(), self.initial_balance())
    }

    /// Appends a new record built from `draft` and returns it.
    pub fn add(&mut self, draft: TransactionDraft) -> Result<Transaction> {
        let mut next = self.transactions.get().clone();
        let created = TransactionService::add(&mut next, draft)?;
        self.commit(next)?;
        tracing::info!(
            id = %created.id,
            kind = %created.transaction_type(),
            "transaction recorded"
        );
        Ok(created)
    }

    /// Replaces the stored record sharing `record.id`. Invalid amounts are
    /// rejected and nothing is written.
    pub fn update(&mut self, record: Transaction) -> Result<&[Transaction]> {
        let mut next = self.transactions.get().clone();
        TransactionService::update(&mut next, record)?;
        self.commit(next)?;
        Ok(self.transactions())
    }

    /// Deletes unconditionally; callers are expected to have confirmed.
    pub fn delete(&mut self, id: &TransactionId) -> Result<&[Transaction]> {
        self.apply(|next| {
            if TransactionService::remove(next, id).is_none() {
                tracing::debug!(id = %id, "delete ignored; id not found");
            }
        })
    }

    pub fn mark_paid(&mut self, id: &TransactionId) -> Result<&[Transaction]> {
        self.apply(|next| {
            TransactionService::mark_paid(next, id);
        })
    }

    pub fn mark_unpaid(&mut self, id: &TransactionId) -> Result<&[Transaction]> {
        self.apply(|next| {
            TransactionService::mark_unpaid(next, id);
        })
    }

    /// Resolves a full id or unique prefix against the current collection.
    pub fn resolve_id(&self, needle: &str) -> Result<TransactionId> {
        Ok(TransactionService::resolve_id(self.transactions(), needle)?)
    }

    fn apply<F>(&mut self, mutator: F) -> Result<&[Transaction]>
    where
        F: FnOnce(&mut Vec<Transaction>),
    {
        let mut next = self.transactions.get().clone();
        mutator(&mut next);
        self.commit(next)?;
        Ok(self.transactions())
    }

    fn commit(&mut self, next: Vec<Transaction>) -> Result<()> {
        self.transactions.set(next)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::transaction::ExpenseStatus;
    use crate::storage::MemoryStore;
    use chrono::NaiveDate;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    #[test]
    fn balance_scenario_follows_mutations() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let mut book = CashbookManager::open(store);
        book.set_initial_balance(100.0).unwrap();
        assert_eq!(book.balance(), 100.0);

        let income = book.add(TransactionDraft::income("Salary", 50.0, day())).unwrap();
        assert_eq!(book.balance(), 150.0);

        let expense = book.add(TransactionDraft::expense("Phone", 30.0, day())).unwrap();
        assert_eq!(expense.status(), Some(ExpenseStatus::Pending));
        assert_eq!(book.balance(), 150.0);

        book.mark_paid(&expense.id).unwrap();
        assert_eq!(book.balance(), 120.0);

        book.delete(&income.id).unwrap();
        assert_eq!(book.balance(), 70.0);
    }

    #[test]
    fn mutations_are_mirrored_to_the_store() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let mut book = CashbookManager::open(store.clone());
        let created = book.add(TransactionDraft::expense("Water", 20.0, day())).unwrap();
        book.mark_paid(&created.id).unwrap();

        let reopened = CashbookManager::open(store);
        assert_eq!(reopened.transactions(), book.transactions());
        assert_eq!(
            reopened.transaction(&created.id).and_then(|t| t.status()),
            Some(ExpenseStatus::Paid)
        );
    }

    #[test]
    fn unknown_ids_leave_state_unchanged() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let mut book = CashbookManager::open(store);
        book.add(TransactionDraft::income("Gift", 5.0, day())).unwrap();
        let before = book.transactions().to_vec();
        let ghost = TransactionId::from("ghost");

        assert_eq!(book.delete(&ghost).unwrap(), before.as_slice());
        assert_eq!(book.mark_paid(&ghost).unwrap(), before.as_slice());
        assert_eq!(book.mark_unpaid(&ghost).unwrap(), before.as_slice());
    }

    #[test]
    fn invalid_update_is_rejected_and_not_persisted() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let mut book = CashbookManager::open(store.clone());
        book.add(TransactionDraft::income("Salary", 900.0, day())).unwrap();
        let rent = book.add(TransactionDraft::expense("Rent", 400.0, day())).unwrap();
        let before = book.transactions().to_vec();

        for amount in [f64::NAN, -500.0] {
            let mut edited = rent.clone();
            edited.amount = amount;
            let err = book.update(edited).expect_err("invalid amount must fail");
            assert!(matches!(err, CashbookError::Validation(_)));
        }
        assert_eq!(book.transactions(), before.as_slice());

        let reopened = CashbookManager::open(store);
        assert_eq!(reopened.transactions(), before.as_slice());
    }

    #[test]
    fn rejects_non_finite_initial_balance() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let mut book = CashbookManager::open(store);
        assert!(book.set_initial_balance(f64::INFINITY).is_err());
        assert_eq!(book.initial_balance(), 0.0);
    }
}
