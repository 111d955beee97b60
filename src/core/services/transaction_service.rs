//! Business logic helpers for managing transactions.
//!
//! Every helper works on the collection handed in; unknown ids are no-ops,
//! never errors.

use crate::core::services::{ServiceError, ServiceResult};
use crate::domain::transaction::{ExpenseStatus, Transaction, TransactionDraft, TransactionId};

/// Provides validated CRUD helpers for the transaction collection.
pub struct TransactionService;

impl TransactionService {
    /// Assigns a fresh id to `draft` and appends it. Returns the stored record.
    pub fn add(
        transactions: &mut Vec<Transaction>,
        draft: TransactionDraft,
    ) -> ServiceResult<Transaction> {
        draft.validate().map_err(ServiceError::Invalid)?;
        let transaction = draft.into_transaction(TransactionId::generate());
        transactions.push(transaction.clone());
        tracing::debug!(id = %transaction.id, "transaction added");
        Ok(transaction)
    }

    /// Replaces the record sharing `record.id`, keeping its position.
    ///
    /// Returns `Ok(false)` when no record matches or when the update would
    /// change the transaction type, which is fixed at creation. Invalid
    /// amounts are rejected before anything changes.
    pub fn update(transactions: &mut [Transaction], record: Transaction) -> ServiceResult<bool> {
        record.validate().map_err(ServiceError::Invalid)?;
        let Some(slot) = transactions.iter_mut().find(|t| t.id == record.id) else {
            tracing::debug!(id = %record.id, "update ignored; id not found");
            return Ok(false);
        };
        if slot.transaction_type() != record.transaction_type() {
            tracing::warn!(
                id = %record.id,
                stored = %slot.transaction_type(),
                requested = %record.transaction_type(),
                "update ignored; transaction type cannot change"
            );
            return Ok(false);
        }
        *slot = record;
        Ok(true)
    }

    /// Removes the record identified by `id`, returning it when present.
    pub fn remove(transactions: &mut Vec<Transaction>, id: &TransactionId) -> Option<Transaction> {
        let index = transactions.iter().position(|t| &t.id == id)?;
        Some(transactions.remove(index))
    }

    pub fn mark_paid(transactions: &mut [Transaction], id: &TransactionId) -> bool {
        Self::set_status(transactions, id, ExpenseStatus::Paid)
    }

    pub fn mark_unpaid(transactions: &mut [Transaction], id: &TransactionId) -> bool {
        Self::set_status(transactions, id, ExpenseStatus::Pending)
    }

    /// Sets the status of the expense identified by `id`; income is left alone.
    pub fn set_status(
        transactions: &mut [Transaction],
        id: &TransactionId,
        status: ExpenseStatus,
    ) -> bool {
        transactions
            .iter_mut()
            .find(|t| &t.id == id)
            .map(|t| t.set_status(status))
            .unwrap_or(false)
    }

    pub fn find<'a>(
        transactions: &'a [Transaction],
        id: &TransactionId,
    ) -> Option<&'a Transaction> {
        transactions.iter().find(|t| &t.id == id)
    }

    /// Resolves an exact id or a unique id prefix.
    pub fn resolve_id(transactions: &[Transaction], needle: &str) -> ServiceResult<TransactionId> {
        let needle = needle.trim();
        if needle.is_empty() {
            return Err(ServiceError::Invalid("transaction id must not be empty".into()));
        }
        if let Some(exact) = transactions.iter().find(|t| t.id.as_str() == needle) {
            return Ok(exact.id.clone());
        }
        let mut matches = transactions
            .iter()
            .filter(|t| t.id.as_str().starts_with(needle));
        match (matches.next(), matches.next()) {
            (Some(found), None) => Ok(found.id.clone()),
            (Some(_), Some(_)) => Err(ServiceError::Invalid(format!(
                "transaction id `{needle}` is ambiguous"
            ))),
            (None, _) => Err(ServiceError::Invalid(format!(
                "transaction `{needle}` not found"
            ))),
        }
    }
}
