pub mod common;
pub mod transaction;

pub use common::Displayable;
pub use transaction::{
    ExpenseStatus, Transaction, TransactionDraft, TransactionId, TransactionKind, TransactionType,
};
