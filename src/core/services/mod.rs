pub mod summary_service;
pub mod transaction_service;

pub use summary_service::{CategoryTotals, MonthlyTotals, SummaryService, Totals};
pub use transaction_service::TransactionService;

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{0}")]
    Invalid(String),
}
