pub mod cashbook_manager;
pub mod services;
pub mod views;

pub use cashbook_manager::CashbookManager;
pub use views::{Page, PageView};
