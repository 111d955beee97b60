#![doc(test(attr(deny(warnings))))]

//! Cashbook Core tracks income and expenses, the payable/paid state of each
//! expense, and the running balance derived from them. State lives in a
//! pluggable key-value store; the bundled shell renders dashboard, list, and
//! report pages in a terminal.

pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod errors;
pub mod storage;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup debug log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::debug!("Cashbook tracing initialized.");
    });
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_does_not_panic() {
        super::init();
        super::init();
    }
}
