mod common;

use std::fs;

use cashbook_core::{
    domain::{ExpenseStatus, TransactionDraft},
    storage::{KeyValueStore, INITIAL_BALANCE_KEY, TRANSACTIONS_KEY},
};
use common::{day, open_book, temp_root};

#[test]
fn state_survives_reopening_the_store() {
    let root = temp_root();
    let (mut book, _) = open_book(&root);
    book.set_initial_balance(250.0).unwrap();
    let rent = TransactionDraft::expense("Rent", 200.0, day(2024, 3, 1)).with_category("Home");
    let rent = book.add(rent).unwrap();
    book.add(TransactionDraft::income("Salary", 1000.0, day(2024, 3, 5))).unwrap();
    book.mark_paid(&rent.id).unwrap();

    let (reopened, _) = open_book(&root);
    assert_eq!(reopened.initial_balance(), 250.0);
    assert_eq!(reopened.transactions(), book.transactions());
    assert_eq!(
        reopened.transaction(&rent.id).and_then(|t| t.status()),
        Some(ExpenseStatus::Paid)
    );
    assert_eq!(reopened.balance(), 1050.0);
}

#[test]
fn slot_files_use_the_documented_keys() {
    let root = temp_root();
    let (mut book, store) = open_book(&root);
    book.set_initial_balance(12.5).unwrap();
    book.add(TransactionDraft::income("Gift", 20.0, day(2024, 1, 2))).unwrap();

    assert_eq!(store.read(INITIAL_BALANCE_KEY).unwrap().as_deref(), Some("12.5"));
    let raw = fs::read_to_string(store.slot_path(TRANSACTIONS_KEY)).unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let first = &json[0];
    assert_eq!(first["type"], "INCOME");
    assert_eq!(first["date"], "2024-01-02");
    assert_eq!(first["amount"], 20.0);
    assert!(first.get("status").is_none());
}

#[test]
fn corrupt_slots_fall_back_to_defaults() {
    let root = temp_root();
    fs::write(root.join("transactions.json"), "{not json").unwrap();
    fs::write(root.join("initialBalance.json"), "\"abc\"").unwrap();

    let (book, _) = open_book(&root);
    assert!(book.transactions().is_empty());
    assert_eq!(book.initial_balance(), 0.0);
}

#[test]
fn legacy_records_load_and_default_to_pending() {
    let root = temp_root();
    let legacy = r#"[
        {"id": "lq3k9x2m7ab", "type": "EXPENSE", "description": "Water",
         "amount": 40, "date": "2023-11-20T00:00:00.000Z", "category": "Utilities"},
        {"id": "lq3k9y0000z", "type": "INCOME", "description": "Refund",
         "amount": 15.5, "date": "2023-11-21"}
    ]"#;
    fs::write(root.join("transactions.json"), legacy).unwrap();
    fs::write(root.join("initialBalance.json"), "100").unwrap();

    let (mut book, _) = open_book(&root);
    assert_eq!(book.transactions().len(), 2);
    let water = &book.transactions()[0];
    assert_eq!(water.status(), Some(ExpenseStatus::Pending));
    assert_eq!(water.date, day(2023, 11, 20));
    assert_eq!(book.balance(), 115.5);

    let id = book.resolve_id("lq3k9x").unwrap();
    book.mark_paid(&id).unwrap();
    assert_eq!(book.balance(), 75.5);
}

#[test]
fn failed_write_keeps_previous_state() {
    let root = temp_root();
    let (mut book, store) = open_book(&root);
    book.add(TransactionDraft::income("Salary", 10.0, day(2024, 5, 1))).unwrap();
    let before = fs::read_to_string(store.slot_path(TRANSACTIONS_KEY)).unwrap();

    // A directory in place of the staging file makes the write fail.
    fs::create_dir_all(root.join("transactions.json.tmp")).unwrap();
    let result = book.add(TransactionDraft::income("Bonus", 5.0, day(2024, 5, 2)));

    assert!(result.is_err());
    assert_eq!(book.transactions().len(), 1);
    assert_eq!(fs::read_to_string(store.slot_path(TRANSACTIONS_KEY)).unwrap(), before);
}
