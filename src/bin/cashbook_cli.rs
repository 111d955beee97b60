use std::process;

fn main() {
    cashbook_core::init();
    if let Err(err) = cashbook_core::cli::run_cli() {
        eprintln!("Error: {err}");
        process::exit(1);
    }
}
