//! Shell command handlers.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::output;
use crate::cli::registry::{registry, CommandEntry, CommandRegistry};
use crate::core::Page;
use crate::domain::transaction::{ExpenseStatus, TransactionDraft, TransactionKind};
use crate::domain::Displayable;
use crate::utils::build_info;

const DELETE_PROMPT: &str = "Are you sure you want to delete this record?";

pub fn register_all(registry: &mut CommandRegistry) {
    let entries = [
        CommandEntry::new("dashboard", "Show balance and totals", "dashboard", cmd_dashboard),
        CommandEntry::new("payable", "List expenses still to pay", "payable", cmd_payable),
        CommandEntry::new("paid", "List paid expenses", "paid", cmd_paid),
        CommandEntry::new("income", "List income", "income", cmd_income),
        CommandEntry::new("outflows", "List all expenses", "outflows", cmd_outflows),
        CommandEntry::new("saidas", "Alias of `outflows`", "saidas", cmd_outflows),
        CommandEntry::new("reports", "Totals by category and month", "reports", cmd_reports),
        CommandEntry::new("page", "Open a page by name", "page <name>", cmd_page),
        CommandEntry::new(
            "add",
            "Record income or an expense",
            "add <income|expense> <amount> <YYYY-MM-DD> <description> [--category <name>] [--paid]",
            cmd_add,
        ),
        CommandEntry::new(
            "edit",
            "Change fields of a record",
            "edit <id> [--description <text>] [--amount <n>] [--date <date>] [--category <name>]",
            cmd_edit,
        ),
        CommandEntry::new("delete", "Remove a record", "delete <id> [--yes]", cmd_delete),
        CommandEntry::new("pay", "Mark an expense as paid", "pay <id>", cmd_pay),
        CommandEntry::new("unpay", "Mark an expense as pending", "unpay <id>", cmd_unpay),
        CommandEntry::new("balance", "Print the current balance", "balance", cmd_balance),
        CommandEntry::new(
            "initial",
            "Show or set the initial balance",
            "initial [amount]",
            cmd_initial,
        ),
        CommandEntry::new(
            "config",
            "Show or change preferences",
            "config [show|set <locale|currency|color> <value>]",
            cmd_config,
        ),
        CommandEntry::new("help", "List commands or describe one", "help [command]", cmd_help),
        CommandEntry::new("version", "Print build information", "version", cmd_version),
        CommandEntry::new("exit", "Leave the shell", "exit", cmd_exit),
        CommandEntry::new("quit", "Leave the shell", "quit", cmd_exit),
    ];
    for entry in entries {
        registry.register(entry);
    }
}

/// Positional arguments plus `--flag value` options and bare `--switch`es.
#[derive(Debug, Default)]
pub(crate) struct ParsedArgs<'a> {
    pub positional: Vec<&'a str>,
    pub options: HashMap<&'a str, &'a str>,
    pub switches: Vec<&'a str>,
}

impl<'a> ParsedArgs<'a> {
    pub(crate) fn parse(
        args: &[&'a str],
        valued: &[&str],
        switches: &[&str],
    ) -> Result<Self, CommandError> {
        let mut parsed = ParsedArgs::default();
        let mut iter = args.iter().copied();
        while let Some(arg) = iter.next() {
            let Some(name) = arg.strip_prefix("--") else {
                parsed.positional.push(arg);
                continue;
            };
            if valued.contains(&name) {
                let value = iter.next().ok_or_else(|| {
                    CommandError::InvalidArguments(format!("`--{name}` expects a value"))
                })?;
                parsed.options.insert(name, value);
            } else if switches.contains(&name) {
                parsed.switches.push(name);
            } else {
                return Err(CommandError::InvalidArguments(format!(
                    "unknown option `--{name}`"
                )));
            }
        }
        Ok(parsed)
    }

    pub(crate) fn has(&self, switch: &str) -> bool {
        self.switches.contains(&switch)
    }
}

pub(crate) fn parse_amount(input: &str) -> Result<f64, CommandError> {
    let value: f64 = input
        .trim()
        .parse()
        .map_err(|_| CommandError::InvalidArguments(format!("invalid amount `{input}`")))?;
    if !value.is_finite() {
        return Err(CommandError::InvalidArguments(format!(
            "invalid amount `{input}`"
        )));
    }
    Ok(value)
}

pub(crate) fn parse_date(input: &str) -> Result<NaiveDate, CommandError> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").map_err(|_| {
        CommandError::InvalidArguments(format!("invalid date `{input}` (use YYYY-MM-DD)"))
    })
}

fn usage_error(name: &str) -> CommandError {
    let usage = registry().get(name).map(|entry| entry.usage).unwrap_or(name);
    CommandError::InvalidArguments(format!("usage: {usage}"))
}

fn single_id<'a>(name: &str, args: &[&'a str]) -> Result<&'a str, CommandError> {
    match args {
        [id] => Ok(id),
        _ => Err(usage_error(name)),
    }
}

fn show(context: &mut ShellContext, page: Page) -> CommandResult {
    context.show_page(page);
    Ok(())
}

fn cmd_dashboard(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    show(context, Page::Dashboard)
}

fn cmd_payable(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    show(context, Page::Payable)
}

fn cmd_paid(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    show(context, Page::Paid)
}

fn cmd_income(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    show(context, Page::Income)
}

fn cmd_outflows(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    show(context, Page::Outflows)
}

fn cmd_reports(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    show(context, Page::Reports)
}

fn cmd_page(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [name] = args else {
        return Err(usage_error("page"));
    };
    let page = name
        .parse::<Page>()
        .map_err(|err| CommandError::InvalidArguments(err.to_string()))?;
    show(context, page)
}

fn cmd_add(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let parsed = ParsedArgs::parse(args, &["category"], &["paid"])?;
    let [kind, amount, date, description @ ..] = parsed.positional.as_slice() else {
        return Err(usage_error("add"));
    };
    if description.is_empty() {
        return Err(usage_error("add"));
    }
    let amount = parse_amount(amount)?;
    let date = parse_date(date)?;
    let description = description.join(" ");

    let mut draft = match kind.to_ascii_lowercase().as_str() {
        "income" => {
            if parsed.has("paid") {
                return Err(CommandError::InvalidArguments(
                    "`--paid` only applies to expenses".into(),
                ));
            }
            TransactionDraft::income(description, amount, date)
        }
        "expense" => {
            let status = if parsed.has("paid") {
                ExpenseStatus::Paid
            } else {
                ExpenseStatus::Pending
            };
            TransactionDraft::expense(description, amount, date).with_status(status)
        }
        other => {
            return Err(CommandError::InvalidArguments(format!(
                "unknown transaction type `{other}` (use income or expense)"
            )))
        }
    };
    if let Some(category) = parsed.options.get("category") {
        draft = draft.with_category(*category);
    }

    let created = context.book_mut().add(draft)?;
    output::success(format!(
        "Recorded {} of {} ({})",
        created.display_label(),
        context.format_amount(created.amount),
        created.description
    ));
    Ok(())
}

fn cmd_edit(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let parsed = ParsedArgs::parse(args, &["description", "amount", "date", "category"], &[])?;
    let [needle] = parsed.positional.as_slice() else {
        return Err(usage_error("edit"));
    };
    if parsed.options.is_empty() {
        return Err(CommandError::InvalidArguments(
            "nothing to change; pass at least one option".into(),
        ));
    }
    let id = context.book().resolve_id(needle)?;
    let Some(mut record) = context.book().transaction(&id).cloned() else {
        return Err(CommandError::InvalidArguments(format!(
            "transaction `{needle}` not found"
        )));
    };

    if let Some(description) = parsed.options.get("description") {
        record.description = description.to_string();
    }
    if let Some(amount) = parsed.options.get("amount") {
        let amount = parse_amount(amount)?;
        if amount < 0.0 {
            return Err(CommandError::InvalidArguments(
                "amount must not be negative".into(),
            ));
        }
        record.amount = amount;
    }
    if let Some(date) = parsed.options.get("date") {
        record.date = parse_date(date)?;
    }
    if let Some(value) = parsed.options.get("category") {
        let cleared = value.is_empty() || *value == "-";
        match &mut record.kind {
            TransactionKind::Income { category } | TransactionKind::Expense { category, .. } => {
                *category = (!cleared).then(|| value.to_string());
            }
        }
    }

    let label = record.display_label();
    context.book_mut().update(record)?;
    output::success(format!("Updated {label}"));
    Ok(())
}

fn cmd_delete(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let parsed = ParsedArgs::parse(args, &[], &["yes"])?;
    let [needle] = parsed.positional.as_slice() else {
        return Err(usage_error("delete"));
    };
    let id = context.book().resolve_id(needle)?;
    if !context.confirm(DELETE_PROMPT, parsed.has("yes"))? {
        output::info("Deletion cancelled.");
        return Ok(());
    }
    context.book_mut().delete(&id)?;
    output::success(format!("Deleted {id}"));
    Ok(())
}

fn set_paid(context: &mut ShellContext, name: &str, args: &[&str], paid: bool) -> CommandResult {
    let needle = single_id(name, args)?;
    let id = context.book().resolve_id(needle)?;
    let is_expense = context
        .book()
        .transaction(&id)
        .map(|t| t.is_expense())
        .unwrap_or(false);
    if !is_expense {
        return Err(CommandError::InvalidArguments(format!(
            "`{needle}` is not an expense"
        )));
    }
    if paid {
        context.book_mut().mark_paid(&id)?;
        output::success(format!("Marked {id} as paid"));
    } else {
        context.book_mut().mark_unpaid(&id)?;
        output::success(format!("Marked {id} as pending"));
    }
    Ok(())
}

fn cmd_pay(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    set_paid(context, "pay", args, true)
}

fn cmd_unpay(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    set_paid(context, "unpay", args, false)
}

fn cmd_balance(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let balance = context.book().balance();
    output::info(format!("Balance: {}", context.format_amount(balance)));
    Ok(())
}

fn cmd_initial(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    match args {
        [] => {
            let value = context.book().initial_balance();
            output::info(format!("Initial balance: {}", context.format_amount(value)));
        }
        [amount] => {
            let value = parse_amount(amount)?;
            context.book_mut().set_initial_balance(value)?;
            output::success(format!(
                "Initial balance set to {}",
                context.format_amount(value)
            ));
        }
        _ => return Err(usage_error("initial")),
    }
    Ok(())
}

fn cmd_config(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    match args {
        [] => show_config(context),
        [action] if action.eq_ignore_ascii_case("show") => show_config(context),
        [action, key, value @ ..] if action.eq_ignore_ascii_case("set") && !value.is_empty() => {
            let value = value.join(" ");
            context.set_config_value(key, value.trim())?;
            output::success(format!("Updated `{key}`"));
            Ok(())
        }
        _ => Err(usage_error("config")),
    }
}

fn show_config(context: &ShellContext) -> CommandResult {
    let config = context.config();
    let data_dir = config
        .data_dir
        .as_ref()
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "(default)".into());
    let lines = [
        format!("  {:<10} {}", "locale", config.locale),
        format!("  {:<10} {}", "currency", config.currency_symbol),
        format!(
            "  {:<10} {}",
            "color",
            if config.ui_color_enabled { "on" } else { "off" }
        ),
        format!("  {:<10} {}", "data dir", data_dir),
        format!("  {:<10} {}", "sample", context.format_amount(1234.5)),
    ];
    output::section("Preferences");
    output::block(&lines.join("\n"));
    Ok(())
}

fn cmd_help(_context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if let [name] = args {
        let entry = registry().get(&name.to_ascii_lowercase()).ok_or_else(|| {
            CommandError::InvalidArguments(format!("no help for unknown command `{name}`"))
        })?;
        output::block(&format!("{}\n  usage: {}", entry.description, entry.usage));
        return Ok(());
    }
    output::section("Available commands");
    let lines: Vec<String> = registry()
        .list()
        .iter()
        .map(|entry| format!("  {:<10} {}", entry.name, entry.description))
        .collect();
    output::block(&lines.join("\n"));
    Ok(())
}

fn cmd_version(_context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    output::info(build_info::current().summary());
    Ok(())
}

fn cmd_exit(_context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    Err(CommandError::ExitRequested)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::core::{script_context, LoopControl};
    use crate::config::ConfigManager;

    fn run(context: &mut ShellContext, lines: &[&str]) -> LoopControl {
        let mut control = LoopControl::Continue;
        for line in lines {
            control = context.process_line(line).expect("line processed");
            if control == LoopControl::Exit {
                break;
            }
        }
        control
    }

    #[test]
    fn parsed_args_split_positionals_options_and_switches() {
        let args = ["expense", "10", "--category", "Food", "Lunch", "--paid"];
        let parsed = ParsedArgs::parse(&args, &["category"], &["paid"]).unwrap();
        assert_eq!(parsed.positional, vec!["expense", "10", "Lunch"]);
        assert_eq!(parsed.options.get("category"), Some(&"Food"));
        assert!(parsed.has("paid"));
        assert!(ParsedArgs::parse(&["--bogus"], &[], &[]).is_err());
        assert!(ParsedArgs::parse(&["--category"], &["category"], &[]).is_err());
    }

    #[test]
    fn scripted_session_tracks_balance() {
        let mut context = script_context();
        run(
            &mut context,
            &[
                "initial 100",
                "add income 50 2024-01-10 Salary --category Work",
                "add expense 30 2024-01-11 \"Phone bill\"",
            ],
        );
        assert_eq!(context.book().balance(), 150.0);

        let expense_id = context.book().transactions()[1].id.to_string();
        let pay = format!("pay {}", &expense_id[..8]);
        run(&mut context, &[pay.as_str()]);
        assert_eq!(context.book().balance(), 120.0);

        let income_id = context.book().transactions()[0].id.to_string();
        let delete = format!("delete {income_id}");
        run(&mut context, &[delete.as_str()]);
        assert_eq!(context.book().transactions().len(), 2, "unconfirmed delete is skipped");

        let confirmed = format!("delete {income_id} --yes");
        run(&mut context, &[confirmed.as_str()]);
        assert_eq!(context.book().balance(), 70.0);
    }

    #[test]
    fn edit_changes_fields_but_not_type() {
        let mut context = script_context();
        run(
            &mut context,
            &["add expense 12 2024-02-01 Snacks --category Food --paid"],
        );
        let id = context.book().transactions()[0].id.to_string();
        let edit = format!("edit {id} --amount 15 --description Groceries --category -");
        run(&mut context, &[edit.as_str()]);

        let record = &context.book().transactions()[0];
        assert_eq!(record.amount, 15.0);
        assert_eq!(record.description, "Groceries");
        assert_eq!(record.category(), None);
        assert_eq!(record.status(), Some(ExpenseStatus::Paid));
    }

    #[test]
    fn invalid_input_leaves_state_untouched() {
        let mut context = script_context();
        run(
            &mut context,
            &[
                "add expense -5 2024-01-01 Broken",
                "add expense ten 2024-01-01 Broken",
                "add income 5 01/02/2024 Broken",
                "add income 5 2024-01-01 Broken --paid",
                "add gift 5 2024-01-01 Broken",
                "page settings",
                "frobnicate",
            ],
        );
        assert!(context.book().transactions().is_empty());
    }

    #[test]
    fn config_set_updates_formatting_and_saves() {
        let dir = tempfile::tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).unwrap();
        let mut context = script_context().with_config_manager(manager.clone());
        run(
            &mut context,
            &[
                "config set locale pt-br",
                "config set currency R$",
                "config set color off",
                "config set locale klingon",
                "config set theme dark",
            ],
        );

        assert_eq!(context.config().locale, "pt-BR");
        assert_eq!(context.format_amount(1234.5), "R$1.234,50");
        let saved = manager.load().unwrap();
        assert_eq!(saved.locale, "pt-BR");
        assert_eq!(saved.currency_symbol, "R$");
        assert!(!saved.ui_color_enabled);
    }

    #[test]
    fn page_commands_switch_current_page() {
        let mut context = script_context();
        run(&mut context, &["saidas"]);
        assert_eq!(context.page(), Page::Outflows);
        run(&mut context, &["page reports"]);
        assert_eq!(context.page(), Page::Reports);
    }

    #[test]
    fn exit_stops_the_loop() {
        let mut context = script_context();
        assert_eq!(
            run(&mut context, &["help", "help add", "version", "exit", "balance"]),
            LoopControl::Exit
        );
        assert!(!context.running);
    }
}
