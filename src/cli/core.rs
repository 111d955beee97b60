use std::{io, sync::Arc};

use dialoguer::theme::ColorfulTheme;
use rustyline::error::ReadlineError;
use strsim::levenshtein;

use crate::cli::{io as cli_io, output, registry::registry, render, shell};
use crate::config::{self, Config, ConfigManager};
use crate::core::{CashbookManager, Page, PageView};
use crate::errors::CashbookError;
use crate::storage::{JsonFileStore, KeyValueStore, StorageError};

/// Environment variable switching the shell to line-by-line stdin mode.
pub const SCRIPT_ENV: &str = "CASHBOOK_CLI_SCRIPT";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Exit,
}

pub type CommandResult = Result<(), CommandError>;

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("{0}")]
    InvalidArguments(String),
    #[error(transparent)]
    Core(#[from] CashbookError),
    #[error(transparent)]
    Dialoguer(#[from] dialoguer::Error),
    #[error("exit requested")]
    ExitRequested,
}

/// Failures that end the shell.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] CashbookError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("line editor failure: {0}")]
    Readline(#[from] ReadlineError),
}

impl From<StorageError> for CliError {
    fn from(err: StorageError) -> Self {
        CliError::Core(CashbookError::from(err))
    }
}

/// Everything a command handler can reach: the cashbook, preferences, and
/// the page currently shown.
pub struct ShellContext {
    pub(crate) mode: CliMode,
    pub(crate) running: bool,
    pub(crate) last_command: Option<String>,
    book: CashbookManager,
    config: Config,
    config_manager: Option<ConfigManager>,
    page: Page,
    theme: ColorfulTheme,
}

impl ShellContext {
    /// Opens the cashbook stored under the configured data directory.
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        let manager = ConfigManager::new()?;
        let config = manager.load()?;
        let data_dir = config.resolve_data_dir(manager.base_dir());
        tracing::debug!(data_dir = %data_dir.display(), "opening data directory");
        let store = JsonFileStore::new(data_dir)?;
        Ok(Self::with_store(mode, config, Arc::new(store)).with_config_manager(manager))
    }

    /// A context without a config file; preference changes last for the
    /// session only until [`ShellContext::with_config_manager`] is applied.
    pub fn with_store(mode: CliMode, config: Config, store: Arc<dyn KeyValueStore>) -> Self {
        let context = Self {
            mode,
            running: true,
            last_command: None,
            book: CashbookManager::open(store),
            config,
            config_manager: None,
            page: Page::default(),
            theme: ColorfulTheme::default(),
        };
        context.apply_output_preferences();
        context
    }

    /// Persists preference changes through `manager`.
    pub fn with_config_manager(mut self, manager: ConfigManager) -> Self {
        self.config_manager = Some(manager);
        self
    }

    fn apply_output_preferences(&self) {
        output::set_preferences(output::OutputPreferences {
            plain: !self.config.ui_color_enabled || self.mode == CliMode::Script,
        });
    }

    pub fn book(&self) -> &CashbookManager {
        &self.book
    }

    pub fn book_mut(&mut self) -> &mut CashbookManager {
        &mut self.book
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn page(&self) -> Page {
        self.page
    }

    pub fn command_names(&self) -> Vec<&'static str> {
        registry().names().collect()
    }

    pub fn prompt(&self) -> String {
        format!("cashbook [{}]> ", self.page)
    }

    pub fn format_amount(&self, value: f64) -> String {
        render::AmountFormat::from_config(&self.config).format(value)
    }

    /// Updates one preference and saves the config file when one is attached.
    pub fn set_config_value(&mut self, key: &str, value: &str) -> Result<(), CommandError> {
        let mut next = self.config.clone();
        match key.to_ascii_lowercase().as_str() {
            "locale" => {
                let Some(tag) = config::SUPPORTED_LOCALES
                    .iter()
                    .find(|tag| tag.eq_ignore_ascii_case(value))
                else {
                    return Err(CommandError::InvalidArguments(format!(
                        "unsupported locale `{value}` (use one of: {})",
                        config::SUPPORTED_LOCALES.join(", ")
                    )));
                };
                next.locale = (*tag).to_string();
            }
            "currency" => {
                if value.is_empty() {
                    return Err(CommandError::InvalidArguments(
                        "currency symbol must not be empty".into(),
                    ));
                }
                next.currency_symbol = value.to_string();
            }
            "color" => {
                next.ui_color_enabled = match value.to_ascii_lowercase().as_str() {
                    "on" | "true" | "yes" => true,
                    "off" | "false" | "no" => false,
                    _ => {
                        return Err(CommandError::InvalidArguments(format!(
                            "invalid color setting `{value}` (use on or off)"
                        )))
                    }
                };
            }
            other => {
                return Err(CommandError::InvalidArguments(format!(
                    "unknown config key `{other}` (use locale, currency, or color)"
                )))
            }
        }
        if let Some(manager) = &self.config_manager {
            manager.save(&next)?;
        }
        tracing::info!(key, value, "preference updated");
        self.config = next;
        self.apply_output_preferences();
        Ok(())
    }

    /// Switches to `page` and prints it.
    pub fn show_page(&mut self, page: Page) {
        self.page = page;
        let view = PageView::build(page, self.book.transactions(), self.book.initial_balance());
        let amounts = render::AmountFormat::from_config(&self.config);
        let (title, body) = render::render_page(&view, &amounts);
        output::section(title);
        output::block(&body);
    }

    /// Asks before a destructive action. Script mode never prompts; it
    /// proceeds only when the caller passed an explicit override.
    pub fn confirm(&self, prompt: &str, pre_confirmed: bool) -> Result<bool, CommandError> {
        if pre_confirmed {
            return Ok(true);
        }
        match self.mode {
            CliMode::Script => Ok(false),
            CliMode::Interactive => cli_io::confirm_action(&self.theme, prompt, false),
        }
    }

    pub(crate) fn dispatch(
        &mut self,
        command: &str,
        raw: &str,
        args: &[&str],
    ) -> Result<LoopControl, CommandError> {
        match registry().handler(command) {
            Some(handler) => match handler(self, args) {
                Ok(()) => Ok(LoopControl::Continue),
                Err(CommandError::ExitRequested) => Ok(LoopControl::Exit),
                Err(err) => Err(err),
            },
            None => {
                self.suggest_command(raw);
                Ok(LoopControl::Continue)
            }
        }
    }

    /// Closest registered name within a small edit distance, if any.
    pub fn suggestion_for(&self, input: &str) -> Option<&'static str> {
        let needle = input.to_ascii_lowercase();
        registry()
            .names()
            .map(|name| (levenshtein(name, &needle), name))
            .min_by_key(|(distance, _)| *distance)
            .filter(|(distance, _)| *distance <= 3)
            .map(|(_, name)| name)
    }

    pub(crate) fn suggest_command(&self, input: &str) {
        output::warning(format!(
            "Unknown command `{input}`. Type `help` to see available commands."
        ));
        if let Some(best) = self.suggestion_for(input) {
            output::info(format!("Suggestion: `{best}`?"));
        }
    }

    pub(crate) fn confirm_exit(&self) -> Result<bool, CliError> {
        if self.mode == CliMode::Script {
            return Ok(true);
        }
        cli_io::confirm_action(&self.theme, "Exit shell?", true).or(Ok(true))
    }

    /// Prints a recoverable command failure. Only storage failures, which
    /// mean state could not be saved, are escalated.
    pub(crate) fn report_error(&self, err: CommandError) -> Result<(), CliError> {
        match err {
            CommandError::ExitRequested => Ok(()),
            CommandError::InvalidArguments(message) => {
                output::error(message);
                output::info("Use `help <command>` for usage details.");
                Ok(())
            }
            CommandError::Core(CashbookError::Validation(message)) => {
                output::error(message);
                Ok(())
            }
            CommandError::Core(err) => {
                tracing::error!(error = %err, command = ?self.last_command, "command failed");
                Err(CliError::Core(err))
            }
            CommandError::Dialoguer(err) => {
                output::error(format!("prompt failed: {err}"));
                Ok(())
            }
        }
    }

    /// Runs one input line through parsing, dispatch, and error reporting.
    pub fn process_line(&mut self, line: &str) -> Result<LoopControl, CliError> {
        match shell::handle_line(self, line) {
            Ok(control) => Ok(control),
            Err(err) => {
                self.report_error(err)?;
                Ok(LoopControl::Continue)
            }
        }
    }
}

#[cfg(test)]
pub(crate) fn script_context() -> ShellContext {
    ShellContext::with_store(
        CliMode::Script,
        Config::default(),
        Arc::new(crate::storage::MemoryStore::new()),
    )
}
