use colored::Colorize;
use std::fmt;
use std::sync::{OnceLock, RwLock};

/// Message categories used by the CLI output helpers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Success,
    Warning,
    Error,
    Section,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct OutputPreferences {
    pub plain: bool,
}

static PREFERENCES: OnceLock<RwLock<OutputPreferences>> = OnceLock::new();

pub fn set_preferences(prefs: OutputPreferences) {
    let lock = PREFERENCES.get_or_init(|| RwLock::new(OutputPreferences::default()));
    if let Ok(mut guard) = lock.write() {
        *guard = prefs;
    }
    colored::control::set_override(!prefs.plain);
}

fn preferences() -> OutputPreferences {
    PREFERENCES
        .get_or_init(|| RwLock::new(OutputPreferences::default()))
        .read()
        .map(|guard| *guard)
        .unwrap_or_default()
}

fn label(kind: MessageKind) -> &'static str {
    match kind {
        MessageKind::Info => "[i]",
        MessageKind::Success => "[ok]",
        MessageKind::Warning => "[!]",
        MessageKind::Error => "[x]",
        MessageKind::Section => "",
    }
}

pub fn format_message(kind: MessageKind, message: impl fmt::Display, plain: bool) -> String {
    let text = match kind {
        MessageKind::Section => format!("=== {} ===", message.to_string().trim()),
        _ => format!("{} {}", label(kind), message),
    };
    if plain {
        return text;
    }
    match kind {
        MessageKind::Success => text.bright_green().to_string(),
        MessageKind::Warning => text.bright_yellow().to_string(),
        MessageKind::Error => text.bright_red().to_string(),
        MessageKind::Section => text.bold().to_string(),
        MessageKind::Info => text,
    }
}

pub fn print(kind: MessageKind, message: impl fmt::Display) {
    let formatted = format_message(kind, message, preferences().plain);
    match kind {
        MessageKind::Section => println!("\n{formatted}"),
        _ => println!("{formatted}"),
    }
}

pub fn info(message: impl fmt::Display) {
    print(MessageKind::Info, message);
}

pub fn success(message: impl fmt::Display) {
    print(MessageKind::Success, message);
}

pub fn warning(message: impl fmt::Display) {
    print(MessageKind::Warning, message);
}

pub fn error(message: impl fmt::Display) {
    print(MessageKind::Error, message);
}

pub fn section(title: impl fmt::Display) {
    print(MessageKind::Section, title);
}

/// Prints pre-rendered multi-line content verbatim.
pub fn block(content: &str) {
    println!("{content}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_messages_carry_labels_only() {
        assert_eq!(format_message(MessageKind::Error, "boom", true), "[x] boom");
        assert_eq!(
            format_message(MessageKind::Section, " Reports ", true),
            "=== Reports ==="
        );
    }
}
