use serde::{Deserialize, Serialize};
use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use crate::errors::{CashbookError, Result};
use crate::utils::paths;

const TMP_SUFFIX: &str = "tmp";

/// User preferences for the shell.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub locale: String,
    pub currency_symbol: String,
    #[serde(default = "Config::default_ui_color_enabled")]
    pub ui_color_enabled: bool,
    /// Where the slot files live. Defaults to `<base>/data`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            locale: "en-US".into(),
            currency_symbol: "$".into(),
            ui_color_enabled: Self::default_ui_color_enabled(),
            data_dir: None,
        }
    }
}

/// Digit separators used when printing amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberStyle {
    pub grouping: char,
    pub decimal: char,
}

impl Default for NumberStyle {
    fn default() -> Self {
        Self {
            grouping: ',',
            decimal: '.',
        }
    }
}

/// Locales accepted by `config set locale`.
pub const SUPPORTED_LOCALES: &[&str] = &["en-US", "en-GB", "pt-BR", "pt-PT", "es-ES", "fr-FR"];

/// Separators for a known locale tag (case-insensitive).
pub fn number_style(tag: &str) -> Option<NumberStyle> {
    let style = match tag.to_ascii_lowercase().as_str() {
        "en-us" | "en-gb" => NumberStyle::default(),
        "pt-br" | "pt-pt" | "es-es" => NumberStyle {
            grouping: '.',
            decimal: ',',
        },
        "fr-fr" => NumberStyle {
            grouping: ' ',
            decimal: ',',
        },
        _ => return None,
    };
    Some(style)
}

impl Config {
    pub fn default_ui_color_enabled() -> bool {
        true
    }

    /// Unknown locales fall back to `en-US` separators.
    pub fn number_style(&self) -> NumberStyle {
        number_style(&self.locale).unwrap_or_default()
    }

    pub fn resolve_data_dir(&self, base: &Path) -> PathBuf {
        self.data_dir
            .clone()
            .unwrap_or_else(|| paths::data_dir_in(base))
    }
}

/// Loads and saves [`Config`] as JSON under the application base directory.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    base: PathBuf,
    path: PathBuf,
}

impl ConfigManager {
    /// Uses the default base directory (see [`paths::app_data_dir`]).
    pub fn new() -> Result<Self> {
        Self::with_base_dir(paths::app_data_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self> {
        fs::create_dir_all(&base)?;
        Ok(Self {
            path: paths::config_file_in(&base),
            base,
        })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base
    }

    pub fn config_path(&self) -> &Path {
        &self.path
    }

    /// Missing files yield defaults; malformed files are an error so that a
    /// typo does not silently reset preferences.
    pub fn load(&self) -> Result<Config> {
        if !self.path.exists() {
            return Ok(Config::default());
        }
        let data = fs::read_to_string(&self.path)?;
        serde_json::from_str(&data).map_err(|err| {
            CashbookError::Config(format!("{}: {err}", self.path.display()))
        })
    }

    pub fn save(&self, config: &Config) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(config)?;
        let tmp = self.path.with_extension(format!("json.{TMP_SUFFIX}"));
        let mut file = File::create(&tmp)?;
        file.write_all(json.as_bytes())?;
        file.flush()?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}
