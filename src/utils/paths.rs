use dirs::home_dir;
use std::{
    env,
    path::{Path, PathBuf},
};

const DEFAULT_DIR_NAME: &str = ".cashbook";
const DATA_DIR: &str = "data";
const CONFIG_FILE: &str = "config.json";

/// Environment variable overriding the application directory.
pub const HOME_ENV: &str = "CASHBOOK_HOME";

/// Returns the application-specific directory, defaulting to `~/.cashbook`.
pub fn app_data_dir() -> PathBuf {
    if let Some(custom) = env::var_os(HOME_ENV) {
        return PathBuf::from(custom);
    }
    home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_DIR_NAME)
}

/// Directory holding one JSON file per stored key.
pub fn data_dir_in(base: &Path) -> PathBuf {
    base.join(DATA_DIR)
}

pub fn config_file_in(base: &Path) -> PathBuf {
    base.join(CONFIG_FILE)
}
