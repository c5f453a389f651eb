use std::path::PathBuf;

use edumentor_core::config::ClientConfig;
use edumentor_core::types::SESSION_STORAGE_KEY;

const APP_DIR: &str = "edumentor";
const CONFIG_FILENAME: &str = "config.json";

fn platform_dir(base: Option<PathBuf>) -> PathBuf {
    base.or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

pub fn default_config_path() -> PathBuf {
    platform_dir(dirs::config_dir()).join(CONFIG_FILENAME)
}

pub fn default_data_dir() -> PathBuf {
    platform_dir(dirs::data_dir())
}

/// Configured data dir, or the platform default.
pub fn data_dir(cfg: &ClientConfig) -> PathBuf {
    cfg.data_dir.clone().unwrap_or_else(default_data_dir)
}

/// `<data_dir>/eduMentorSession.json`.
pub fn session_file(cfg: &ClientConfig) -> PathBuf {
    data_dir(cfg).join(format!("{SESSION_STORAGE_KEY}.json"))
}
