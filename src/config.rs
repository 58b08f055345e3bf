use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    pub log_level: String,
    /// Directory for the daily rolling log file; console only when unset.
    pub log_dir: Option<PathBuf>,
    /// JSON file with engine parameters; defaults plus env overrides when unset.
    pub recco_config_path: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Self {
        let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        Self {
            log_level,
            log_dir: path_var("RECCO_LOG_DIR"),
            recco_config_path: path_var("RECCO_CONFIG"),
        }
    }
}

fn path_var(key: &str) -> Option<PathBuf> {
    std::env::var(key)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(PathBuf::from)
}
