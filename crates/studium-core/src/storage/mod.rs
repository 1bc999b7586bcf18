mod config;
pub mod database;

pub use config::{AutosaveConfig, Config, TimerDefaults, UiConfig};
pub use database::{Database, Stats};

use std::path::PathBuf;

/// Returns `~/.config/studium[-dev]/` based on STUDIUM_ENV.
///
/// Set STUDIUM_ENV=dev to use the development data directory.
///
/// # Errors
/// Returns an error if the config directory cannot be created.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("STUDIUM_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("studium-dev")
    } else {
        base_dir.join("studium")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
