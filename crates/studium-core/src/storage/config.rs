//! TOML-based application configuration.
//!
//! Stores user preferences:
//! - Default study/break durations for interval sessions
//! - Autosave cadence
//! - The clock style token (opaque to the core; hosts render it)
//! - Saved interval presets
//!
//! Configuration lives at `~/.config/studium/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::data_dir;
use crate::autosave::DEFAULT_HEARTBEAT_SECS;
use crate::error::ConfigError;
use crate::model::IntervalPreset;
use crate::timer::IntervalConfig;

/// Default interval-session durations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerDefaults {
    #[serde(default = "default_study_minutes")]
    pub study_minutes: u64,
    #[serde(default = "default_break_minutes")]
    pub break_minutes: u64,
}

/// Autosave behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutosaveConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_autosave_secs")]
    pub interval_secs: u64,
}

/// UI preferences the core stores but never interprets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_clock_style")]
    pub clock_style: String,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/studium/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub timer: TimerDefaults,
    #[serde(default)]
    pub autosave: AutosaveConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub presets: Vec<IntervalPreset>,
}

fn default_study_minutes() -> u64 {
    25
}
fn default_break_minutes() -> u64 {
    5
}
fn default_autosave_secs() -> u64 {
    DEFAULT_HEARTBEAT_SECS
}
fn default_clock_style() -> String {
    "minimalist".into()
}
fn default_true() -> bool {
    true
}

impl Default for TimerDefaults {
    fn default() -> Self {
        Self {
            study_minutes: default_study_minutes(),
            break_minutes: default_break_minutes(),
        }
    }
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: default_autosave_secs(),
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            clock_style: default_clock_style(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timer: TimerDefaults::default(),
            autosave: AutosaveConfig::default(),
            ui: UiConfig::default(),
            presets: Vec::new(),
        }
    }
}

impl Config {
    fn path() -> Result<PathBuf, ConfigError> {
        let dir = data_dir().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from("~/.config"),
            message: e.to_string(),
        })?;
        Ok(dir.join("config.toml"))
    }

    /// Load from disk, writing the defaults on first run.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be parsed, or if the
    /// defaults cannot be written.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path()?;
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                toml::from_str(&content).map_err(|e| ConfigError::ParseFailed(e.to_string()))
            }
            Err(_) => {
                let cfg = Self::default();
                cfg.save()?;
                Ok(cfg)
            }
        }
    }

    /// Load from disk, returning defaults on any error.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }

    /// Persist to disk.
    ///
    /// # Errors
    /// Returns an error if the config cannot be serialized or written.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::path()?;
        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        std::fs::write(&path, content).map_err(|e| ConfigError::SaveFailed {
            path,
            message: e.to_string(),
        })
    }

    /// The interval durations a new session starts with when none are
    /// given explicitly.
    pub fn interval_defaults(&self) -> IntervalConfig {
        IntervalConfig {
            study_minutes: self.timer.study_minutes.max(1),
            break_minutes: self.timer.break_minutes.max(1),
        }
    }

    pub fn add_preset(&mut self, preset: IntervalPreset) -> Result<(), ConfigError> {
        self.presets.push(preset);
        self.save()
    }

    /// Remove a preset by id. Returns false when no preset matched.
    pub fn remove_preset(&mut self, id: &str) -> Result<bool, ConfigError> {
        let before = self.presets.len();
        self.presets.retain(|p| p.id != id);
        let removed = self.presets.len() != before;
        if removed {
            self.save()?;
        }
        Ok(removed)
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by dot-separated key and persist.
    ///
    /// # Errors
    /// Returns an error if the key is unknown, the value cannot be parsed
    /// as the existing type, or the config cannot be saved.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json =
            serde_json::to_value(&*self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        self.save()
    }
}

fn get_json_value_by_path<'a>(
    root: &'a serde_json::Value,
    key: &str,
) -> Option<&'a serde_json::Value> {
    if key.is_empty() {
        return None;
    }
    let mut current = root;
    for part in key.split('.') {
        current = current.get(part)?;
    }
    Some(current)
}

fn set_json_value_by_path(
    root: &mut serde_json::Value,
    key: &str,
    value: &str,
) -> Result<(), ConfigError> {
    let unknown = || ConfigError::InvalidValue {
        key: key.to_string(),
        message: "unknown config key".into(),
    };
    let bad_value = |message: String| ConfigError::InvalidValue {
        key: key.to_string(),
        message,
    };

    let mut parts = key.split('.').peekable();
    if parts.peek().is_none() {
        return Err(unknown());
    }

    let mut current = root;
    while let Some(part) = parts.next() {
        let is_leaf = parts.peek().is_none();
        if is_leaf {
            let obj = current.as_object_mut().ok_or_else(unknown)?;
            let existing = obj.get(part).ok_or_else(unknown)?;

            let new_value = match existing {
                serde_json::Value::Bool(_) => serde_json::Value::Bool(
                    value.parse::<bool>().map_err(|e| bad_value(e.to_string()))?,
                ),
                serde_json::Value::Number(_) => {
                    let n = value
                        .parse::<u64>()
                        .map_err(|_| bad_value(format!("cannot parse '{value}' as number")))?;
                    serde_json::Value::Number(n.into())
                }
                serde_json::Value::Array(_) => {
                    return Err(bad_value("use the preset commands to edit lists".into()))
                }
                _ => serde_json::Value::String(value.into()),
            };

            obj.insert(part.to_string(), new_value);
            return Ok(());
        }

        current = current.get_mut(part).ok_or_else(unknown)?;
    }

    Err(unknown())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_round_trips_through_toml() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.timer.study_minutes, 25);
        assert_eq!(parsed.timer.break_minutes, 5);
        assert_eq!(parsed.autosave.interval_secs, 30);
        assert_eq!(parsed.ui.clock_style, "minimalist");
        assert!(parsed.presets.is_empty());
    }

    #[test]
    fn empty_toml_fills_in_defaults() {
        let parsed: Config = toml::from_str("").unwrap();
        assert_eq!(parsed.autosave.interval_secs, 30);
        assert!(parsed.autosave.enabled);
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("timer.study_minutes").as_deref(), Some("25"));
        assert_eq!(cfg.get("autosave.enabled").as_deref(), Some("true"));
        assert_eq!(cfg.get("ui.clock_style").as_deref(), Some("minimalist"));
        assert!(cfg.get("ui.missing_key").is_none());
    }

    #[test]
    fn set_json_value_updates_matching_types() {
        let mut json = serde_json::to_value(Config::default()).unwrap();
        set_json_value_by_path(&mut json, "autosave.enabled", "false").unwrap();
        set_json_value_by_path(&mut json, "timer.study_minutes", "50").unwrap();
        set_json_value_by_path(&mut json, "ui.clock_style", "circular").unwrap();

        let parsed: Config = serde_json::from_value(json).unwrap();
        assert!(!parsed.autosave.enabled);
        assert_eq!(parsed.timer.study_minutes, 50);
        assert_eq!(parsed.ui.clock_style, "circular");
    }

    #[test]
    fn set_json_value_rejects_unknown_keys_and_bad_values() {
        let mut json = serde_json::to_value(Config::default()).unwrap();
        assert!(set_json_value_by_path(&mut json, "timer.nonexistent", "1").is_err());
        assert!(set_json_value_by_path(&mut json, "autosave.enabled", "maybe").is_err());
        assert!(set_json_value_by_path(&mut json, "timer.study_minutes", "soon").is_err());
    }

    #[test]
    fn interval_defaults_never_hand_out_zero_durations() {
        let mut cfg = Config::default();
        cfg.timer.study_minutes = 0;
        let interval = cfg.interval_defaults();
        assert_eq!(interval.study_minutes, 1);
        assert_eq!(interval.break_minutes, 5);
    }
}
