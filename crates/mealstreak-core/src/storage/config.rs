//! TOML-based application configuration.
//!
//! Stores the redemption pricing and the presentation toggles:
//! - Redemption costs (donation, consultation)
//! - Reward notification preferences
//! - Default user id for the local surface
//!
//! Configuration is stored at `~/.config/mealstreak/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::data_dir;
use crate::error::ConfigError;

/// Redemption pricing, in whole tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewardsConfig {
    #[serde(default = "default_donate_cost")]
    pub donate_cost: u64,
    #[serde(default = "default_consult_cost")]
    pub consult_cost: u64,
}

/// Reward notification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    /// Whether surfaces should show the "+0.1 token" feedback.
    #[serde(default = "default_true")]
    pub enabled: bool,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/mealstreak/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub rewards: RewardsConfig,
    #[serde(default)]
    pub notifications: NotificationsConfig,
    /// User the local surface operates as.
    #[serde(default = "default_user")]
    pub user: String,
}

fn default_donate_cost() -> u64 {
    10
}
fn default_consult_cost() -> u64 {
    30
}
fn default_true() -> bool {
    true
}
fn default_user() -> String {
    "local".into()
}

impl Default for RewardsConfig {
    fn default() -> Self {
        Self {
            donate_cost: default_donate_cost(),
            consult_cost: default_consult_cost(),
        }
    }
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rewards: RewardsConfig::default(),
            notifications: NotificationsConfig::default(),
            user: default_user(),
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

    /// Load from disk or write and return the default.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be
    /// parsed, or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path()?;
        match std::fs::read_to_string(&path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                path,
                message: e.to_string(),
            }),
            Err(_) => {
                let cfg = Self::default();
                cfg.save()?;
                Ok(cfg)
            }
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::path()?;
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(&path, content).map_err(|e| ConfigError::SaveFailed {
            path,
            message: e.to_string(),
        })
    }

    /// Load from disk, returning the default on any error.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let mut current = &json;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        match current {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by dot-separated key and save. Unknown keys
    /// and type mismatches are rejected.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be
    /// parsed as the existing value's type, or the config cannot be
    /// saved.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json =
            serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            })?;

        let (parents, leaf) = match key.rsplit_once('.') {
            Some((parents, leaf)) => (parents, leaf),
            None => ("", key),
        };
        let mut current = &mut json;
        if !parents.is_empty() {
            for part in parents.split('.') {
                current = current
                    .get_mut(part)
                    .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
            }
        }
        let obj = current
            .as_object_mut()
            .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
        let existing = obj
            .get(leaf)
            .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;

        let parse_error = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };
        let new_value = match existing {
            serde_json::Value::Bool(_) => serde_json::Value::Bool(
                value.parse::<bool>().map_err(|e| parse_error(e.to_string()))?,
            ),
            serde_json::Value::Number(_) => serde_json::Value::Number(
                value
                    .parse::<u64>()
                    .map_err(|e| parse_error(e.to_string()))?
                    .into(),
            ),
            _ => serde_json::Value::String(value.to_string()),
        };
        obj.insert(leaf.to_string(), new_value);

        *self = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        self.save()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.rewards.donate_cost, 10);
        assert_eq!(parsed.rewards.consult_cost, 30);
        assert!(parsed.notifications.enabled);
        assert_eq!(parsed.user, "local");
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("rewards.donate_cost").as_deref(), Some("10"));
        assert_eq!(cfg.get("notifications.enabled").as_deref(), Some("true"));
        assert_eq!(cfg.get("user").as_deref(), Some("local"));
        assert!(cfg.get("rewards.missing_key").is_none());
    }

    #[test]
    fn empty_sections_fall_back_to_defaults() {
        let parsed: Config = toml::from_str("").unwrap();
        assert_eq!(parsed.rewards.consult_cost, 30);
        assert!(parsed.notifications.enabled);
    }
}
