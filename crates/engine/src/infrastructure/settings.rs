//! Engine settings read from the environment.
//!
//! | Variable | Default | |
//! |---|---|---|
//! | `HERO_EDITION` | `6e` | `5e` / `6e` (also `hero5e`, `fifth`, ...) |
//! | `HERO_USE_HIT_LOCATIONS` | `false` | roll locations for damage |
//! | `HERO_KNOCKBACK` | `true` | roll knockback at all |
//! | `HERO_SCENARIO` | unset | scenario file for the runner |

use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use herocombat_domain::Edition;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("{key} has an invalid value: {value}")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineSettings {
    pub edition: Edition,
    pub use_hit_locations: bool,
    pub knockback: bool,
    pub scenario_path: Option<PathBuf>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            edition: Edition::Sixth,
            use_hit_locations: false,
            knockback: true,
            scenario_path: None,
        }
    }
}

impl EngineSettings {
    /// Read settings from the process environment.
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through `lookup`; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();

        let edition = match read("HERO_EDITION") {
            Some(value) => Edition::from_str(&value).map_err(|_| SettingsError::InvalidValue {
                key: "HERO_EDITION",
                value,
            })?,
            None => defaults.edition,
        };

        Ok(Self {
            edition,
            use_hit_locations: parse_flag(
                "HERO_USE_HIT_LOCATIONS",
                read("HERO_USE_HIT_LOCATIONS"),
                defaults.use_hit_locations,
            )?,
            knockback: parse_flag("HERO_KNOCKBACK", read("HERO_KNOCKBACK"), defaults.knockback)?,
            scenario_path: read("HERO_SCENARIO").map(PathBuf::from),
        })
    }
}

fn parse_flag(
    key: &'static str,
    value: Option<String>,
    default: bool,
) -> Result<bool, SettingsError> {
    let Some(value) = value else {
        return Ok(default);
    };
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(SettingsError::InvalidValue { key, value }),
    }
}

/// Load `.env.local` then `.env` from `root`, without overriding variables
/// already set.
pub fn load_dotenv_from(root: &Path) {
    // Prefer local overrides.
    for filename in [".env.local", ".env"] {
        let path = root.join(filename);
        if path.exists() {
            let _ = dotenvy::from_path(path);
        }
    }
}
