//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/teamtree/teamtree.toml`
//! 3. Local config: `<dir>/.teamtree.toml`
//! 4. Environment variables: `TEAMTREE_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::services::DEFAULT_MAX_IMPORT_BYTES;
use crate::application::ApplicationError;
use crate::domain::expand_env_vars;

/// Unified configuration for teamtree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Team file imported at startup and exported after mutations
    pub team_file: PathBuf,
    /// Default target for `team rebalance`
    pub balance_index: i64,
    /// Upper bound for an import payload in bytes
    pub max_import_bytes: u64,
    /// Pretty-print exported JSON
    pub pretty: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            team_file: PathBuf::from("team.json"),
            balance_index: 2,
            max_import_bytes: DEFAULT_MAX_IMPORT_BYTES,
            pretty: true,
        }
    }
}

/// Raw settings for intermediate parsing (`None` → not specified, inherit).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub team_file: Option<PathBuf>,
    pub balance_index: Option<i64>,
    pub max_import_bytes: Option<u64>,
    pub pretty: Option<bool>,
}

/// Get the XDG config directory for teamtree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "teamtree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("teamtree.toml"))
}

/// Get the path to the local config file in a directory.
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(".teamtree.toml")
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

impl Settings {
    /// Overlay wins where it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            team_file: overlay
                .team_file
                .clone()
                .unwrap_or_else(|| self.team_file.clone()),
            balance_index: overlay.balance_index.unwrap_or(self.balance_index),
            max_import_bytes: overlay.max_import_bytes.unwrap_or(self.max_import_bytes),
            pretty: overlay.pretty.unwrap_or(self.pretty),
        }
    }

    /// Expand `~`, `$VAR` and `${VAR}` in path-like fields.
    fn expand_paths(&mut self) {
        let expanded = expand_env_vars(self.team_file.to_string_lossy().as_ref());
        self.team_file = PathBuf::from(expanded);
    }

    fn validate(self) -> Result<Self, ApplicationError> {
        if self.balance_index < 1 {
            return Err(ApplicationError::Config {
                message: format!("balance_index must be >= 1, got {}", self.balance_index),
            });
        }
        if self.max_import_bytes == 0 {
            return Err(ApplicationError::Config {
                message: "max_import_bytes must be > 0".to_string(),
            });
        }
        Ok(self)
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local_dir` - Optional directory holding a `.teamtree.toml`
    pub fn load(local_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        Self::load_from(global_config_path().as_deref(), local_dir)
    }

    /// Same as [`Settings::load`] with an explicit global config path.
    pub fn load_from(
        global_path: Option<&Path>,
        local_dir: Option<&Path>,
    ) -> Result<Self, ApplicationError> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config
        if let Some(global_path) = global_path {
            if global_path.exists() {
                let raw = load_raw_settings(global_path)?;
                current = current.merge_with(&raw);
            }
        }

        // 3. Local config
        if let Some(dir) = local_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                let raw = load_raw_settings(&local_path)?;
                current = current.merge_with(&raw);
            }
        }

        // 4. Environment variables
        current = Self::apply_env_overrides(current)?;

        current.expand_paths();
        current.validate()
    }

    /// Apply TEAMTREE_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(Environment::with_prefix("TEAMTREE").try_parsing(true))
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("team_file") {
            settings.team_file = PathBuf::from(val);
        }
        if let Ok(val) = config.get_int("balance_index") {
            settings.balance_index = val;
        }
        if let Ok(val) = config.get_int("max_import_bytes") {
            settings.max_import_bytes = u64::try_from(val).map_err(|_| ApplicationError::Config {
                message: format!("max_import_bytes must be positive, got {}", val),
            })?;
        }
        if let Ok(val) = config.get_bool("pretty") {
            settings.pretty = val;
        }

        Ok(settings)
    }

    /// Render settings as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialise settings: {}", e),
        })
    }

    /// Commented starter config.
    pub fn template() -> String {
        let defaults = Self::default();
        format!(
            r#"# teamtree configuration

# Team file imported at startup and written back after changes
team_file = "{}"

# Default target number of direct reports for `team rebalance`
balance_index = {}

# Largest accepted import, in bytes
max_import_bytes = {}

# Pretty-print exported JSON
pretty = {}
"#,
            defaults.team_file.display(),
            defaults.balance_index,
            defaults.max_import_bytes,
            defaults.pretty
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_template_when_parsing_then_equals_defaults() {
        let raw: RawSettings = toml::from_str(&Settings::template()).unwrap();
        let merged = Settings::default().merge_with(&raw);
        assert_eq!(merged, Settings::default());
    }

    #[test]
    fn given_partial_overlay_when_merging_then_unset_fields_inherit() {
        let raw = RawSettings {
            balance_index: Some(4),
            ..Default::default()
        };
        let merged = Settings::default().merge_with(&raw);
        assert_eq!(merged.balance_index, 4);
        assert_eq!(merged.team_file, PathBuf::from("team.json"));
    }

    #[test]
    fn given_zero_balance_index_when_validating_then_config_error() {
        let settings = Settings {
            balance_index: 0,
            ..Default::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(ApplicationError::Config { .. })
        ));
    }
}
