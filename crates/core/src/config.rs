use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Folder created under the data directory when none is configured.
pub const DEFAULT_APP_FOLDER_NAME: &str = "Cadence";

const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

/// Persisted application settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Parent of the storage root. `None` uses the platform data directory.
    pub data_dir: Option<PathBuf>,
    /// Name of the storage root folder inside `data_dir`.
    pub app_folder_name: String,
    /// Packaged demo content to seed an empty library from.
    pub demo_source_dir: Option<PathBuf>,
    pub seed_demo_on_start: bool,
    /// Default log filter; `RUST_LOG` takes precedence.
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: None,
            app_folder_name: DEFAULT_APP_FOLDER_NAME.to_string(),
            demo_source_dir: None,
            seed_demo_on_start: true,
            log_level: "info".to_string(),
        }
    }
}

/// Configuration manager for Cadence settings.
///
/// Settings are stored as a versioned JSON document. A missing file is
/// created with defaults on first load.
pub struct ConfigManager {
    config_path: PathBuf,
    settings: Settings,
}

/// Available configuration options with validation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSchema {
    pub app_folder_name: ConfigOption<String>,
    pub seed_demo_on_start: ConfigOption<bool>,
    pub log_level: ConfigOption<String>,
}

/// Configuration option with validation and available choices
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigOption<T> {
    pub default: T,
    pub valid_choices: Option<Vec<T>>,
    pub description: String,
    pub requires_restart: bool,
}

impl ConfigSchema {
    /// Human-readable summary, one line per option.
    pub fn describe(&self) -> Vec<String> {
        vec![
            self.app_folder_name.describe("app_folder_name"),
            self.seed_demo_on_start.describe("seed_demo_on_start"),
            self.log_level.describe("log_level"),
        ]
    }
}

impl<T: fmt::Debug> ConfigOption<T> {
    pub fn describe(&self, name: &str) -> String {
        let mut line = format!("{} (default {:?}", name, self.default);
        if let Some(choices) = &self.valid_choices {
            line.push_str(&format!(", one of {:?}", choices));
        }
        if self.requires_restart {
            line.push_str(", restart required");
        }
        format!("{}): {}", line, self.description)
    }
}

/// Persisted configuration file format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    pub settings: Settings,
    pub created_at: String,
    pub modified_at: String,
}

impl ConfigManager {
    /// Create a new configuration manager.
    /// If no path is provided, defaults to `<config dir>/cadence/config.json`.
    pub fn new(config_path: Option<PathBuf>) -> Self {
        let config_path = config_path.unwrap_or_else(Self::default_path);

        Self {
            config_path,
            settings: Settings::default(),
        }
    }

    /// Platform config location, or `config.json` in the working directory
    /// when the platform has none.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .map(|dir| dir.join("cadence").join("config.json"))
            .unwrap_or_else(|| PathBuf::from("config.json"))
    }

    /// Load settings from the configuration file, writing defaults if it
    /// does not exist yet.
    pub fn load(&mut self) -> Result<Settings, ConfigError> {
        if !self.config_path.exists() {
            log::info!("No config at {:?}, writing defaults", self.config_path);
            self.save()?;
            return Ok(self.settings.clone());
        }

        let content = fs::read_to_string(&self.config_path)
            .map_err(|e| ConfigError::ReadError(e.to_string()))?;

        let config_file: ConfigFile =
            serde_json::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        if config_file.version != env!("CARGO_PKG_VERSION") {
            log::warn!(
                "Config file version {} doesn't match application version {}. Using defaults for new settings.",
                config_file.version,
                env!("CARGO_PKG_VERSION")
            );
        }

        Self::validate_settings(&config_file.settings).map_err(ConfigError::ValidationError)?;

        self.settings = config_file.settings;
        Ok(self.settings.clone())
    }

    /// Save current settings to the configuration file.
    pub fn save(&self) -> Result<(), ConfigError> {
        if let Some(parent) = self.config_path.parent() {
            if parent != Path::new("") && parent != Path::new(".") {
                fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError(e.to_string()))?;
            }
        }

        let now = chrono::Utc::now().to_rfc3339();
        let created_at = self.existing_created_at().unwrap_or_else(|| now.clone());

        let config_file = ConfigFile {
            version: env!("CARGO_PKG_VERSION").to_string(),
            settings: self.settings.clone(),
            created_at,
            modified_at: now,
        };

        let content = serde_json::to_string_pretty(&config_file)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        fs::write(&self.config_path, content)
            .map_err(|e| ConfigError::WriteError(e.to_string()))?;

        Ok(())
    }

    /// Validate, replace and persist settings.
    pub fn update_settings(&mut self, settings: Settings) -> Result<(), ConfigError> {
        Self::validate_settings(&settings).map_err(ConfigError::ValidationError)?;
        self.settings = settings;
        self.save()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Get configuration schema with available options
    pub fn schema() -> ConfigSchema {
        ConfigSchema {
            app_folder_name: ConfigOption {
                default: DEFAULT_APP_FOLDER_NAME.to_string(),
                valid_choices: None,
                description: "Folder name of the track storage root".to_string(),
                requires_restart: true,
            },
            seed_demo_on_start: ConfigOption {
                default: true,
                valid_choices: None,
                description: "Copy bundled demo tracks into an empty library at startup"
                    .to_string(),
                requires_restart: false,
            },
            log_level: ConfigOption {
                default: "info".to_string(),
                valid_choices: Some(LOG_LEVELS.iter().map(|l| l.to_string()).collect()),
                description: "Default log level".to_string(),
                requires_restart: true,
            },
        }
    }

    /// Validate settings against schema
    pub fn validate_settings(settings: &Settings) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();
        let schema = Self::schema();

        let folder = settings.app_folder_name.trim();
        if folder.is_empty() {
            errors.push("app_folder_name must not be empty".to_string());
        } else if folder.contains(['/', '\\']) || folder == "." || folder == ".." {
            errors.push("app_folder_name must be a single folder name".to_string());
        }

        if let Some(choices) = &schema.log_level.valid_choices {
            if !choices.contains(&settings.log_level.to_lowercase()) {
                errors.push(format!("log_level must be one of: {:?}", choices));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Reset settings to defaults
    pub fn reset_to_defaults(&mut self) -> Result<(), ConfigError> {
        self.settings = Settings::default();
        self.save()
    }

    fn existing_created_at(&self) -> Option<String> {
        let content = fs::read_to_string(&self.config_path).ok()?;
        let existing: ConfigFile = serde_json::from_str(&content).ok()?;
        Some(existing.created_at)
    }
}

/// Configuration error types
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(String),

    #[error("Failed to write config file: {0}")]
    WriteError(String),

    #[error("Failed to parse config file: {0}")]
    ParseError(String),

    #[error("Failed to serialize config: {0}")]
    SerializeError(String),

    #[error("Config validation errors: {}", .0.join(", "))]
    ValidationError(Vec<String>),
}
