//! Locates the configuration directory and reads/writes settings

use std::path::{Path, PathBuf};

use crate::error::{ConfigError, ConfigResult};
use crate::tracing::span_names;

use super::settings::Settings;

/// Directory name under the platform config dir
pub const APP_DIR_NAME: &str = "connbook";

/// Settings file name
pub const SETTINGS_FILE: &str = "settings.toml";

/// Default document file name
pub const DOCUMENT_FILE: &str = "connections.xml";

/// Access to files in the configuration directory
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_dir: PathBuf,
}

impl ConfigManager {
    /// Uses `<platform config dir>/connbook`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NoConfigDir` if the platform has none.
    pub fn new() -> ConfigResult<Self> {
        let base = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(Self::with_config_dir(base.join(APP_DIR_NAME)))
    }

    /// Uses an explicit directory
    #[must_use]
    pub const fn with_config_dir(config_dir: PathBuf) -> Self {
        Self { config_dir }
    }

    /// The configuration directory
    #[must_use]
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Path of the settings file
    #[must_use]
    pub fn settings_path(&self) -> PathBuf {
        self.config_dir.join(SETTINGS_FILE)
    }

    /// Document path from settings, or the default one in the config dir
    #[must_use]
    pub fn document_path(&self, settings: &Settings) -> PathBuf {
        match &settings.document.path {
            Some(path) if path.is_absolute() => path.clone(),
            Some(path) => self.config_dir.join(path),
            None => self.config_dir.join(DOCUMENT_FILE),
        }
    }

    /// Reads the settings; a missing file yields defaults
    ///
    /// # Errors
    ///
    /// Returns `Io` if the file exists but cannot be read and `Parse` if it
    /// is not valid TOML for [`Settings`].
    pub fn load_settings(&self) -> ConfigResult<Settings> {
        let _span = tracing::debug_span!(span_names::CONFIG_LOAD).entered();
        let path = self.settings_path();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No settings file, using defaults");
            return Ok(Settings::default());
        }
        let content = std::fs::read_to_string(&path)?;
        toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(format!("{}: {e}", path.display())))
    }

    /// Writes the settings, creating the directory if needed
    ///
    /// # Errors
    ///
    /// Returns `Io` or `Serialize`.
    pub fn save_settings(&self, settings: &Settings) -> ConfigResult<()> {
        self.ensure_config_dir()?;
        let content =
            toml::to_string_pretty(settings).map_err(|e| ConfigError::Serialize(e.to_string()))?;
        std::fs::write(self.settings_path(), content)?;
        Ok(())
    }

    /// Creates the configuration directory
    ///
    /// # Errors
    ///
    /// Returns `Io` if it cannot be created.
    pub fn ensure_config_dir(&self) -> ConfigResult<()> {
        std::fs::create_dir_all(&self.config_dir)?;
        Ok(())
    }
}
