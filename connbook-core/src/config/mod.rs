//! Configuration management for `ConnBook`
//!
//! This module provides the `ConfigManager` for loading and saving
//! settings in TOML format.

mod manager;
pub mod settings;

pub use manager::{APP_DIR_NAME, ConfigManager, DOCUMENT_FILE, SETTINGS_FILE};
pub use settings::{DocumentSettings, LoggingSettings, Settings};
