//! Application settings persisted as TOML

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::tracing::TracingLevel;

/// Top-level settings file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Document handling
    pub document: DocumentSettings,
    /// Logging
    pub logging: LoggingSettings,
}

/// Where the document lives and what to do after loading it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentSettings {
    /// Document file; relative paths are resolved against the config dir
    pub path: Option<PathBuf>,
    /// Sort every folder after loading
    pub sort_on_load: bool,
    /// Recompute connection warnings after loading
    pub check_on_load: bool,
}

impl Default for DocumentSettings {
    fn default() -> Self {
        Self {
            path: None,
            sort_on_load: false,
            check_on_load: true,
        }
    }
}

/// Logging defaults, raised by `-v` flags on the command line
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Base log level
    pub level: TracingLevel,
    /// Optional log file instead of stderr
    pub file: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_uses_defaults() {
        let settings: Settings = toml::from_str("[document]\nsort_on_load = true\n").unwrap();
        assert!(settings.document.sort_on_load);
        assert!(settings.document.check_on_load);
        assert_eq!(settings.logging.level, TracingLevel::Warn);
    }

    #[test]
    fn test_empty_file_is_default() {
        let settings: Settings = toml::from_str("").unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_serialize_round_trip() {
        let mut settings = Settings::default();
        settings.document.path = Some(PathBuf::from("work.xml"));
        settings.logging.level = TracingLevel::Debug;
        let text = toml::to_string(&settings).unwrap();
        let back: Settings = toml::from_str(&text).unwrap();
        assert_eq!(back, settings);
    }
}
