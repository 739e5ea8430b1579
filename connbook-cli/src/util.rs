//! Shared utility functions used across command modules.

use std::path::{Path, PathBuf};

use connbook_core::config::{ConfigManager, Settings};
use connbook_core::document::Document;
use connbook_core::models::{AuthMode, BuiltinCatalog};
use connbook_core::tree::NodeId;

use crate::error::CliError;

/// Configuration resolved once per invocation
pub struct Context {
    /// Settings loaded from the config directory
    pub settings: Settings,
    /// Document file the commands operate on
    pub document_path: PathBuf,
}

impl Context {
    /// Loads settings and resolves the document path.
    ///
    /// `document` overrides the path from the settings.
    pub fn new(config_path: Option<&Path>, document: Option<PathBuf>) -> Result<Self, CliError> {
        let config_manager = create_config_manager(config_path)?;
        let settings = config_manager.load_settings()?;
        let document_path = document.unwrap_or_else(|| config_manager.document_path(&settings));
        Ok(Self {
            settings,
            document_path,
        })
    }

    /// Opens the document; a missing file yields an empty document.
    ///
    /// Applies the post-load steps from the settings.
    pub fn open_document(&self) -> Result<Document, CliError> {
        let mut document = if self.document_path.exists() {
            Document::load(&self.document_path)?
        } else {
            tracing::info!(path = %self.document_path.display(), "No document yet, starting empty");
            Document::new()
        };

        if self.settings.document.sort_on_load {
            let root = document.tree().root();
            document.sort(root, true)?;
        }
        if self.settings.document.check_on_load {
            document.recompute_warnings(&BuiltinCatalog::new());
        }
        Ok(document)
    }

    /// Writes the document back
    pub fn save_document(&self, document: &Document) -> Result<(), CliError> {
        document.save(&self.document_path)?;
        Ok(())
    }
}

/// Creates a `ConfigManager` using the optional custom config directory
/// from CLI args.
pub fn create_config_manager(config_path: Option<&Path>) -> Result<ConfigManager, CliError> {
    match config_path {
        Some(path) => Ok(ConfigManager::with_config_dir(path.to_path_buf())),
        None => ConfigManager::new()
            .map_err(|e| CliError::Config(format!("Failed to initialize config: {e}"))),
    }
}

/// Find a connection leaf by name.
///
/// Tries the exact name (case-insensitive), then a unique prefix.
pub fn find_connection(document: &Document, name: &str) -> Result<NodeId, CliError> {
    if let Some(node) = document.connection_node(name) {
        return Ok(node);
    }

    let prefix = name.to_lowercase();
    let matches: Vec<&str> = document
        .registry()
        .iter()
        .filter(|r| r.name.to_lowercase().starts_with(&prefix))
        .map(|r| r.name.as_str())
        .collect();

    match matches.as_slice() {
        [] => Err(CliError::ConnectionNotFound(name.to_string())),
        [only] => document
            .connection_node(only)
            .ok_or_else(|| CliError::ConnectionNotFound(name.to_string())),
        _ => Err(CliError::InvalidArgument(format!(
            "Ambiguous connection name '{}'. Matches: {}",
            name,
            matches.join(", ")
        ))),
    }
}

/// Find an existing folder by symbolic path; `""` and `"/"` are the top level
pub fn find_folder(document: &Document, path: &str) -> Result<NodeId, CliError> {
    let node = document.resolve_symbolic(path)?;
    if document.tree().get(node)?.is_folder() {
        Ok(node)
    } else {
        Err(CliError::NotFound(format!("folder '{path}'")))
    }
}

/// Find a connection by name, or a folder by path when `folder` is set
pub fn find_node(document: &Document, target: &str, folder: bool) -> Result<NodeId, CliError> {
    if folder {
        find_folder(document, target)
    } else {
        find_connection(document, target)
    }
}

/// Parse an authentication mode argument
pub fn parse_auth_mode(value: &str) -> Result<AuthMode, CliError> {
    value.parse().map_err(CliError::InvalidArgument)
}

/// Display form of a symbolic path; the top level is shown as `/`
pub fn display_path(path: &str) -> &str {
    if path.is_empty() { "/" } else { path }
}
