//! Import source trait and result types.

use std::fs;
use std::path::{Path, PathBuf};

use crate::document::Document;
use crate::error::{ConnBookError, ConnBookResult, ImportError, ValidationError};
use crate::models::ConnectionRecord;
use crate::tree::NodeId;

/// Reads a file for import operations with consistent error handling.
///
/// # Errors
/// Returns `ImportError::ParseError` if the file cannot be read.
pub fn read_import_file(path: &Path, source_name: &str) -> Result<String, ImportError> {
    fs::read_to_string(path).map_err(|e| ImportError::ParseError {
        source_name: source_name.to_string(),
        reason: format!("Failed to read {}: {}", path.display(), e),
    })
}

/// Result of an import: parsed records plus what was skipped or renamed
#[derive(Debug, Default)]
pub struct ImportResult {
    /// Records ready to be committed
    pub connections: Vec<ConnectionRecord>,
    /// Entries that were skipped (invalid but non-fatal)
    pub skipped: Vec<SkippedEntry>,
    /// `(original, new)` names of records renamed to avoid a clash
    pub renamed: Vec<(String, String)>,
    /// Non-fatal problems found while parsing
    pub errors: Vec<ImportError>,
}

impl ImportResult {
    /// Creates a new empty import result
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of entries processed
    #[must_use]
    pub fn total_processed(&self) -> usize {
        self.connections.len() + self.skipped.len()
    }

    /// Returns true if the import had any errors
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Returns true if any entries were skipped
    #[must_use]
    pub fn has_skipped(&self) -> bool {
        !self.skipped.is_empty()
    }

    /// Returns a summary string of the import result
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Imported: {}, Renamed: {}, Skipped: {}, Errors: {}",
            self.connections.len(),
            self.renamed.len(),
            self.skipped.len(),
            self.errors.len()
        )
    }

    /// Adds a connection to the result
    pub fn add_connection(&mut self, connection: ConnectionRecord) {
        self.connections.push(connection);
    }

    /// Adds a skipped entry to the result
    pub fn add_skipped(&mut self, entry: SkippedEntry) {
        self.skipped.push(entry);
    }

    /// Adds an error to the result
    pub fn add_error(&mut self, error: ImportError) {
        self.errors.push(error);
    }

    /// Adds the parsed records to `folder` in one bulk rebuild.
    ///
    /// Names already used in the document or in `folder` are replaced with a
    /// `"<name> (copy)"` variant and listed in `renamed`. Records missing a
    /// host or protocol move to `skipped`. After the call `connections`
    /// holds the records as committed.
    ///
    /// On error neither the document nor this result is changed.
    ///
    /// # Errors
    ///
    /// Returns `RebuildInProgress` or a tree error such as a full folder.
    pub fn commit(&mut self, document: &mut Document, folder: NodeId) -> ConnBookResult<usize> {
        let pending = std::mem::take(&mut self.connections);
        let outcome = document.rebuild_atomic(|document| {
            let mut committed = Vec::with_capacity(pending.len());
            let mut renamed = Vec::new();
            let mut skipped = Vec::new();

            for mut record in pending.iter().cloned() {
                let incoming = record.name.clone();
                let clash = document.registry().contains(&incoming)
                    || document.tree().find_child(folder, &incoming).is_some();
                if clash {
                    record.name = document.unique_copy_name(&incoming, folder);
                }
                match document.add_connection(folder, record.clone()) {
                    Ok(_) => {
                        if record.name != incoming {
                            renamed.push((incoming, record.name.clone()));
                        }
                        committed.push(record);
                    }
                    Err(ConnBookError::Validation(ValidationError::MissingValue)) => {
                        skipped.push(SkippedEntry::new(incoming, "missing host or protocol"));
                    }
                    Err(e) => return Err(e),
                }
            }
            Ok((committed, renamed, skipped))
        });

        match outcome {
            Ok((committed, renamed, skipped)) => {
                let added = committed.len();
                self.connections = committed;
                self.renamed.extend(renamed);
                self.skipped.extend(skipped);
                tracing::info!(added, renamed = self.renamed.len(), "Committed imported connections");
                Ok(added)
            }
            Err(e) => {
                self.connections = pending;
                Err(e)
            }
        }
    }
}

/// An entry that was skipped during import
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedEntry {
    /// Identifier or name of the skipped entry
    pub identifier: String,
    /// Reason why the entry was skipped
    pub reason: String,
    /// Source location (file path, line number, etc.)
    pub location: Option<String>,
}

impl SkippedEntry {
    /// Creates a new skipped entry
    #[must_use]
    pub fn new(identifier: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            reason: reason.into(),
            location: None,
        }
    }

    /// Creates a new skipped entry with location information
    #[must_use]
    pub fn with_location(
        identifier: impl Into<String>,
        reason: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            reason: reason.into(),
            location: Some(location.into()),
        }
    }
}

/// A source of connection records in a foreign format
pub trait ImportSource {
    /// Returns a human-readable name for this import source
    fn display_name(&self) -> &'static str;

    /// Returns the default paths where this source looks for configuration
    fn default_paths(&self) -> Vec<PathBuf>;

    /// Parses records from a specific path
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read. Invalid entries are
    /// recorded in the `ImportResult` instead.
    fn import_from_path(&self, path: &Path) -> Result<ImportResult, ImportError>;

    /// Parses records from the first existing default path
    ///
    /// # Errors
    ///
    /// Returns `ImportError::ParseError` if no default path exists.
    fn import(&self) -> Result<ImportResult, ImportError> {
        let path = self
            .default_paths()
            .into_iter()
            .find(|p| p.exists())
            .ok_or_else(|| ImportError::ParseError {
                source_name: self.display_name().to_string(),
                reason: "no configuration file found".to_string(),
            })?;
        self.import_from_path(&path)
    }
}
