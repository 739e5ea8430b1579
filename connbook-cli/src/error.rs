//! CLI error types and exit codes.

use connbook_core::error::{
    ConfigError, ConnBookError, DocumentError, ImportError, TreeError, ValidationError,
};

/// Exit codes for CLI operations
pub mod exit_codes {
    /// General error - configuration, validation, document or I/O errors
    pub const GENERAL_ERROR: i32 = 1;
    /// The named connection, folder or path does not exist
    pub const NOT_FOUND: i32 = 2;
}

/// CLI error type
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Connection not found
    #[error("Connection not found: {0}")]
    ConnectionNotFound(String),

    /// Folder or path not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Naming rule violated; shows the user-facing message
    #[error("{}", .0.user_message())]
    Validation(ValidationError),

    /// Structural error in the folder tree
    #[error("Folder error: {0}")]
    Tree(String),

    /// Document load/save error
    #[error("Document error: {0}")]
    Document(String),

    /// Import error
    #[error("Import error: {0}")]
    Import(String),

    /// Export error
    #[error("Export error: {0}")]
    Export(String),

    /// Invalid argument value
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl From<ConnBookError> for CliError {
    fn from(err: ConnBookError) -> Self {
        match err {
            ConnBookError::Tree(e) => e.into(),
            ConnBookError::Validation(e) => Self::Validation(e),
            ConnBookError::Document(e) => e.into(),
            ConnBookError::Credential(e) => Self::Document(e.to_string()),
            ConnBookError::Config(e) => e.into(),
            ConnBookError::Import(e) => Self::Import(e.to_string()),
        }
    }
}

impl From<TreeError> for CliError {
    fn from(err: TreeError) -> Self {
        match err {
            TreeError::NotFound(what) => Self::NotFound(what),
            other => Self::Tree(other.to_string()),
        }
    }
}

impl From<DocumentError> for CliError {
    fn from(err: DocumentError) -> Self {
        Self::Document(err.to_string())
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<ImportError> for CliError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::WriteError(_) => Self::Export(err.to_string()),
            ImportError::ParseError { .. } => Self::Import(err.to_string()),
        }
    }
}

impl CliError {
    /// Returns the appropriate exit code for this error type.
    ///
    /// Exit codes:
    /// - 0: Success (not an error)
    /// - 1: General error (configuration, validation, document, import, export)
    /// - 2: The addressed connection, folder or path does not exist
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionNotFound(_) | Self::NotFound(_) => exit_codes::NOT_FOUND,
            Self::Config(_)
            | Self::Validation(_)
            | Self::Tree(_)
            | Self::Document(_)
            | Self::Import(_)
            | Self::Export(_)
            | Self::InvalidArgument(_) => exit_codes::GENERAL_ERROR,
        }
    }
}
