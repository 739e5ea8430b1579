//! Error types for `ConnBook`
//!
//! Every failure in the registry is an ordinary return value. None of the
//! operations that return these errors leave the tree or the registry in a
//! partially modified state.

use thiserror::Error;

/// Errors raised by structural operations on the group tree
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// The folder has no free child slot left
    #[error("Folder '{0}' has no free child slots")]
    CapacityExceeded(String),

    /// A node or path segment could not be found
    #[error("Not found: {0}")]
    NotFound(String),

    /// The operation requires a folder but got a connection leaf
    #[error("'{0}' is not a folder")]
    NotAFolder(String),

    /// A positional or symbolic path is syntactically invalid
    #[error("Invalid path '{path}': {reason}")]
    InvalidPath {
        /// The offending path
        path: String,
        /// What is wrong with it
        reason: String,
    },

    /// A folder cannot be moved below itself
    #[error("Cannot move '{0}' into its own subtree")]
    CyclicMove(String),
}

/// Result type for tree operations
pub type TreeResult<T> = std::result::Result<T, TreeError>;

/// Naming violations detected before a mutation is committed
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    /// Name is empty, or a connection lacks its host or protocol
    #[error("Missing value")]
    MissingValue,

    /// Another connection already uses this name
    #[error("Duplicate connection name")]
    DuplicateConnection,

    /// A sibling in the target folder already uses this name
    #[error("Duplicate name at this level")]
    DuplicateAtLevel,
}

impl ValidationError {
    /// Returns the message shown to the user before retrying the operation
    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::MissingValue => "Please fill in all required fields (name, host and protocol).",
            Self::DuplicateConnection => {
                "A connection with the same name already exists. Connection names must be unique."
            }
            Self::DuplicateAtLevel => {
                "An item with the same name already exists in this folder."
            }
        }
    }
}

/// Result type for validation
pub type ValidationResult = std::result::Result<(), ValidationError>;

/// Errors from the credential obfuscation routine
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CredentialError {
    /// The cipher refused to seal the plaintext
    #[error("Failed to encrypt credential")]
    Encrypt,

    /// The stored text is not valid hex or is truncated
    #[error("Invalid credential encoding: {0}")]
    InvalidEncoding(String),

    /// Authentication of the ciphertext failed
    #[error("Failed to decrypt credential")]
    Decrypt,
}

/// Errors that can occur while loading or saving a document
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DocumentError {
    /// The document could not be read or written
    #[error("I/O error: {0}")]
    Io(String),

    /// The document is malformed
    #[error("Failed to parse document: {0}")]
    Parse(String),

    /// A password could not be sealed while saving
    #[error("Credential error: {0}")]
    Credential(#[from] CredentialError),

    /// A bulk rebuild was requested while another one is running
    #[error("A document rebuild is already in progress")]
    RebuildInProgress,
}

/// Result type for document operations
pub type DocumentResult<T> = std::result::Result<T, DocumentError>;

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read or write the settings file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse the settings file
    #[error("Failed to parse settings: {0}")]
    Parse(String),

    /// Failed to serialize the settings
    #[error("Failed to serialize settings: {0}")]
    Serialize(String),

    /// No configuration directory could be determined
    #[error("Could not determine configuration directory")]
    NoConfigDir,
}

/// Result type for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Import/export adapter errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ImportError {
    /// The source could not be read or parsed
    #[error("Failed to parse {source_name}: {reason}")]
    ParseError {
        /// Human-readable name of the source format
        source_name: String,
        /// Details
        reason: String,
    },

    /// The export target could not be written
    #[error("Failed to write {0}")]
    WriteError(String),
}

/// Umbrella error for operations that touch several subsystems
#[derive(Debug, Error)]
pub enum ConnBookError {
    /// Tree structure error
    #[error(transparent)]
    Tree(#[from] TreeError),

    /// Validation failure
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Document load/save failure
    #[error(transparent)]
    Document(#[from] DocumentError),

    /// Credential codec failure
    #[error(transparent)]
    Credential(#[from] CredentialError),

    /// Configuration failure
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Import/export failure
    #[error(transparent)]
    Import(#[from] ImportError),
}

/// Result type for cross-cutting operations
pub type ConnBookResult<T> = std::result::Result<T, ConnBookError>;
