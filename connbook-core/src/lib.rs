//! `ConnBook` Core Library
//!
//! This crate provides the hierarchical connection registry behind the
//! `ConnBook` connection book: a folder tree of named connection profiles,
//! addressed by symbolic (`"Prod/db"`) or positional (`"0:2"`) paths and
//! persisted as a versioned XML document.
//!
//! # Crate Structure
//!
//! - [`models`] - Connection records, directory history, protocol catalog
//! - [`tree`] - Group tree with fixed-capacity folder slots and path addressing
//! - [`registry`] - Name-sorted, case-insensitive store of connection records
//! - [`validator`] - Naming checks run before every mutation
//! - [`credential`] - Password obfuscation for persisted documents
//! - [`document`] - Tree and registry together: load/save, events, bulk rebuilds
//! - [`import`] / [`export`] - OpenSSH client configuration and document merge
//! - [`config`] - Application settings and persistence
//! - [`tracing`] - Structured logging setup

#![warn(missing_docs)]

pub mod config;
pub mod credential;
pub mod document;
pub mod error;
pub mod export;
pub mod import;
pub mod models;
pub mod registry;
pub mod tracing;
pub mod tree;
pub mod validator;

pub use config::{ConfigManager, DocumentSettings, LoggingSettings, Settings};
pub use credential::{Credential, MIN_ENCRYPTED_LEN};
pub use document::{
    ConsistencyReport, Document, DocumentEvent, FORMAT_VERSION, LEGACY_VERSION, MergeReport,
    RebuildGuard, SubscriptionId,
};
pub use error::{
    ConfigError, ConfigResult, ConnBookError, ConnBookResult, CredentialError, DocumentError,
    DocumentResult, ImportError, TreeError, TreeResult, ValidationError, ValidationResult,
};
pub use export::{SshConfigExport, SshConfigExporter};
pub use import::{
    ImportResult, ImportSource, SkippedEntry, SshConfigImporter, merge_document,
    merge_document_file,
};
pub use models::{
    AuthMode, Authentication, BuiltinCatalog, ConnectionRecord, DirectoryHistory,
    HISTORY_CAPACITY, NOTE_MAX_LEN, ProtocolCatalog, ProtocolEntry, ProtocolKind, StaticCatalog,
    TransportOptions, Warnings,
};
pub use registry::Registry;
pub use self::tracing::{
    TracingConfig, TracingError, TracingLevel, TracingOutput, init_tracing,
    is_tracing_initialized,
};
pub use tree::{FOLDER_CAPACITY, GroupNode, GroupTree, NodeId, NodeKind, ROOT_NAME, ResolveMode};
pub use validator::{Subject, Validator};
