//! Protocol catalog consulted when recomputing connection warnings.

use std::collections::HashSet;
use std::path::Path;

/// Broad category of a protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProtocolKind {
    /// Interactive remote shell (SSH, Telnet, Mosh)
    Shell,
    /// File transfer (SFTP)
    FileTransfer,
    /// Local serial line
    Serial,
}

impl std::fmt::Display for ProtocolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Shell => write!(f, "shell"),
            Self::FileTransfer => write!(f, "file-transfer"),
            Self::Serial => write!(f, "serial"),
        }
    }
}

/// Catalog entry describing how a protocol is launched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtocolEntry {
    /// Protocol identifier as stored in connection records (e.g. "ssh")
    pub name: String,
    /// Client executable
    pub command: String,
    /// Port used when a record leaves it unset
    pub default_port: u16,
    /// Protocol category
    pub kind: ProtocolKind,
}

impl ProtocolEntry {
    /// Creates a catalog entry
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        command: impl Into<String>,
        default_port: u16,
        kind: ProtocolKind,
    ) -> Self {
        Self {
            name: name.into(),
            command: command.into(),
            default_port,
            kind,
        }
    }
}

/// Source of protocol definitions.
///
/// The registry only reads from the catalog; it never owns it.
pub trait ProtocolCatalog {
    /// Looks up a protocol by identifier (case-insensitive)
    fn lookup(&self, protocol: &str) -> Option<ProtocolEntry>;

    /// Returns true if the client executable can be launched
    fn has_command(&self, command: &str) -> bool;
}

fn builtin_entries() -> Vec<ProtocolEntry> {
    vec![
        ProtocolEntry::new("ssh", "ssh", 22, ProtocolKind::Shell),
        ProtocolEntry::new("sftp", "sftp", 22, ProtocolKind::FileTransfer),
        ProtocolEntry::new("telnet", "telnet", 23, ProtocolKind::Shell),
        ProtocolEntry::new("mosh", "mosh", 22, ProtocolKind::Shell),
        ProtocolEntry::new("serial", "picocom", 0, ProtocolKind::Serial),
    ]
}

/// Catalog of the protocols shipped with the application.
///
/// Command availability is resolved by searching `PATH`.
#[derive(Debug, Clone)]
pub struct BuiltinCatalog {
    entries: Vec<ProtocolEntry>,
}

impl Default for BuiltinCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl BuiltinCatalog {
    /// Creates the built-in catalog
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: builtin_entries(),
        }
    }

    /// Returns all entries
    #[must_use]
    pub fn entries(&self) -> &[ProtocolEntry] {
        &self.entries
    }
}

impl ProtocolCatalog for BuiltinCatalog {
    fn lookup(&self, protocol: &str) -> Option<ProtocolEntry> {
        self.entries
            .iter()
            .find(|e| e.name.eq_ignore_ascii_case(protocol))
            .cloned()
    }

    fn has_command(&self, command: &str) -> bool {
        if command.contains('/') {
            return Path::new(command).is_file();
        }
        std::env::var_os("PATH").is_some_and(|paths| {
            std::env::split_paths(&paths).any(|dir| dir.join(command).is_file())
        })
    }
}

/// In-memory catalog with explicit command availability
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    entries: Vec<ProtocolEntry>,
    missing_commands: HashSet<String>,
}

impl StaticCatalog {
    /// Creates a catalog from the given entries; every command is available
    #[must_use]
    pub fn new(entries: Vec<ProtocolEntry>) -> Self {
        Self {
            entries,
            missing_commands: HashSet::new(),
        }
    }

    /// Creates a catalog with the built-in protocol set
    #[must_use]
    pub fn builtin() -> Self {
        Self::new(builtin_entries())
    }

    /// Marks a command as not installed
    #[must_use]
    pub fn with_missing_command(mut self, command: impl Into<String>) -> Self {
        self.missing_commands.insert(command.into());
        self
    }
}

impl ProtocolCatalog for StaticCatalog {
    fn lookup(&self, protocol: &str) -> Option<ProtocolEntry> {
        self.entries
            .iter()
            .find(|e| e.name.eq_ignore_ascii_case(protocol))
            .cloned()
    }

    fn has_command(&self, command: &str) -> bool {
        !self.missing_commands.contains(command)
    }
}
