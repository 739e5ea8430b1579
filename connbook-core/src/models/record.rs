//! Connection record: the full profile stored in the registry.

use std::path::PathBuf;

use crate::credential::Credential;

use super::history::DirectoryHistory;

/// Maximum length of the free-text note, in characters
pub const NOTE_MAX_LEN: usize = 1024;

/// How the client authenticates when a session is opened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AuthMode {
    /// Ask for credentials every time
    #[default]
    Prompt,
    /// Use the stored user and password
    SaveCredentials,
    /// Use a private key file
    KeyFile,
}

impl AuthMode {
    /// Returns the identifier written to documents
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Prompt => "prompt",
            Self::SaveCredentials => "save",
            Self::KeyFile => "keyfile",
        }
    }
}

impl std::str::FromStr for AuthMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "prompt" | "0" => Ok(Self::Prompt),
            "save" | "save-credentials" | "1" => Ok(Self::SaveCredentials),
            "keyfile" | "key" | "2" => Ok(Self::KeyFile),
            other => Err(format!("unknown authentication mode '{other}'")),
        }
    }
}

impl std::fmt::Display for AuthMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Prompt => write!(f, "Prompt"),
            Self::SaveCredentials => write!(f, "Save credentials"),
            Self::KeyFile => write!(f, "Key file"),
        }
    }
}

/// Authentication block of a connection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Authentication {
    /// Authentication mode
    pub mode: AuthMode,
    /// User sent when credentials are saved
    pub user: String,
    /// Password sent when credentials are saved
    pub password: Credential,
    /// Private key used in key-file mode
    pub identity_file: Option<PathBuf>,
}

/// Transport options handed to the protocol client
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransportOptions {
    /// Forward X11
    pub x11_forwarding: bool,
    /// Forward the authentication agent
    pub agent_forwarding: bool,
    /// Skip strict host key checking
    pub disable_strict_key_checking: bool,
    /// Send keep-alive messages
    pub keep_alive: bool,
    /// Keep-alive interval in seconds
    pub keep_alive_interval: u32,
}

/// Derived, non-persisted warning flags of a connection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Warnings(u8);

impl Warnings {
    /// Another connection points at the same host
    pub const DUPLICATE_HOST: Self = Self(0b001);
    /// The protocol is not in the catalog
    pub const PROTOCOL_MISSING: Self = Self(0b010);
    /// The protocol's client executable is not installed
    pub const PROTOCOL_COMMAND_MISSING: Self = Self(0b100);

    /// No warnings
    #[must_use]
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Raw bit representation
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Returns true if no flag is set
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns true if every flag of `other` is set
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Sets the flags of `other`
    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    /// Human-readable descriptions of the set flags
    #[must_use]
    pub fn descriptions(self) -> Vec<&'static str> {
        let mut out = Vec::new();
        if self.contains(Self::DUPLICATE_HOST) {
            out.push("another connection uses the same host");
        }
        if self.contains(Self::PROTOCOL_MISSING) {
            out.push("protocol is not defined");
        }
        if self.contains(Self::PROTOCOL_COMMAND_MISSING) {
            out.push("protocol command is not installed");
        }
        out
    }
}

impl std::ops::BitOr for Warnings {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// A named remote-connection profile.
///
/// The name is the registry key and is compared case-insensitively.
/// Equality ignores the derived [`Warnings`].
#[derive(Debug, Clone, Default)]
pub struct ConnectionRecord {
    /// Unique display name
    pub name: String,
    /// Remote host
    pub host: String,
    /// Remote port
    pub port: u16,
    /// Protocol identifier looked up in the protocol catalog
    pub protocol: String,
    /// Authentication settings
    pub auth: Authentication,
    /// User of the last successful login
    pub last_user: String,
    /// User typed at the login prompt
    pub user: String,
    /// Password typed at the login prompt
    pub password: Credential,
    /// Transport options
    pub options: TransportOptions,
    note: String,
    /// Remote working directory
    pub directory: String,
    /// Default local directory for uploads
    pub upload_dir: String,
    /// Default local directory for downloads
    pub download_dir: String,
    /// Recently used remote directories
    pub history: DirectoryHistory,
    /// Extra arguments passed verbatim to the protocol client
    pub extra_args: String,
    /// Skip warning recomputation for this record
    pub ignore_warnings: bool,
    /// Derived warnings, recomputed by the registry
    pub warnings: Warnings,
}

impl PartialEq for ConnectionRecord {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.host == other.host
            && self.port == other.port
            && self.protocol == other.protocol
            && self.auth == other.auth
            && self.last_user == other.last_user
            && self.user == other.user
            && self.password == other.password
            && self.options == other.options
            && self.note == other.note
            && self.directory == other.directory
            && self.upload_dir == other.upload_dir
            && self.download_dir == other.download_dir
            && self.history == other.history
            && self.extra_args == other.extra_args
            && self.ignore_warnings == other.ignore_warnings
    }
}

impl Eq for ConnectionRecord {}

impl ConnectionRecord {
    /// Creates a record with the essential fields set
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        host: impl Into<String>,
        port: u16,
        protocol: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            host: host.into(),
            port,
            protocol: protocol.into(),
            ..Self::default()
        }
    }

    /// Creates an SSH record on port 22
    #[must_use]
    pub fn new_ssh(name: impl Into<String>, host: impl Into<String>) -> Self {
        Self::new(name, host, 22, "ssh")
    }

    /// Sets the login user
    #[must_use]
    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = user.into();
        self
    }

    /// Sets the login password
    #[must_use]
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password.set(password);
        self
    }

    /// Sets the authentication block
    #[must_use]
    pub fn with_auth(mut self, auth: Authentication) -> Self {
        self.auth = auth;
        self
    }

    /// Sets the note
    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.set_note(note);
        self
    }

    /// Returns the free-text note
    #[must_use]
    pub fn note(&self) -> &str {
        &self.note
    }

    /// Sets the note, truncated to [`NOTE_MAX_LEN`] characters
    pub fn set_note(&mut self, note: impl Into<String>) {
        let note = note.into();
        self.note = match note.char_indices().nth(NOTE_MAX_LEN) {
            Some((cut, _)) => note[..cut].to_string(),
            None => note,
        };
    }

    /// Returns true if the fields required to open a session are present
    #[must_use]
    pub fn has_required_fields(&self) -> bool {
        !self.name.trim().is_empty()
            && !self.host.trim().is_empty()
            && !self.protocol.trim().is_empty()
    }
}
