//! CLI argument parsing types using `clap`.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// `ConnBook` command-line interface for managing the connection book
#[derive(Parser)]
#[command(name = "connbook-cli")]
#[command(author, version, about = "ConnBook command-line interface")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the configuration directory
    #[arg(short, long, global = true, env = "CONNBOOK_CONFIG_DIR")]
    pub config: Option<PathBuf>,

    /// Document file to use instead of the configured one
    #[arg(short, long, global = true)]
    pub document: Option<PathBuf>,

    /// Increase output verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// List connections
    #[command(about = "List the folders and connections of the document")]
    List {
        /// Output format
        #[arg(short, long, default_value = "tree", value_enum)]
        format: OutputFormat,

        /// Only list below this folder (symbolic path, e.g. "Servers/Linux")
        #[arg(short = 'F', long)]
        folder: Option<String>,

        /// Only list connections of this protocol
        #[arg(short, long)]
        protocol: Option<String>,
    },

    /// Show connection details
    #[command(about = "Show the details of a connection")]
    Show {
        /// Connection name
        name: String,
    },

    /// Add a new connection
    #[command(about = "Add a new connection to the document")]
    Add {
        /// Name for the new connection
        #[arg(short, long)]
        name: String,

        /// Host address (hostname or IP), or device path for serial
        #[arg(short = 'H', long)]
        host: String,

        /// Port number (defaults to the protocol's default port)
        #[arg(short, long)]
        port: Option<u16>,

        /// Protocol (ssh, sftp, telnet, mosh, serial)
        #[arg(short = 'P', long, default_value = "ssh")]
        protocol: String,

        /// Folder to add the connection to, created if missing
        #[arg(short = 'F', long)]
        folder: Option<String>,

        #[command(flatten)]
        fields: RecordFields,
    },

    /// Update an existing connection
    #[command(about = "Update an existing connection")]
    Update {
        /// Connection name
        name: String,

        /// New name
        #[arg(long)]
        new_name: Option<String>,

        /// New host
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// New port
        #[arg(short, long)]
        port: Option<u16>,

        /// New protocol
        #[arg(short = 'P', long)]
        protocol: Option<String>,

        #[command(flatten)]
        fields: RecordFields,
    },

    /// Duplicate a connection
    #[command(about = "Copy a connection into the same folder")]
    Duplicate {
        /// Connection to copy
        name: String,

        /// Name of the copy (default: "<name> (copy)")
        #[arg(long)]
        new_name: Option<String>,
    },

    /// Delete a connection or a folder
    #[command(about = "Delete a connection, or a folder with everything in it")]
    Delete {
        /// Connection name, or folder path with --folder
        target: String,

        /// Treat the target as a folder path
        #[arg(long)]
        folder: bool,
    },

    /// Create a folder
    #[command(about = "Create a folder and any missing parents")]
    Mkdir {
        /// Folder path, e.g. "Servers/Linux"
        path: String,
    },

    /// Rename a folder
    #[command(name = "rename-folder", about = "Rename a folder")]
    RenameFolder {
        /// Folder path
        path: String,

        /// New folder name
        name: String,
    },

    /// Move a connection or a folder
    #[command(name = "move", about = "Move a connection or a folder into another folder")]
    Move {
        /// Connection name, or folder path with --folder
        target: String,

        /// Destination folder path ("/" for the top level)
        #[arg(long)]
        to: String,

        /// Treat the target as a folder path
        #[arg(long)]
        folder: bool,
    },

    /// Sort a folder
    #[command(about = "Sort the children of a folder by name")]
    Sort {
        /// Folder path (default: top level)
        path: Option<String>,

        /// Sort every folder below as well
        #[arg(short, long)]
        recursive: bool,
    },

    /// Check the document
    #[command(about = "Recompute connection warnings and check tree/registry consistency")]
    Check,

    /// Resolve a positional path
    #[command(about = "Resolve a positional path such as \"0:2\" to a node")]
    Resolve {
        /// Positional path
        path: String,
    },

    /// Print the paths of a node
    #[command(about = "Print the positional and symbolic paths of a node")]
    Path {
        /// Connection name, or folder path with --folder
        target: String,

        /// Treat the target as a folder path
        #[arg(long)]
        folder: bool,
    },

    /// Directory history of a connection
    #[command(about = "Show or extend the recent-directory history of a connection")]
    History {
        /// Connection name
        name: String,

        /// Directory to record as most recently used
        directory: Option<String>,
    },

    /// Import from an OpenSSH client configuration
    #[command(name = "import-ssh", about = "Import Host entries from an OpenSSH config file")]
    ImportSsh {
        /// Config file (default: ~/.ssh/config)
        file: Option<PathBuf>,

        /// Destination folder, created if missing
        #[arg(short = 'F', long, default_value = "Imported")]
        folder: String,
    },

    /// Export to an OpenSSH client configuration
    #[command(name = "export-ssh", about = "Export ssh connections as OpenSSH Host entries")]
    ExportSsh {
        /// Output file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Merge another document
    #[command(about = "Merge the folders and connections of another document")]
    Merge {
        /// Document to merge
        file: PathBuf,

        /// Destination folder (default: top level), created if missing
        #[arg(short = 'F', long)]
        folder: Option<String>,
    },
}

/// Optional record fields shared by `add` and `update`
#[derive(Debug, Default, clap::Args)]
pub struct RecordFields {
    /// Login user
    #[arg(short, long)]
    pub user: Option<String>,

    /// Login password
    #[arg(long)]
    pub password: Option<String>,

    /// Authentication mode (prompt, save, keyfile)
    #[arg(long, value_name = "MODE")]
    pub auth_mode: Option<String>,

    /// User sent when credentials are saved
    #[arg(long)]
    pub auth_user: Option<String>,

    /// Password sent when credentials are saved
    #[arg(long)]
    pub auth_password: Option<String>,

    /// Private key file; implies key-file authentication
    #[arg(short, long)]
    pub key: Option<PathBuf>,

    /// Remote working directory
    #[arg(long)]
    pub directory: Option<String>,

    /// Free-text note
    #[arg(long)]
    pub note: Option<String>,
}

/// Output format for `list`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Indented folder tree
    #[default]
    Tree,
    /// Flat table of connections
    Table,
    /// JSON array of connections
    Json,
}
