//! Export of connections to foreign formats

mod ssh_config;

pub use ssh_config::{SshConfigExport, SshConfigExporter};
