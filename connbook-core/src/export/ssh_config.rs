//! OpenSSH client configuration exporter.
//!
//! Writes every `ssh` record as a `Host` block. Records of other protocols
//! are skipped.

use std::fmt::Write;
use std::path::Path;

use crate::error::ImportError;
use crate::models::ConnectionRecord;
use crate::registry::Registry;
use crate::tracing::span_names;

/// Output of an export run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SshConfigExport {
    /// Rendered configuration text
    pub content: String,
    /// Number of `Host` blocks written
    pub exported: usize,
    /// Names of records that were not exported
    pub skipped: Vec<String>,
}

/// Exporter for OpenSSH client configuration files
#[derive(Debug, Clone, Copy, Default)]
pub struct SshConfigExporter;

impl SshConfigExporter {
    /// Creates a new exporter
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Renders the `ssh` records of a registry
    #[must_use]
    pub fn export(&self, registry: &Registry) -> SshConfigExport {
        let mut export = SshConfigExport {
            content: String::from("# Exported from ConnBook\n"),
            ..SshConfigExport::default()
        };
        for record in registry {
            if record.protocol.eq_ignore_ascii_case("ssh") && !record.host.is_empty() {
                export.content.push('\n');
                export.content.push_str(&Self::format_host_block(record));
                export.exported += 1;
            } else {
                export.skipped.push(record.name.clone());
            }
        }
        export
    }

    /// Renders and writes to `path`
    ///
    /// # Errors
    ///
    /// Returns `ImportError::WriteError` if the file cannot be written.
    pub fn export_to_path(&self, registry: &Registry, path: &Path) -> Result<SshConfigExport, ImportError> {
        let _span = tracing::info_span!(span_names::EXPORT_SSH_CONFIG, path = %path.display()).entered();
        let export = self.export(registry);
        std::fs::write(path, &export.content)
            .map_err(|e| ImportError::WriteError(format!("{}: {e}", path.display())))?;
        tracing::info!(exported = export.exported, skipped = export.skipped.len(), "Exported SSH config");
        Ok(export)
    }

    /// Formats one `Host` block
    #[must_use]
    pub fn format_host_block(record: &ConnectionRecord) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Host {}", host_alias(&record.name));
        let _ = writeln!(out, "    HostName {}", record.host);
        if record.port != 0 && record.port != 22 {
            let _ = writeln!(out, "    Port {}", record.port);
        }
        let user = if record.auth.user.is_empty() {
            &record.user
        } else {
            &record.auth.user
        };
        if !user.is_empty() {
            let _ = writeln!(out, "    User {user}");
        }
        if let Some(identity) = &record.auth.identity_file {
            let _ = writeln!(out, "    IdentityFile {}", quote(&identity.display().to_string()));
        }
        let options = &record.options;
        if options.x11_forwarding {
            out.push_str("    ForwardX11 yes\n");
        }
        if options.agent_forwarding {
            out.push_str("    ForwardAgent yes\n");
        }
        if options.disable_strict_key_checking {
            out.push_str("    StrictHostKeyChecking no\n");
        }
        if options.keep_alive && options.keep_alive_interval > 0 {
            let _ = writeln!(out, "    ServerAliveInterval {}", options.keep_alive_interval);
        }
        out
    }
}

/// Host patterns cannot contain whitespace or pattern characters
fn host_alias(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_whitespace() || matches!(c, '*' | '?' | '!' | ',') {
                '_'
            } else {
                c
            }
        })
        .collect()
}

fn quote(value: &str) -> String {
    if value.contains(char::is_whitespace) {
        format!("\"{value}\"")
    } else {
        value.to_string()
    }
}
