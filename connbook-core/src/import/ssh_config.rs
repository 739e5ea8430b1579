//! OpenSSH client configuration importer.
//!
//! Reads `Host` blocks from `~/.ssh/config` syntax. Every concrete alias
//! becomes one `ssh` record; wildcard and negated patterns, `Match` blocks
//! and options outside any block are skipped.

use std::path::{Path, PathBuf};

use crate::error::ImportError;
use crate::models::{AuthMode, ConnectionRecord};
use crate::tracing::span_names;

use super::traits::{ImportResult, ImportSource, SkippedEntry, read_import_file};

const SOURCE_NAME: &str = "SSH config";

/// Importer for OpenSSH client configuration files
#[derive(Debug, Clone, Copy, Default)]
pub struct SshConfigImporter;

impl SshConfigImporter {
    /// Creates a new importer
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Parses configuration text.
    ///
    /// `source` names the origin in skipped-entry locations.
    #[must_use]
    pub fn parse_config(&self, content: &str, source: &str) -> ImportResult {
        let mut result = ImportResult::new();
        let mut block: Vec<ConnectionRecord> = Vec::new();
        let mut in_match = false;

        for (index, raw) in content.lines().enumerate() {
            let line_no = index + 1;
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = split_option(line) else {
                result.add_skipped(SkippedEntry::with_location(
                    line,
                    "option without a value",
                    format!("{source}:{line_no}"),
                ));
                continue;
            };

            match key.as_str() {
                "host" => {
                    result.connections.append(&mut block);
                    in_match = false;
                    for pattern in value.split_whitespace() {
                        if is_pattern(pattern) {
                            result.add_skipped(SkippedEntry::with_location(
                                pattern,
                                "wildcard host pattern",
                                format!("{source}:{line_no}"),
                            ));
                        } else {
                            block.push(ConnectionRecord::new_ssh(pattern, pattern));
                        }
                    }
                }
                "match" => {
                    result.connections.append(&mut block);
                    in_match = true;
                    result.add_skipped(SkippedEntry::with_location(
                        value.as_str(),
                        "Match blocks are not supported",
                        format!("{source}:{line_no}"),
                    ));
                }
                _ if in_match || block.is_empty() => {}
                _ => {
                    for record in &mut block {
                        if let Err(reason) = apply_option(record, &key, &value) {
                            result.add_error(ImportError::ParseError {
                                source_name: SOURCE_NAME.to_string(),
                                reason: format!("{source}:{line_no}: {reason}"),
                            });
                        }
                    }
                }
            }
        }
        result.connections.append(&mut block);

        tracing::debug!(
            connections = result.connections.len(),
            skipped = result.skipped.len(),
            "Parsed SSH config"
        );
        result
    }
}

/// Splits `Key value` or `Key=value`; the key is lowercased
fn split_option(line: &str) -> Option<(String, String)> {
    let split_at = line.find(|c: char| c.is_whitespace() || c == '=')?;
    let key = line[..split_at].to_lowercase();
    let rest = line[split_at..].trim_start();
    let rest = rest.strip_prefix('=').unwrap_or(rest).trim();
    if rest.is_empty() {
        return None;
    }
    let value = rest
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(rest);
    Some((key, value.to_string()))
}

fn is_pattern(alias: &str) -> bool {
    alias.contains(['*', '?', '!'])
}

fn yes(value: &str) -> bool {
    matches!(value.to_lowercase().as_str(), "yes" | "true")
}

fn expand_home(value: &str) -> PathBuf {
    match value.strip_prefix("~/") {
        Some(rest) => dirs::home_dir().map_or_else(|| PathBuf::from(value), |home| home.join(rest)),
        None => PathBuf::from(value),
    }
}

fn apply_option(record: &mut ConnectionRecord, key: &str, value: &str) -> Result<(), String> {
    match key {
        "hostname" => record.host = value.to_string(),
        "port" => {
            record.port = value
                .parse()
                .map_err(|_| format!("invalid port '{value}'"))?;
        }
        "user" => {
            record.user = value.to_string();
            record.auth.user = value.to_string();
        }
        "identityfile" => {
            record.auth.identity_file = Some(expand_home(value));
            record.auth.mode = AuthMode::KeyFile;
        }
        "forwardx11" => record.options.x11_forwarding = yes(value),
        "forwardagent" => record.options.agent_forwarding = yes(value),
        "stricthostkeychecking" => {
            record.options.disable_strict_key_checking =
                matches!(value.to_lowercase().as_str(), "no" | "off");
        }
        "serveraliveinterval" => {
            let interval: u32 = value
                .parse()
                .map_err(|_| format!("invalid ServerAliveInterval '{value}'"))?;
            record.options.keep_alive = interval > 0;
            record.options.keep_alive_interval = interval;
        }
        other => {
            tracing::trace!(option = other, host = %record.name, "Ignoring SSH option");
        }
    }
    Ok(())
}

impl ImportSource for SshConfigImporter {
    fn display_name(&self) -> &'static str {
        SOURCE_NAME
    }

    fn default_paths(&self) -> Vec<PathBuf> {
        dirs::home_dir()
            .map(|home| vec![home.join(".ssh").join("config")])
            .unwrap_or_default()
    }

    fn import_from_path(&self, path: &Path) -> Result<ImportResult, ImportError> {
        let _span = tracing::info_span!(span_names::IMPORT_SSH_CONFIG, path = %path.display()).entered();
        let content = read_import_file(path, SOURCE_NAME)?;
        Ok(self.parse_config(&content, &path.display().to_string()))
    }
}
