//! List connections command.

use std::fmt::Write as _;

use connbook_core::document::Document;
use connbook_core::models::ConnectionRecord;
use connbook_core::tree::{NodeId, NodeKind};

use crate::cli::OutputFormat;
use crate::error::CliError;
use crate::util::{Context, display_path, find_folder};

/// List connections command handler
pub fn cmd_list(
    context: &Context,
    format: OutputFormat,
    folder: Option<&str>,
    protocol: Option<&str>,
) -> Result<(), CliError> {
    let document = context.open_document()?;
    let start = match folder {
        Some(path) => find_folder(&document, path)?,
        None => document.tree().root(),
    };

    match format {
        OutputFormat::Tree => println!("{}", format_tree(&document, start, protocol)),
        OutputFormat::Table => {
            let rows = collect_rows(&document, start, protocol);
            println!("{}", format_table(&rows));
        }
        OutputFormat::Json => {
            let rows = collect_rows(&document, start, protocol);
            println!("{}", format_json(&rows)?);
        }
    }

    Ok(())
}

fn matches_protocol(record: &ConnectionRecord, protocol: Option<&str>) -> bool {
    protocol.is_none_or(|p| record.protocol.eq_ignore_ascii_case(p))
}

/// Format the folder tree below `start` with two-space indentation
#[must_use]
pub fn format_tree(document: &Document, start: NodeId, protocol: Option<&str>) -> String {
    let mut output = String::new();
    write_tree(document, start, protocol, 0, &mut output);
    if output.is_empty() {
        return "No connections found.".to_string();
    }
    output.trim_end().to_string()
}

fn write_tree(
    document: &Document,
    folder: NodeId,
    protocol: Option<&str>,
    depth: usize,
    output: &mut String,
) {
    let tree = document.tree();
    let indent = "  ".repeat(depth);
    for child in tree.children(folder) {
        let Some(node) = tree.node(child) else {
            continue;
        };
        match node.kind() {
            NodeKind::Folder => {
                let _ = writeln!(output, "{indent}{}/", node.name());
                write_tree(document, child, protocol, depth + 1, output);
            }
            NodeKind::Connection => {
                let Some(record) = document.record_of(child) else {
                    let _ = writeln!(output, "{indent}{} (missing record)", node.name());
                    continue;
                };
                if !matches_protocol(record, protocol) {
                    continue;
                }
                let marker = if record.warnings.is_empty() { "" } else { " !" };
                let _ = writeln!(
                    output,
                    "{indent}{}  [{}] {}:{}{marker}",
                    record.name, record.protocol, record.host, record.port
                );
            }
        }
    }
}

/// One connection with its location
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ConnectionOutput {
    pub name: String,
    pub host: String,
    pub port: u16,
    pub protocol: String,
    pub folder: String,
    pub position: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub warnings: Vec<String>,
}

/// Connections below `start` in tree order
#[must_use]
pub fn collect_rows(
    document: &Document,
    start: NodeId,
    protocol: Option<&str>,
) -> Vec<ConnectionOutput> {
    let tree = document.tree();
    tree.descendants(start)
        .into_iter()
        .filter_map(|node| {
            let record = document.record_of(node)?;
            if !matches_protocol(record, protocol) {
                return None;
            }
            let folder = tree
                .parent(node)
                .and_then(|parent| tree.symbolic_path_of(parent).ok())
                .unwrap_or_default();
            let user = if record.user.is_empty() {
                &record.auth.user
            } else {
                &record.user
            };
            Some(ConnectionOutput {
                name: record.name.clone(),
                host: record.host.clone(),
                port: record.port,
                protocol: record.protocol.clone(),
                folder,
                position: tree.positional_path_of(node).unwrap_or_default(),
                user: (!user.is_empty()).then(|| user.clone()),
                warnings: record
                    .warnings
                    .descriptions()
                    .into_iter()
                    .map(str::to_string)
                    .collect(),
            })
        })
        .collect()
}

/// Format connections as a table string
#[must_use]
pub fn format_table(rows: &[ConnectionOutput]) -> String {
    if rows.is_empty() {
        return "No connections found.".to_string();
    }

    let mut output = String::new();

    let name_width = rows.iter().map(|c| c.name.len()).max().unwrap_or(4).max(4);
    let host_width = rows.iter().map(|c| c.host.len()).max().unwrap_or(4).max(4);
    let folder_width = rows
        .iter()
        .map(|c| display_path(&c.folder).len())
        .max()
        .unwrap_or(6)
        .max(6);
    let protocol_width = 8;
    let port_width = 5;

    let _ = writeln!(
        output,
        "{:<name_width$}  {:<host_width$}  {:<port_width$}  {:<protocol_width$}  {:<folder_width$}",
        "NAME", "HOST", "PORT", "PROTOCOL", "FOLDER"
    );
    let _ = writeln!(
        output,
        "{:-<name_width$}  {:-<host_width$}  {:-<port_width$}  {:-<protocol_width$}  {:-<folder_width$}",
        "", "", "", "", ""
    );

    for row in rows {
        let _ = writeln!(
            output,
            "{:<name_width$}  {:<host_width$}  {:<port_width$}  {:<protocol_width$}  {:<folder_width$}",
            row.name,
            row.host,
            row.port,
            row.protocol,
            display_path(&row.folder)
        );
    }

    output.trim_end().to_string()
}

/// Format connections as JSON string
///
/// # Errors
///
/// Returns `CliError::Config` if JSON serialization fails.
pub fn format_json(rows: &[ConnectionOutput]) -> Result<String, CliError> {
    serde_json::to_string_pretty(rows)
        .map_err(|e| CliError::Config(format!("Failed to serialize to JSON: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document() -> Document {
        let mut document = Document::new();
        let linux = document.ensure_folder("Servers/Linux").unwrap();
        document
            .add_connection(linux, ConnectionRecord::new_ssh("web", "web.example").with_user("ops"))
            .unwrap();
        let root = document.tree().root();
        document
            .add_connection(root, ConnectionRecord::new("switch", "10.0.0.2", 23, "telnet"))
            .unwrap();
        document
    }

    #[test]
    fn test_format_tree() {
        let document = document();
        let text = format_tree(&document, document.tree().root(), None);
        assert_eq!(
            text,
            "Servers/\n  Linux/\n    web  [ssh] web.example:22\nswitch  [telnet] 10.0.0.2:23"
        );
    }

    #[test]
    fn test_rows_filtered_by_protocol() {
        let document = document();
        let rows = collect_rows(&document, document.tree().root(), Some("SSH"));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].folder, "Servers/Linux");
        assert_eq!(rows[0].position, "0:0:0");
        assert_eq!(rows[0].user.as_deref(), Some("ops"));
    }

    #[test]
    fn test_table_and_json() {
        let document = document();
        let rows = collect_rows(&document, document.tree().root(), None);
        let table = format_table(&rows);
        assert!(table.starts_with("NAME"));
        assert!(table.contains("switch"));
        assert_eq!(format_table(&[]), "No connections found.");

        let json = format_json(&rows).unwrap();
        let parsed: Vec<ConnectionOutput> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[1].folder, "");
    }
}
