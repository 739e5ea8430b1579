//! Show connection details command.

use std::fmt::Write as _;

use connbook_core::document::Document;
use connbook_core::tree::NodeId;

use crate::error::CliError;
use crate::util::{Context, find_connection};

/// Show connection details command handler
pub fn cmd_show(context: &Context, name: &str) -> Result<(), CliError> {
    let document = context.open_document()?;
    let node = find_connection(&document, name)?;
    println!("{}", format_details(&document, node)?);
    Ok(())
}

/// Render the details of a connection leaf; passwords are never printed
pub fn format_details(document: &Document, node: NodeId) -> Result<String, CliError> {
    let record = document
        .record_of(node)
        .ok_or_else(|| CliError::ConnectionNotFound(document.tree().name(node).to_string()))?;
    let mut out = String::new();
    let set = |present: bool| if present { "(set)" } else { "(not set)" };

    let _ = writeln!(out, "Connection Details:");
    let _ = writeln!(out, "  Name:     {}", record.name);
    let _ = writeln!(out, "  Path:     {}", document.symbolic_path_of(node)?);
    let _ = writeln!(out, "  Position: {}", document.positional_path_of(node)?);
    let _ = writeln!(out, "  Host:     {}", record.host);
    let _ = writeln!(out, "  Port:     {}", record.port);
    let _ = writeln!(out, "  Protocol: {}", record.protocol);
    let _ = writeln!(out, "  Auth:     {}", record.auth.mode);
    if !record.auth.user.is_empty() {
        let _ = writeln!(out, "  Auth user: {}", record.auth.user);
    }
    let _ = writeln!(out, "  Auth password: {}", set(!record.auth.password.is_empty()));
    if let Some(key) = &record.auth.identity_file {
        let _ = writeln!(out, "  Key Path: {}", key.display());
    }
    if !record.user.is_empty() {
        let _ = writeln!(out, "  User:     {}", record.user);
    }
    let _ = writeln!(out, "  Password: {}", set(!record.password.is_empty()));
    if !record.last_user.is_empty() {
        let _ = writeln!(out, "  Last user: {}", record.last_user);
    }
    if !record.directory.is_empty() {
        let _ = writeln!(out, "  Directory: {}", record.directory);
    }
    if !record.upload_dir.is_empty() {
        let _ = writeln!(out, "  Upload dir: {}", record.upload_dir);
    }
    if !record.download_dir.is_empty() {
        let _ = writeln!(out, "  Download dir: {}", record.download_dir);
    }
    if !record.extra_args.is_empty() {
        let _ = writeln!(out, "  Extra args: {}", record.extra_args);
    }

    let o = &record.options;
    let mut options = Vec::new();
    if o.x11_forwarding {
        options.push("x11-forwarding".to_string());
    }
    if o.agent_forwarding {
        options.push("agent-forwarding".to_string());
    }
    if o.disable_strict_key_checking {
        options.push("no-strict-host-key-checking".to_string());
    }
    if o.keep_alive {
        options.push(format!("keep-alive {}s", o.keep_alive_interval));
    }
    if !options.is_empty() {
        let _ = writeln!(out, "  Options:  {}", options.join(", "));
    }

    if !record.note().is_empty() {
        let _ = writeln!(out, "  Note:     {}", record.note().replace('\n', "\n            "));
    }
    if !record.history.is_empty() {
        let _ = writeln!(out, "  History:");
        for dir in record.history.iter().rev() {
            let _ = writeln!(out, "    {dir}");
        }
    }
    for warning in record.warnings.descriptions() {
        let _ = writeln!(out, "  Warning:  {warning}");
    }

    Ok(out.trim_end().to_string())
}
