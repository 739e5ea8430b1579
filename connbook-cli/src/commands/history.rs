//! Directory history command.

use crate::error::CliError;
use crate::util::{Context, find_connection};

/// Show a connection's recent directories, most recent first, optionally
/// recording a new one
pub fn cmd_history(context: &Context, name: &str, directory: Option<&str>) -> Result<(), CliError> {
    let mut document = context.open_document()?;
    let node = find_connection(&document, name)?;
    let name = document.tree().name(node).to_string();

    if let Some(directory) = directory {
        document.add_history_directory(&name, directory)?;
        context.save_document(&document)?;
    }

    let record = document
        .record_of(node)
        .ok_or_else(|| CliError::ConnectionNotFound(name.clone()))?;
    if record.history.is_empty() {
        println!("No directory history for '{name}'");
        return Ok(());
    }
    for dir in record.history.iter().rev() {
        println!("{dir}");
    }
    Ok(())
}
