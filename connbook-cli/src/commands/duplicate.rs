//! Duplicate connection command.

use crate::error::CliError;
use crate::util::{Context, find_connection};

/// Duplicate a connection into the same folder
pub fn cmd_duplicate(context: &Context, name: &str, new_name: Option<&str>) -> Result<(), CliError> {
    let mut document = context.open_document()?;
    let source = find_connection(&document, name)?;
    let copy = document.duplicate_connection(source)?;

    if let Some(new_name) = new_name
        && let Some(record) = document.record_of(copy)
    {
        let mut renamed = record.clone();
        renamed.name = new_name.to_string();
        document.edit_connection(copy, renamed)?;
    }
    context.save_document(&document)?;

    let dup_name = document.tree().name(copy);
    println!("Created duplicate connection '{dup_name}'");
    Ok(())
}
