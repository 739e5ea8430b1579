//! Path commands: positional resolution and path display.

use connbook_core::tree::NodeKind;

use crate::error::CliError;
use crate::util::{Context, display_path, find_node};

/// Resolve a positional path and print the node it addresses
pub fn cmd_resolve(context: &Context, path: &str) -> Result<(), CliError> {
    let document = context.open_document()?;
    let node = document.resolve_positional(path)?;
    let kind = match document.tree().get(node)?.kind() {
        NodeKind::Folder => "folder",
        NodeKind::Connection => "connection",
    };
    let symbolic = document.symbolic_path_of(node)?;
    println!("{}\t{kind}", display_path(&symbolic));
    Ok(())
}

/// Print the positional and symbolic paths of a node
pub fn cmd_path(context: &Context, target: &str, folder: bool) -> Result<(), CliError> {
    let document = context.open_document()?;
    let node = find_node(&document, target, folder)?;
    println!("Positional: {}", document.positional_path_of(node)?);
    println!("Symbolic:   {}", display_path(&document.symbolic_path_of(node)?));
    Ok(())
}
