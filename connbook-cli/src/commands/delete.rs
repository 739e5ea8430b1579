//! Delete connection or folder command.

use crate::error::CliError;
use crate::util::{Context, display_path, find_node};

/// Delete command handler; folders take their whole subtree with them
pub fn cmd_delete(context: &Context, target: &str, folder: bool) -> Result<(), CliError> {
    let mut document = context.open_document()?;
    let node = find_node(&document, target, folder)?;
    let path = document.symbolic_path_of(node)?;
    let removed = document.delete_node(node)?;
    context.save_document(&document)?;

    if folder {
        println!(
            "Deleted folder '{}' and {} connection(s)",
            display_path(&path),
            removed.len()
        );
        for name in &removed {
            println!("  {name}");
        }
    } else {
        println!("Deleted connection '{path}'");
    }
    Ok(())
}
