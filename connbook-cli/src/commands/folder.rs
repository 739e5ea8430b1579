//! Folder commands: create, rename, move and sort.

use crate::error::CliError;
use crate::util::{Context, display_path, find_folder, find_node};

/// Create a folder and any missing parents
pub fn cmd_mkdir(context: &Context, path: &str) -> Result<(), CliError> {
    let mut document = context.open_document()?;
    if let Ok(existing) = find_folder(&document, path) {
        let path = document.symbolic_path_of(existing)?;
        println!("Folder '{}' already exists", display_path(&path));
        return Ok(());
    }

    let folder = document.ensure_folder(path)?;
    context.save_document(&document)?;
    println!("Created folder '{}'", document.symbolic_path_of(folder)?);
    Ok(())
}

/// Rename a folder in place
pub fn cmd_rename(context: &Context, path: &str, name: &str) -> Result<(), CliError> {
    let mut document = context.open_document()?;
    let folder = find_folder(&document, path)?;
    if folder == document.tree().root() {
        return Err(CliError::InvalidArgument(
            "The top-level folder cannot be renamed".to_string(),
        ));
    }
    document.rename_folder(folder, name)?;
    context.save_document(&document)?;
    println!(
        "Renamed folder '{path}' to '{}'",
        document.symbolic_path_of(folder)?
    );
    Ok(())
}

/// Move a connection or folder into another folder
pub fn cmd_move(context: &Context, target: &str, to: &str, folder: bool) -> Result<(), CliError> {
    let mut document = context.open_document()?;
    let node = find_node(&document, target, folder)?;
    let destination = find_folder(&document, to)?;
    let from = document.symbolic_path_of(node)?;

    document.move_node(node, destination)?;
    context.save_document(&document)?;
    println!("Moved '{from}' to '{}'", document.symbolic_path_of(node)?);
    Ok(())
}

/// Sort the children of a folder by name
pub fn cmd_sort(context: &Context, path: &str, recursive: bool) -> Result<(), CliError> {
    let mut document = context.open_document()?;
    let folder = find_folder(&document, path)?;
    document.sort(folder, recursive)?;
    context.save_document(&document)?;

    let path = document.symbolic_path_of(folder)?;
    if recursive {
        println!("Sorted '{}' and every folder below it", display_path(&path));
    } else {
        println!("Sorted '{}'", display_path(&path));
    }
    Ok(())
}
