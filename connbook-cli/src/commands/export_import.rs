//! OpenSSH config import/export and document merge commands.

use std::path::Path;

use connbook_core::export::SshConfigExporter;
use connbook_core::import::{ImportResult, ImportSource, SshConfigImporter, merge_document_file};

use crate::error::CliError;
use crate::util::{Context, display_path};

/// Import `Host` entries from an OpenSSH config into a folder
pub fn cmd_import_ssh(context: &Context, file: Option<&Path>, folder: &str) -> Result<(), CliError> {
    let importer = SshConfigImporter::new();
    let mut result = match file {
        Some(path) => importer.import_from_path(path)?,
        None => importer.import()?,
    };
    let mut document = context.open_document()?;
    let target = document.ensure_folder(folder)?;
    result.commit(&mut document, target)?;
    context.save_document(&document)?;

    let source = file.map_or_else(
        || importer.display_name().to_string(),
        |path| path.display().to_string(),
    );
    let target_path = document.symbolic_path_of(target)?;
    println!("Imported from {source} into '{}'", display_path(&target_path));
    print_result(&result);
    Ok(())
}

/// Export every ssh connection as a `Host` block
pub fn cmd_export_ssh(context: &Context, output: &Path) -> Result<(), CliError> {
    let document = context.open_document()?;
    let export = SshConfigExporter::new().export_to_path(document.registry(), output)?;

    println!(
        "Exported {} connection(s) to {}",
        export.exported,
        output.display()
    );
    if !export.skipped.is_empty() {
        println!("Skipped (not ssh): {}", export.skipped.join(", "));
    }
    Ok(())
}

/// Merge another document under a folder
pub fn cmd_merge(context: &Context, file: &Path, folder: Option<&str>) -> Result<(), CliError> {
    let mut document = context.open_document()?;
    let target = match folder {
        Some(path) => document.ensure_folder(path)?,
        None => document.tree().root(),
    };
    let result = merge_document_file(&mut document, file, target)?;
    context.save_document(&document)?;

    println!("Merged {}", file.display());
    print_result(&result);
    Ok(())
}

fn print_result(result: &ImportResult) {
    println!("{}", result.summary());
    for (old, new) in &result.renamed {
        println!("  renamed: {old} -> {new}");
    }
    for entry in &result.skipped {
        match &entry.location {
            Some(location) => println!("  skipped: {} ({}, {location})", entry.identifier, entry.reason),
            None => println!("  skipped: {} ({})", entry.identifier, entry.reason),
        }
    }
    for error in &result.errors {
        println!("  error: {error}");
    }
}
