//! Document check command.

use std::fmt::Write as _;

use connbook_core::document::Document;
use connbook_core::models::BuiltinCatalog;

use crate::error::CliError;
use crate::util::Context;

/// Recompute warnings and report tree/registry mismatches
pub fn cmd_check(context: &Context) -> Result<(), CliError> {
    let mut document = context.open_document()?;
    document.recompute_warnings(&BuiltinCatalog::new());
    println!("{}", format_report(&document));
    Ok(())
}

/// Render warnings and consistency problems
#[must_use]
pub fn format_report(document: &Document) -> String {
    let mut out = String::new();
    let report = document.consistency_check();

    for name in &report.orphan_records {
        let _ = writeln!(out, "{name}: record has no entry in the folder tree");
    }
    for name in &report.dangling_leaves {
        let _ = writeln!(out, "{name}: tree entry has no record");
    }
    for name in &report.duplicate_leaves {
        let _ = writeln!(out, "{name}: appears more than once in the folder tree");
    }

    let mut flagged = 0;
    for record in document.registry() {
        let descriptions = record.warnings.descriptions();
        if descriptions.is_empty() {
            continue;
        }
        flagged += 1;
        let _ = writeln!(out, "{}: {}", record.name, descriptions.join("; "));
    }

    let _ = write!(
        out,
        "Checked {} connection(s): {} with warnings, {}",
        document.registry().count(),
        flagged,
        if report.is_consistent() {
            "tree and registry consistent"
        } else {
            "tree and registry inconsistent"
        }
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use connbook_core::models::{ConnectionRecord, StaticCatalog};

    #[test]
    fn test_report_lists_warnings() {
        let mut document = Document::new();
        let root = document.tree().root();
        document
            .add_connection(root, ConnectionRecord::new_ssh("a", "same.host"))
            .unwrap();
        document
            .add_connection(root, ConnectionRecord::new_ssh("b", "same.host"))
            .unwrap();
        document.recompute_warnings(&StaticCatalog::builtin());

        let report = format_report(&document);
        assert!(report.contains("a: another connection uses the same host"));
        assert!(report.ends_with(
            "Checked 2 connection(s): 2 with warnings, tree and registry consistent"
        ));
    }
}
