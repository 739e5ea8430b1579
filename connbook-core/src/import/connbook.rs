//! Merging another connbook document into an open one

use std::path::Path;

use crate::document::Document;
use crate::error::ConnBookResult;
use crate::tree::NodeId;

use super::traits::{ImportResult, SkippedEntry};

/// Grafts the folders and connections of the document at `path` under
/// `target`.
///
/// The returned result lists the records as committed, the renames made to
/// avoid clashes, and incoming records that were not added.
///
/// # Errors
///
/// Returns a document error if the file cannot be loaded, and whatever
/// [`Document::merge`] reports.
pub fn merge_document_file(
    document: &mut Document,
    path: &Path,
    target: NodeId,
) -> ConnBookResult<ImportResult> {
    let incoming = Document::load(path)?;
    merge_document(document, &incoming, target)
}

/// Same as [`merge_document_file`] for an already loaded document
///
/// # Errors
///
/// See [`Document::merge`].
pub fn merge_document(
    document: &mut Document,
    incoming: &Document,
    target: NodeId,
) -> ConnBookResult<ImportResult> {
    let report = document.merge(incoming, target)?;

    let mut result = ImportResult::new();
    for name in &report.added {
        if let Some(record) = document.registry().get_by_name(name) {
            result.add_connection(record.clone());
        }
    }
    for name in report.skipped {
        result.add_skipped(SkippedEntry::new(name, "missing host or protocol"));
    }
    result.renamed = report.renamed;
    Ok(result)
}
