//! Import of connections from foreign formats
//!
//! Importers parse a source into an [`ImportResult`]; the result is then
//! committed into a document folder in a single bulk rebuild.

mod connbook;
mod ssh_config;
mod traits;

pub use connbook::{merge_document, merge_document_file};
pub use ssh_config::SshConfigImporter;
pub use traits::{ImportResult, ImportSource, SkippedEntry, read_import_file};
