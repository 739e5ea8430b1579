//! Property test modules

mod document_roundtrip_tests;
mod history_tests;
mod path_tests;
mod registry_tests;
