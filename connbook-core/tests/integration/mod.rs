//! Integration test modules

mod config_tests;
mod document_tests;
mod ssh_config_roundtrip;
