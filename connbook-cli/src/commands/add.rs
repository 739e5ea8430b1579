//! Add connection command.

use connbook_core::models::{AuthMode, BuiltinCatalog, ConnectionRecord, ProtocolCatalog};

use crate::cli::RecordFields;
use crate::error::CliError;
use crate::util::{Context, display_path, parse_auth_mode};

/// Parameters for the `add` command
pub struct AddParams<'a> {
    pub name: &'a str,
    pub host: &'a str,
    pub port: Option<u16>,
    pub protocol: &'a str,
    pub folder: Option<&'a str>,
    pub fields: &'a RecordFields,
}

/// Add connection command handler
pub fn cmd_add(context: &Context, params: AddParams<'_>) -> Result<(), CliError> {
    let port = params.port.unwrap_or_else(|| default_port(params.protocol));
    let mut record = ConnectionRecord::new(params.name, params.host, port, params.protocol);
    apply_fields(&mut record, params.fields)?;

    let mut document = context.open_document()?;
    let folder = match params.folder {
        Some(path) => document.ensure_folder(path)?,
        None => document.tree().root(),
    };
    let node = document.add_connection(folder, record)?;
    context.save_document(&document)?;

    let path = document.symbolic_path_of(node)?;
    println!("Added connection '{}' at {}", params.name, display_path(&path));
    Ok(())
}

/// Port of the protocol in the built-in catalog, or 0 if unknown
pub fn default_port(protocol: &str) -> u16 {
    BuiltinCatalog::new()
        .lookup(protocol)
        .map_or(0, |entry| entry.default_port)
}

/// Copies the optional fields given on the command line into `record`.
///
/// A key file switches the mode to key-file authentication unless a mode is
/// given explicitly.
pub fn apply_fields(record: &mut ConnectionRecord, fields: &RecordFields) -> Result<(), CliError> {
    if let Some(user) = &fields.user {
        record.user = user.clone();
    }
    if let Some(password) = &fields.password {
        record.password.set(password.as_str());
    }
    if let Some(user) = &fields.auth_user {
        record.auth.user = user.clone();
    }
    if let Some(password) = &fields.auth_password {
        record.auth.password.set(password.as_str());
    }
    if let Some(key) = &fields.key {
        record.auth.identity_file = Some(key.clone());
        record.auth.mode = AuthMode::KeyFile;
    }
    if let Some(mode) = &fields.auth_mode {
        record.auth.mode = parse_auth_mode(mode)?;
    }
    if let Some(directory) = &fields.directory {
        record.directory = directory.clone();
    }
    if let Some(note) = &fields.note {
        record.set_note(note.as_str());
    }
    Ok(())
}
