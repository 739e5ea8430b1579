//! Update connection command.

use crate::cli::RecordFields;
use crate::commands::add::apply_fields;
use crate::error::CliError;
use crate::util::{Context, find_connection};

/// Parameters for the `update` command
pub struct UpdateParams<'a> {
    pub name: &'a str,
    pub new_name: Option<&'a str>,
    pub host: Option<&'a str>,
    pub port: Option<u16>,
    pub protocol: Option<&'a str>,
    pub fields: &'a RecordFields,
}

/// Update connection command handler
///
/// Builds an edited copy of the record and commits it in one step, so a
/// rejected edit leaves the document unchanged.
pub fn cmd_update(context: &Context, params: UpdateParams<'_>) -> Result<(), CliError> {
    let mut document = context.open_document()?;
    let node = find_connection(&document, params.name)?;
    let mut record = document
        .record_of(node)
        .cloned()
        .ok_or_else(|| CliError::ConnectionNotFound(params.name.to_string()))?;
    let old_name = record.name.clone();

    if let Some(new_name) = params.new_name {
        record.name = new_name.to_string();
    }
    if let Some(host) = params.host {
        record.host = host.to_string();
    }
    if let Some(port) = params.port {
        record.port = port;
    }
    if let Some(protocol) = params.protocol {
        record.protocol = protocol.to_string();
    }
    apply_fields(&mut record, params.fields)?;

    let name = record.name.clone();
    document.edit_connection(node, record)?;
    context.save_document(&document)?;

    if name == old_name {
        println!("Updated connection '{name}'");
    } else {
        println!("Updated connection '{old_name}' (now '{name}')");
    }
    Ok(())
}
