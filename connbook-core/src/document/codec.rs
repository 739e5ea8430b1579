//! Mapping between the tree/registry pair and the element tree
//!
//! # Layout
//!
//! ```text
//! <connbook version="2">
//!   <folder name="Servers" expanded="1">
//!     <connection name="DB1" host="10.0.0.1" protocol="ssh" port="22" ignore-warnings="0">
//!       <authentication mode="save" user="admin" password="<hex>" identity-file=""/>
//!       <last-user value=""/>
//!       ...
//!       <history><item value="/srv"/></history>
//!       <options><property name="keep-alive" value="1"/>...</options>
//!     </connection>
//!   </folder>
//! </connbook>
//! ```
//!
//! Version 1 documents kept the authentication user and password in
//! `<auth_user>`/`<auth_password>` elements next to `<authentication>`.

use std::path::PathBuf;
use std::str::FromStr;

use crate::credential::Credential;
use crate::error::{DocumentError, DocumentResult, TreeError};
use crate::models::{AuthMode, ConnectionRecord};
use crate::registry::Registry;
use crate::tree::{GroupTree, NodeId, NodeKind, ResolveMode};

use super::xml::XmlNode;

/// Format version written by this crate
pub const FORMAT_VERSION: u32 = 2;

/// The one older layout the reader still accepts
pub const LEGACY_VERSION: u32 = 1;

/// Name of the top-level element
pub const ROOT_ELEMENT: &str = "connbook";

const FOLDER: &str = "folder";
const CONNECTION: &str = "connection";
const AUTHENTICATION: &str = "authentication";
const LEGACY_AUTH_USER: &str = "auth_user";
const LEGACY_AUTH_PASSWORD: &str = "auth_password";
const HISTORY: &str = "history";
const HISTORY_ITEM: &str = "item";
const OPTIONS: &str = "options";
const PROPERTY: &str = "property";

const OPT_X11: &str = "x11-forwarding";
const OPT_AGENT: &str = "agent-forwarding";
const OPT_STRICT: &str = "disable-strict-key-checking";
const OPT_KEEP_ALIVE: &str = "keep-alive";
const OPT_KEEP_ALIVE_INTERVAL: &str = "keep-alive-interval";

fn flag(value: bool) -> &'static str {
    if value { "1" } else { "0" }
}

fn value_element(name: &str, value: &str) -> XmlNode {
    XmlNode::new(name).with_attr("value", value)
}

fn property(name: &str, value: impl Into<String>) -> XmlNode {
    XmlNode::new(PROPERTY)
        .with_attr("name", name)
        .with_attr("value", value)
}

// ========== Writer ==========

/// Serializes the tree and the records its leaves refer to
///
/// # Errors
///
/// Returns `DocumentError::Credential` if a password cannot be sealed.
pub fn write(tree: &GroupTree, registry: &Registry) -> DocumentResult<XmlNode> {
    let mut root = XmlNode::new(ROOT_ELEMENT).with_attr("version", FORMAT_VERSION.to_string());
    write_children(tree, registry, tree.root(), &mut root)?;
    Ok(root)
}

fn write_children(
    tree: &GroupTree,
    registry: &Registry,
    folder: NodeId,
    out: &mut XmlNode,
) -> DocumentResult<()> {
    for child in tree.children(folder) {
        let Some(node) = tree.node(child) else {
            continue;
        };
        match node.kind() {
            NodeKind::Folder => {
                let mut element = XmlNode::new(FOLDER)
                    .with_attr("name", node.name())
                    .with_attr("expanded", flag(node.expanded()));
                write_children(tree, registry, child, &mut element)?;
                out.push(element);
            }
            NodeKind::Connection => match registry.get_by_name(node.name()) {
                Some(record) => out.push(write_record(record)?),
                None => {
                    tracing::warn!(name = node.name(), "Skipping leaf without a record");
                }
            },
        }
    }
    Ok(())
}

fn write_record(record: &ConnectionRecord) -> DocumentResult<XmlNode> {
    let auth = &record.auth;
    let identity = auth
        .identity_file
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_default();

    let history = record.history.iter().fold(XmlNode::new(HISTORY), |node, item| {
        node.with_child(value_element(HISTORY_ITEM, item))
    });

    let o = &record.options;
    let options = XmlNode::new(OPTIONS)
        .with_child(property(OPT_X11, flag(o.x11_forwarding)))
        .with_child(property(OPT_AGENT, flag(o.agent_forwarding)))
        .with_child(property(OPT_STRICT, flag(o.disable_strict_key_checking)))
        .with_child(property(OPT_KEEP_ALIVE, flag(o.keep_alive)))
        .with_child(property(OPT_KEEP_ALIVE_INTERVAL, o.keep_alive_interval.to_string()));

    Ok(XmlNode::new(CONNECTION)
        .with_attr("name", record.name.as_str())
        .with_attr("host", record.host.as_str())
        .with_attr("protocol", record.protocol.as_str())
        .with_attr("port", record.port.to_string())
        .with_attr("ignore-warnings", flag(record.ignore_warnings))
        .with_child(
            XmlNode::new(AUTHENTICATION)
                .with_attr("mode", auth.mode.as_str())
                .with_attr("user", auth.user.as_str())
                .with_attr("password", auth.password.to_stored()?)
                .with_attr("identity-file", identity),
        )
        .with_child(value_element("last-user", &record.last_user))
        .with_child(value_element("user", &record.user))
        .with_child(value_element("password", &record.password.to_stored()?))
        .with_child(value_element("directory", &record.directory))
        .with_child(value_element("note", record.note()))
        .with_child(value_element("upload-dir", &record.upload_dir))
        .with_child(value_element("download-dir", &record.download_dir))
        .with_child(value_element("extra-args", &record.extra_args))
        .with_child(history)
        .with_child(options))
}

// ========== Reader ==========

fn parse_error(message: impl Into<String>) -> DocumentError {
    DocumentError::Parse(message.into())
}

fn tree_error(error: TreeError) -> DocumentError {
    DocumentError::Parse(error.to_string())
}

fn parse_bool(value: Option<&str>, what: &str) -> DocumentResult<bool> {
    match value.map(str::trim).unwrap_or_default() {
        "" | "0" | "false" | "no" => Ok(false),
        "1" | "true" | "yes" => Ok(true),
        other => Err(parse_error(format!("{what}: '{other}' is not a boolean"))),
    }
}

fn parse_number<T: FromStr + Default>(value: Option<&str>, what: &str) -> DocumentResult<T> {
    let text = value.map(str::trim).unwrap_or_default();
    if text.is_empty() {
        return Ok(T::default());
    }
    text.parse()
        .map_err(|_| parse_error(format!("{what}: '{text}' is not a valid number")))
}

/// Text of a `<name value="..."/>` child; falls back to element text
fn child_value<'a>(node: &'a XmlNode, name: &str) -> &'a str {
    node.child(name)
        .map_or("", |c| c.attr("value").unwrap_or(c.value.as_str()))
}

fn stored_credential(text: &str, record: &str, field: &str) -> DocumentResult<Credential> {
    Credential::from_stored(text)
        .map_err(|e| parse_error(format!("connection '{record}', {field}: {e}")))
}

/// Reads the version attribute of a top-level element.
///
/// A missing attribute means the legacy layout.
///
/// # Errors
///
/// Returns `DocumentError::Parse` for a foreign top-level element or a
/// malformed version.
pub fn read_version(root: &XmlNode) -> DocumentResult<u32> {
    if root.name != ROOT_ELEMENT {
        return Err(parse_error(format!(
            "expected <{ROOT_ELEMENT}> but found <{}>",
            root.name
        )));
    }
    let version = match root.attr("version") {
        None => LEGACY_VERSION,
        Some(text) => text
            .trim()
            .parse::<u32>()
            .map_err(|_| parse_error(format!("invalid format version '{text}'")))?,
    };
    if version > FORMAT_VERSION {
        tracing::warn!(version, supported = FORMAT_VERSION, "Document is newer than this build");
    }
    Ok(version)
}

/// Populates an empty tree and registry from a parsed document.
///
/// Returns the format version the document declared.
///
/// # Errors
///
/// Returns `DocumentError::Parse` for structural problems: bad values,
/// duplicate connection names, a folder and a connection sharing a name at
/// one level, full folders, or passwords that do not decrypt.
pub fn read(root: &XmlNode, tree: &mut GroupTree, registry: &mut Registry) -> DocumentResult<u32> {
    let version = read_version(root)?;
    let mut path: Vec<String> = Vec::new();
    read_children(root, &mut path, version, tree, registry)?;
    tracing::debug!(
        version,
        nodes = tree.len(),
        connections = registry.count(),
        "Read document"
    );
    Ok(version)
}

fn read_children(
    parent: &XmlNode,
    path: &mut Vec<String>,
    version: u32,
    tree: &mut GroupTree,
    registry: &mut Registry,
) -> DocumentResult<()> {
    for element in &parent.children {
        match element.name.as_str() {
            FOLDER => {
                let name = element
                    .attr("name")
                    .filter(|n| !n.trim().is_empty())
                    .ok_or_else(|| parse_error(format!("folder without a name under '/{}'", path.join("/"))))?;
                path.push(name.to_string());
                let folder = tree
                    .resolve_segments(path.as_slice(), ResolveMode::Create)
                    .map_err(tree_error)?;
                if !tree.get(folder).map_err(tree_error)?.is_folder() {
                    return Err(parse_error(format!(
                        "'{name}' is both a folder and a connection"
                    )));
                }
                let expanded = parse_bool(element.attr("expanded"), "folder expanded flag")?;
                tree.set_expanded(folder, expanded).map_err(tree_error)?;
                read_children(element, path, version, tree, registry)?;
                path.pop();
            }
            CONNECTION => {
                let record = read_record(element, version)?;
                if registry.contains(&record.name) {
                    return Err(parse_error(format!(
                        "duplicate connection '{}'",
                        record.name
                    )));
                }
                let folder = tree
                    .resolve_segments(path.as_slice(), ResolveMode::Lookup)
                    .map_err(tree_error)?;
                if tree.find_child(folder, &record.name).is_some() {
                    return Err(parse_error(format!(
                        "'{}' is both a folder and a connection",
                        record.name
                    )));
                }
                tree.add_child(folder, NodeKind::Connection, record.name.as_str())
                    .map_err(tree_error)?;
                registry
                    .insert_sorted(record)
                    .map_err(|e| parse_error(e.to_string()))?;
            }
            other => tracing::warn!(element = other, "Ignoring unknown element"),
        }
    }
    Ok(())
}

/// Parses one `<connection>` element into a record
///
/// # Errors
///
/// Returns `DocumentError::Parse` for a missing name, bad numbers or flags,
/// or a password that does not decrypt.
pub fn read_record(element: &XmlNode, version: u32) -> DocumentResult<ConnectionRecord> {
    let name = element.attr_or_empty("name");
    if name.trim().is_empty() {
        return Err(parse_error("connection without a name"));
    }

    let mut record = ConnectionRecord::new(
        name,
        element.attr_or_empty("host"),
        parse_number(element.attr("port"), &format!("connection '{name}' port"))?,
        element.attr_or_empty("protocol"),
    );
    record.ignore_warnings = parse_bool(element.attr("ignore-warnings"), "ignore-warnings")?;

    if let Some(auth) = element.child(AUTHENTICATION) {
        let mode = auth.attr_or_empty("mode");
        if !mode.is_empty() {
            record.auth.mode = AuthMode::from_str(mode)
                .map_err(|e| parse_error(format!("connection '{name}': {e}")))?;
        }
        let identity = auth.attr_or_empty("identity-file");
        if !identity.is_empty() {
            record.auth.identity_file = Some(PathBuf::from(identity));
        }
        if version > LEGACY_VERSION {
            record.auth.user = auth.attr_or_empty("user").to_string();
            record.auth.password =
                stored_credential(auth.attr_or_empty("password"), name, "authentication password")?;
        }
    }
    if version <= LEGACY_VERSION {
        record.auth.user = child_value(element, LEGACY_AUTH_USER).to_string();
        record.auth.password = stored_credential(
            child_value(element, LEGACY_AUTH_PASSWORD),
            name,
            "authentication password",
        )?;
    }

    record.last_user = child_value(element, "last-user").to_string();
    record.user = child_value(element, "user").to_string();
    record.password = stored_credential(child_value(element, "password"), name, "password")?;
    record.directory = child_value(element, "directory").to_string();
    record.set_note(child_value(element, "note"));
    record.upload_dir = child_value(element, "upload-dir").to_string();
    record.download_dir = child_value(element, "download-dir").to_string();
    record.extra_args = child_value(element, "extra-args").to_string();

    if let Some(history) = element.child(HISTORY) {
        record.history = history
            .children
            .iter()
            .filter(|c| c.name == HISTORY_ITEM)
            .map(|c| c.attr("value").unwrap_or(c.value.as_str()).to_string())
            .collect();
    }

    if let Some(options) = element.child(OPTIONS) {
        for prop in options.children.iter().filter(|c| c.name == PROPERTY) {
            let key = prop.attr_or_empty("name");
            let value = prop.attr("value");
            let o = &mut record.options;
            match key {
                OPT_X11 => o.x11_forwarding = parse_bool(value, key)?,
                OPT_AGENT => o.agent_forwarding = parse_bool(value, key)?,
                OPT_STRICT => o.disable_strict_key_checking = parse_bool(value, key)?,
                OPT_KEEP_ALIVE => o.keep_alive = parse_bool(value, key)?,
                OPT_KEEP_ALIVE_INTERVAL => o.keep_alive_interval = parse_number(value, key)?,
                other => tracing::warn!(connection = name, option = other, "Ignoring unknown option"),
            }
        }
    }

    Ok(record)
}
