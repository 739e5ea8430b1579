//! Naming checks run before any add, rename, duplicate or move is committed.
//!
//! Validation only reads the tree and the registry.

use crate::error::{ValidationError, ValidationResult};
use crate::models::ConnectionRecord;
use crate::registry::{Registry, same_name};
use crate::tree::{GroupTree, NodeId};

/// What is being named
#[derive(Debug, Clone, Copy)]
pub enum Subject<'a> {
    /// A folder with the given name
    Folder(&'a str),
    /// A connection; its name is the candidate
    Connection(&'a ConnectionRecord),
}

impl Subject<'_> {
    fn name(&self) -> &str {
        match self {
            Self::Folder(name) => name,
            Self::Connection(record) => &record.name,
        }
    }
}

/// Read-only view over a tree and its registry
#[derive(Debug, Clone, Copy)]
pub struct Validator<'a> {
    tree: &'a GroupTree,
    registry: &'a Registry,
}

impl<'a> Validator<'a> {
    /// Creates a validator
    #[must_use]
    pub const fn new(tree: &'a GroupTree, registry: &'a Registry) -> Self {
        Self { tree, registry }
    }

    /// Checks a candidate name for placement under `parent`.
    ///
    /// * `updating_node` - the tree node being renamed, excluded from the
    ///   sibling check
    /// * `updating_record` - name of the record being edited, excluded from
    ///   the registry check
    ///
    /// # Errors
    ///
    /// * `MissingValue` - empty name, or a connection without host/protocol
    /// * `DuplicateConnection` - another record already has this name
    /// * `DuplicateAtLevel` - a sibling under `parent` has this exact name
    pub fn validate_name(
        &self,
        parent: NodeId,
        updating_node: Option<NodeId>,
        updating_record: Option<&str>,
        subject: Subject<'_>,
    ) -> ValidationResult {
        let name = subject.name();
        if name.trim().is_empty() {
            return Err(ValidationError::MissingValue);
        }

        if let Subject::Connection(record) = subject {
            if !record.has_required_fields() {
                return Err(ValidationError::MissingValue);
            }
            if let Some(existing) = self.registry.get_by_name(name) {
                let is_self =
                    updating_record.is_some_and(|old| same_name(&existing.name, old));
                if !is_self {
                    return Err(ValidationError::DuplicateConnection);
                }
            }
        }

        let clash = self
            .tree
            .children(parent)
            .filter(|&child| Some(child) != updating_node)
            .any(|child| self.tree.name(child) == name);
        if clash {
            return Err(ValidationError::DuplicateAtLevel);
        }

        Ok(())
    }

    /// Shorthand for a folder name
    ///
    /// # Errors
    ///
    /// See [`Self::validate_name`].
    pub fn validate_folder(
        &self,
        parent: NodeId,
        updating_node: Option<NodeId>,
        name: &str,
    ) -> ValidationResult {
        self.validate_name(parent, updating_node, None, Subject::Folder(name))
    }

    /// Shorthand for a connection record
    ///
    /// # Errors
    ///
    /// See [`Self::validate_name`].
    pub fn validate_connection(
        &self,
        parent: NodeId,
        updating_node: Option<NodeId>,
        updating_record: Option<&str>,
        record: &ConnectionRecord,
    ) -> ValidationResult {
        self.validate_name(
            parent,
            updating_node,
            updating_record,
            Subject::Connection(record),
        )
    }
}
