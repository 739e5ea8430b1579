//! Document: the tree and the registry owned together
//!
//! A [`Document`] is the unit of persistence and of mutation. Every mutating
//! operation runs the [`Validator`] first and commits to both structures only
//! on success, so a failed call leaves the document untouched.
//!
//! Bulk repopulation (`reload`, `replace_with`, merges) happens under a
//! [`RebuildGuard`]: per-item notifications are suppressed and listeners see a
//! single [`DocumentEvent::Rebuilt`] afterwards.

pub mod codec;
mod events;
pub mod xml;

pub use codec::{FORMAT_VERSION, LEGACY_VERSION};
pub use events::{DocumentEvent, RebuildGuard, SubscriptionId};

use std::path::Path;

use crate::error::{
    ConnBookError, ConnBookResult, DocumentError, DocumentResult, TreeError, ValidationError,
};
use crate::models::{ConnectionRecord, ProtocolCatalog};
use crate::registry::{Registry, name_key, same_name};
use crate::tracing::span_names;
use crate::tree::{GroupTree, NodeId, NodeKind, ResolveMode, SYMBOLIC_SEPARATOR};
use crate::validator::Validator;

use events::Listeners;

/// Mismatches between tree leaves and registry records
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsistencyReport {
    /// Records with no leaf in the tree
    pub orphan_records: Vec<String>,
    /// Leaves whose record is missing
    pub dangling_leaves: Vec<String>,
    /// Connection names that appear on more than one leaf
    pub duplicate_leaves: Vec<String>,
}

impl ConsistencyReport {
    /// Returns true if tree and registry agree
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.orphan_records.is_empty()
            && self.dangling_leaves.is_empty()
            && self.duplicate_leaves.is_empty()
    }
}

/// Outcome of [`Document::merge`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// Names of the added connections, as stored
    pub added: Vec<String>,
    /// `(incoming, stored)` name pairs of renamed connections
    pub renamed: Vec<(String, String)>,
    /// Incoming connections dropped for a missing host or protocol
    pub skipped: Vec<String>,
}

/// Group tree plus connection registry
#[derive(Debug, Default)]
pub struct Document {
    tree: GroupTree,
    registry: Registry,
    version: u32,
    rebuilding: bool,
    listeners: Listeners,
}

impl Document {
    /// Creates an empty document
    #[must_use]
    pub fn new() -> Self {
        Self {
            version: FORMAT_VERSION,
            ..Self::default()
        }
    }

    /// Loads a document from disk
    ///
    /// # Errors
    ///
    /// Returns `DocumentError::Io` if the file cannot be read and
    /// `DocumentError::Parse` if it is malformed.
    pub fn load(path: &Path) -> DocumentResult<Self> {
        let _span = tracing::info_span!(span_names::DOCUMENT_LOAD, path = %path.display()).entered();
        let content = std::fs::read_to_string(path)
            .map_err(|e| DocumentError::Io(format!("{}: {e}", path.display())))?;
        let document = Self::parse(&content)?;
        tracing::info!(
            path = %path.display(),
            connections = document.registry.count(),
            "Loaded document"
        );
        Ok(document)
    }

    /// Parses a document from text
    ///
    /// # Errors
    ///
    /// Returns `DocumentError::Parse` if the text is malformed.
    pub fn parse(content: &str) -> DocumentResult<Self> {
        let root = xml::parse(content)?;
        let mut document = Self::new();
        document.version = codec::read(&root, &mut document.tree, &mut document.registry)?;
        Ok(document)
    }

    /// Renders the document as text
    ///
    /// # Errors
    ///
    /// Returns `DocumentError::Credential` if a password cannot be sealed.
    pub fn render(&self) -> DocumentResult<String> {
        Ok(xml::render(&codec::write(&self.tree, &self.registry)?))
    }

    /// Saves the document, replacing `path` atomically
    ///
    /// The text is written to a sibling temporary file which is then renamed
    /// over the target.
    ///
    /// # Errors
    ///
    /// Returns `DocumentError::Io` if the file cannot be written.
    pub fn save(&self, path: &Path) -> DocumentResult<()> {
        let _span = tracing::info_span!(span_names::DOCUMENT_SAVE, path = %path.display()).entered();
        let content = self.render()?;
        let io_error = |e: std::io::Error| DocumentError::Io(format!("{}: {e}", path.display()));

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(io_error)?;
        }
        let file_name = path
            .file_name()
            .ok_or_else(|| DocumentError::Io(format!("{}: not a file path", path.display())))?;
        let mut temp_name = std::ffi::OsString::from(".");
        temp_name.push(file_name);
        temp_name.push(".tmp");
        let temp = path.with_file_name(temp_name);

        std::fs::write(&temp, content).map_err(io_error)?;
        if let Err(e) = std::fs::rename(&temp, path) {
            let _ = std::fs::remove_file(&temp);
            return Err(io_error(e));
        }
        tracing::info!(
            path = %path.display(),
            connections = self.registry.count(),
            "Saved document"
        );
        Ok(())
    }

    /// Format version the document was read with
    #[must_use]
    pub const fn version(&self) -> u32 {
        self.version
    }

    /// The folder hierarchy
    #[must_use]
    pub const fn tree(&self) -> &GroupTree {
        &self.tree
    }

    /// The connection records
    #[must_use]
    pub const fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Returns true if the document has no folders or connections
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty() && self.registry.is_empty()
    }

    // ========== Notifications ==========

    /// Registers a change listener
    pub fn subscribe(&mut self, listener: impl FnMut(&DocumentEvent) + 'static) -> SubscriptionId {
        self.listeners.add(Box::new(listener))
    }

    /// Removes a listener; returns false if it was not registered
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.listeners.remove(id)
    }

    /// Returns true while a [`RebuildGuard`] is held
    #[must_use]
    pub const fn is_rebuilding(&self) -> bool {
        self.rebuilding
    }

    fn emit(&mut self, event: DocumentEvent) {
        if self.rebuilding {
            tracing::trace!(?event, "Suppressed during rebuild");
            return;
        }
        self.listeners.emit(&event);
    }

    /// Starts a bulk repopulation
    ///
    /// # Errors
    ///
    /// Returns `DocumentError::RebuildInProgress` if a guard is already held.
    pub fn begin_rebuild(&mut self) -> DocumentResult<RebuildGuard<'_>> {
        if self.rebuilding {
            tracing::warn!("Refusing nested rebuild");
            return Err(DocumentError::RebuildInProgress);
        }
        Ok(RebuildGuard::new(self))
    }

    /// Replaces the contents with another document, keeping listeners
    ///
    /// # Errors
    ///
    /// Returns `DocumentError::RebuildInProgress` during another rebuild.
    pub fn replace_with(&mut self, other: Self) -> DocumentResult<()> {
        let mut guard = self.begin_rebuild()?;
        guard.tree = other.tree;
        guard.registry = other.registry;
        guard.version = other.version;
        Ok(())
    }

    /// Runs `apply` under a [`RebuildGuard`].
    ///
    /// If `apply` fails, tree and registry are restored to their state before
    /// the call.
    ///
    /// # Errors
    ///
    /// Returns `RebuildInProgress`, or the error of `apply`.
    pub fn rebuild_atomic<T>(
        &mut self,
        apply: impl FnOnce(&mut Self) -> ConnBookResult<T>,
    ) -> ConnBookResult<T> {
        let mut guard = self.begin_rebuild()?;
        let tree = guard.tree.clone();
        let registry = guard.registry.clone();
        let result = apply(&mut *guard);
        if let Err(e) = &result {
            tracing::debug!(error = %e, "Rolling back bulk rebuild");
            guard.tree = tree;
            guard.registry = registry;
        }
        result
    }

    /// Re-reads the document from disk.
    ///
    /// On error the current contents are kept.
    ///
    /// # Errors
    ///
    /// Returns `RebuildInProgress`, `Io` or `Parse`.
    pub fn reload(&mut self, path: &Path) -> DocumentResult<()> {
        if self.rebuilding {
            return Err(DocumentError::RebuildInProgress);
        }
        let fresh = Self::load(path)?;
        self.replace_with(fresh)
    }

    /// Empties the document
    ///
    /// # Errors
    ///
    /// Returns `DocumentError::RebuildInProgress` during another rebuild.
    pub fn clear(&mut self) -> DocumentResult<()> {
        let mut guard = self.begin_rebuild()?;
        guard.tree.clear();
        guard.registry.clear();
        Ok(())
    }

    // ========== Lookups ==========

    /// Symbolic path of a node; the root yields `""`
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for a stale handle.
    pub fn symbolic_path_of(&self, node: NodeId) -> ConnBookResult<String> {
        Ok(self.tree.symbolic_path_of(node)?)
    }

    /// Positional path of a node; the root yields `""`
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for a stale handle.
    pub fn positional_path_of(&self, node: NodeId) -> ConnBookResult<String> {
        Ok(self.tree.positional_path_of(node)?)
    }

    /// Resolves a positional path
    ///
    /// # Errors
    ///
    /// Returns `InvalidPath` or `NotFound`.
    pub fn resolve_positional(&self, path: &str) -> ConnBookResult<NodeId> {
        Ok(self.tree.resolve_positional(path)?)
    }

    /// Resolves an existing symbolic path
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if a segment is missing.
    pub fn resolve_symbolic(&self, path: &str) -> ConnBookResult<NodeId> {
        Ok(self.tree.lookup_symbolic(path)?)
    }

    /// Resolves a folder path, creating missing folders
    ///
    /// # Errors
    ///
    /// Returns `MissingValue` for a blank segment, `NotAFolder` if the path
    /// runs through a connection and `CapacityExceeded` if a folder is full.
    /// Nothing is created when validation fails.
    pub fn ensure_folder(&mut self, path: &str) -> ConnBookResult<NodeId> {
        let segments: Vec<&str> = path
            .split(SYMBOLIC_SEPARATOR)
            .filter(|s| !s.is_empty())
            .collect();
        if segments.iter().any(|s| s.trim().is_empty()) {
            return Err(ValidationError::MissingValue.into());
        }

        let validator = Validator::new(&self.tree, &self.registry);
        let mut current = self.tree.root();
        for segment in &segments {
            match self.tree.find_child(current, segment) {
                Some(child) => {
                    self.require_folder(child)?;
                    current = child;
                }
                None => {
                    validator.validate_folder(current, None, segment)?;
                    break;
                }
            }
        }

        let before = self.tree.len();
        let folder = self.tree.resolve_segments(&segments, ResolveMode::Create)?;
        self.require_folder(folder)?;
        if self.tree.len() != before {
            let path = self.tree.symbolic_path_of(folder)?;
            self.emit(DocumentEvent::FolderAdded { path });
        }
        Ok(folder)
    }

    /// Tree leaf of a connection, looked up case-insensitively
    #[must_use]
    pub fn connection_node(&self, name: &str) -> Option<NodeId> {
        let record = self.registry.get_by_name(name)?;
        self.tree.find_connection(&record.name)
    }

    /// Record behind a connection leaf
    #[must_use]
    pub fn record_of(&self, node: NodeId) -> Option<&ConnectionRecord> {
        let node = self.tree.node(node)?;
        if node.kind() != NodeKind::Connection {
            return None;
        }
        self.registry.get_by_name(node.name())
    }

    /// Records whose name, host or user contains `query`, ignoring case
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<&ConnectionRecord> {
        let query = query.to_lowercase();
        self.registry
            .iter()
            .filter(|r| {
                r.name.to_lowercase().contains(&query)
                    || r.host.to_lowercase().contains(&query)
                    || r.user.to_lowercase().contains(&query)
                    || r.auth.user.to_lowercase().contains(&query)
            })
            .collect()
    }

    /// Compares tree leaves against registry records
    #[must_use]
    pub fn consistency_check(&self) -> ConsistencyReport {
        let mut report = ConsistencyReport::default();
        let mut leaves = self.tree.connection_names();

        for name in &leaves {
            if !self.registry.contains(name) {
                report.dangling_leaves.push(name.clone());
            }
        }
        for record in &self.registry {
            if !leaves.iter().any(|leaf| leaf == &record.name) {
                report.orphan_records.push(record.name.clone());
            }
        }

        leaves.sort_by_key(|name| name_key(name));
        for pair in leaves.windows(2) {
            if same_name(&pair[0], &pair[1])
                && !report
                    .duplicate_leaves
                    .iter()
                    .any(|d| same_name(d, &pair[1]))
            {
                report.duplicate_leaves.push(pair[1].clone());
            }
        }

        if !report.is_consistent() {
            tracing::warn!(?report, "Tree and registry disagree");
        }
        report
    }

    /// Recomputes derived warnings against a protocol catalog
    pub fn recompute_warnings(&mut self, catalog: &dyn ProtocolCatalog) {
        self.registry.recompute_warnings(catalog);
    }

    // ========== Mutations ==========

    fn require_folder(&self, node: NodeId) -> ConnBookResult<()> {
        if self.tree.get(node)?.is_folder() {
            Ok(())
        } else {
            Err(TreeError::NotAFolder(self.tree.name(node).to_string()).into())
        }
    }

    fn require_connection(&self, node: NodeId) -> ConnBookResult<String> {
        let n = self.tree.get(node)?;
        if n.kind() == NodeKind::Connection {
            Ok(n.name().to_string())
        } else {
            Err(TreeError::NotFound(format!("connection at folder '{}'", n.name())).into())
        }
    }

    fn parent_of(&self, node: NodeId) -> ConnBookResult<NodeId> {
        self.tree
            .get(node)?
            .parent()
            .ok_or_else(|| TreeError::NotFound("parent of the root folder".to_string()).into())
    }

    /// Creates a folder under `parent`
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty or clashing name, and tree
    /// errors for a bad parent or a full folder.
    pub fn add_folder(&mut self, parent: NodeId, name: &str) -> ConnBookResult<NodeId> {
        self.require_folder(parent)?;
        Validator::new(&self.tree, &self.registry).validate_folder(parent, None, name)?;
        let folder = self.tree.add_child(parent, NodeKind::Folder, name)?;
        let path = self.tree.symbolic_path_of(folder)?;
        tracing::debug!(%path, "Added folder");
        self.emit(DocumentEvent::FolderAdded { path });
        Ok(folder)
    }

    /// Adds a connection record with a leaf under `parent`
    ///
    /// # Errors
    ///
    /// Returns a validation error or a tree error; nothing is committed then.
    pub fn add_connection(
        &mut self,
        parent: NodeId,
        record: ConnectionRecord,
    ) -> ConnBookResult<NodeId> {
        self.require_folder(parent)?;
        Validator::new(&self.tree, &self.registry).validate_connection(parent, None, None, &record)?;

        let name = record.name.clone();
        self.registry.insert_sorted(record)?;
        let leaf = match self.tree.add_child(parent, NodeKind::Connection, name.as_str()) {
            Ok(leaf) => leaf,
            Err(e) => {
                self.registry.remove_by_name(&name);
                return Err(e.into());
            }
        };
        tracing::debug!(%name, "Added connection");
        self.emit(DocumentEvent::ConnectionAdded { name });
        Ok(leaf)
    }

    /// Replaces the record behind a leaf with an edited copy.
    ///
    /// The leaf is renamed when the record name changes.
    ///
    /// # Errors
    ///
    /// Returns a validation error, or `NotFound` if `node` is not a
    /// connection leaf.
    pub fn edit_connection(&mut self, node: NodeId, record: ConnectionRecord) -> ConnBookResult<()> {
        let old_name = self.require_connection(node)?;
        let parent = self.parent_of(node)?;
        Validator::new(&self.tree, &self.registry).validate_connection(
            parent,
            Some(node),
            Some(&old_name),
            &record,
        )?;

        let name = record.name.clone();
        self.registry.replace(&old_name, record)?;
        if name != old_name {
            self.tree.rename(node, name.as_str())?;
        }
        tracing::debug!(%old_name, %name, "Edited connection");
        self.emit(DocumentEvent::ConnectionUpdated { old_name, name });
        Ok(())
    }

    /// Renames a folder
    ///
    /// # Errors
    ///
    /// Returns a validation error, or a tree error for the root or a leaf.
    pub fn rename_folder(&mut self, node: NodeId, name: &str) -> ConnBookResult<()> {
        self.require_folder(node)?;
        let parent = self.parent_of(node)?;
        Validator::new(&self.tree, &self.registry).validate_folder(parent, Some(node), name)?;
        let old_path = self.tree.symbolic_path_of(node)?;
        self.tree.rename(node, name)?;
        let path = self.tree.symbolic_path_of(node)?;
        self.emit(DocumentEvent::FolderRenamed { old_path, path });
        Ok(())
    }

    /// First name of the form `"<name> (copy)"`, `"<name> (copy 2)"`, ...
    /// that is free in the registry and among the children of `folder`
    #[must_use]
    pub fn unique_copy_name(&self, name: &str, folder: NodeId) -> String {
        let mut candidate = format!("{name} (copy)");
        let mut counter = 2;
        while self.registry.contains(&candidate) || self.tree.find_child(folder, &candidate).is_some()
        {
            candidate = format!("{name} (copy {counter})");
            counter += 1;
        }
        candidate
    }

    /// Copies a connection under a fresh name into the same folder
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if `node` is not a connection leaf, or whatever
    /// [`Self::add_connection`] reports.
    pub fn duplicate_connection(&mut self, node: NodeId) -> ConnBookResult<NodeId> {
        let name = self.require_connection(node)?;
        let parent = self.parent_of(node)?;
        let mut copy = self
            .registry
            .get_by_name(&name)
            .cloned()
            .ok_or_else(|| TreeError::NotFound(format!("record '{name}'")))?;
        copy.name = self.unique_copy_name(&name, parent);
        self.add_connection(parent, copy)
    }

    /// Deletes a node with its subtree and the records of every leaf in it.
    ///
    /// Returns the names of the removed records.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for the root or a stale handle.
    pub fn delete_node(&mut self, node: NodeId) -> ConnBookResult<Vec<String>> {
        let parent = self.parent_of(node)?;
        let path = self.tree.symbolic_path_of(node)?;
        let removed = self.tree.delete_child(parent, node)?;
        for name in &removed {
            if self.registry.remove_by_name(name).is_none() {
                tracing::warn!(%name, "Deleted leaf had no record");
            }
        }
        tracing::debug!(%path, connections = removed.len(), "Deleted node");
        self.emit(DocumentEvent::NodeDeleted {
            path,
            connections: removed.clone(),
        });
        Ok(removed)
    }

    /// Moves a node into another folder
    ///
    /// # Errors
    ///
    /// Returns `DuplicateAtLevel` if the destination already has a child of
    /// that name, `CyclicMove` for a move into the node's own subtree and
    /// `CapacityExceeded` if the destination is full.
    pub fn move_node(&mut self, node: NodeId, new_parent: NodeId) -> ConnBookResult<()> {
        let old_parent = self.parent_of(node)?;
        self.require_folder(new_parent)?;
        if self.tree.is_ancestor(node, new_parent) {
            return Err(TreeError::CyclicMove(self.tree.name(node).to_string()).into());
        }
        if old_parent == new_parent {
            return Ok(());
        }

        let validator = Validator::new(&self.tree, &self.registry);
        let name = self.tree.name(node);
        match self.record_of(node) {
            Some(record) => {
                validator.validate_connection(new_parent, Some(node), Some(name), record)?;
            }
            None => validator.validate_folder(new_parent, Some(node), name)?,
        }

        let from = self.tree.symbolic_path_of(node)?;
        self.tree.move_node(node, new_parent)?;
        let to = self.tree.symbolic_path_of(node)?;
        tracing::debug!(%from, %to, "Moved node");
        self.emit(DocumentEvent::NodeMoved { from, to });
        Ok(())
    }

    /// Sorts the children of a folder by name
    ///
    /// # Errors
    ///
    /// Returns a tree error if `folder` is not a folder.
    pub fn sort(&mut self, folder: NodeId, recursive: bool) -> ConnBookResult<()> {
        self.require_folder(folder)?;
        self.tree.sort_children(folder, recursive);
        let path = self.tree.symbolic_path_of(folder)?;
        self.emit(DocumentEvent::Sorted { path });
        Ok(())
    }

    /// Records a directory in a connection's MRU history
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no record has this name.
    pub fn add_history_directory(&mut self, name: &str, directory: &str) -> ConnBookResult<()> {
        let record = self
            .registry
            .get_by_name_mut(name)
            .ok_or_else(|| TreeError::NotFound(format!("connection '{name}'")))?;
        record.history.add_directory(directory);
        let name = record.name.clone();
        self.emit(DocumentEvent::ConnectionUpdated {
            old_name: name.clone(),
            name,
        });
        Ok(())
    }

    /// Grafts every folder and connection of `other` under `target`.
    ///
    /// Connections whose name is already taken are renamed with
    /// [`Self::unique_copy_name`]; incomplete ones are skipped. The merge is
    /// all or nothing: on error the document is left as it was.
    ///
    /// # Errors
    ///
    /// Returns `RebuildInProgress`, `NotAFolder` if an incoming folder meets a
    /// connection of the same name, or `CapacityExceeded` if a folder runs
    /// out of slots.
    pub fn merge(&mut self, other: &Self, target: NodeId) -> ConnBookResult<MergeReport> {
        self.require_folder(target)?;
        let _span = tracing::info_span!(span_names::DOCUMENT_MERGE, incoming = other.registry.count()).entered();
        let report = self.rebuild_atomic(|document| {
            let mut report = MergeReport::default();
            document.graft(other, other.tree.root(), target, &mut report)?;
            Ok(report)
        })?;
        tracing::info!(
            added = report.added.len(),
            renamed = report.renamed.len(),
            skipped = report.skipped.len(),
            "Merged document"
        );
        Ok(report)
    }

    fn graft(
        &mut self,
        other: &Self,
        from: NodeId,
        into: NodeId,
        report: &mut MergeReport,
    ) -> ConnBookResult<()> {
        for child in other.tree.children(from) {
            let Some(node) = other.tree.node(child) else {
                continue;
            };
            if node.is_folder() {
                let folder = match self.tree.find_child(into, node.name()) {
                    Some(existing) if self.tree.get(existing)?.is_folder() => existing,
                    Some(_) => {
                        return Err(TreeError::NotAFolder(node.name().to_string()).into());
                    }
                    None => self.tree.add_child(into, NodeKind::Folder, node.name())?,
                };
                self.tree.set_expanded(folder, node.expanded())?;
                self.graft(other, child, folder, report)?;
                continue;
            }

            let Some(record) = other.registry.get_by_name(node.name()) else {
                continue;
            };
            let mut record = record.clone();
            let incoming = record.name.clone();
            let taken = self.registry.contains(&incoming)
                || self.tree.find_child(into, &incoming).is_some();
            if taken {
                record.name = self.unique_copy_name(&incoming, into);
            }
            let stored = record.name.clone();
            match self.add_connection(into, record) {
                Ok(_) => {
                    if stored != incoming {
                        report.renamed.push((incoming, stored.clone()));
                    }
                    report.added.push(stored);
                }
                Err(ConnBookError::Validation(ValidationError::MissingValue)) => {
                    tracing::warn!(name = %incoming, "Skipping incomplete connection");
                    report.skipped.push(incoming);
                }
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }
}
