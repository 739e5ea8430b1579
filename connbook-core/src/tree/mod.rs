//! Folder/connection hierarchy
//!
//! The tree is an arena of [`GroupNode`]s addressed by [`NodeId`] handles.
//! Every folder owns a bounded array of child slots; a slot is either empty
//! or holds one child. Deleting a child leaves a hole in its slot so that the
//! remaining siblings keep their slots. Connection leaves carry only a name
//! that refers to a record in the registry.
//!
//! # Tree Structure
//!
//! ```text
//! root
//! ├── [0] Folder "Servers"
//! │   ├── [0] Connection "DB1"
//! │   └── [1] <empty>
//! └── [1] Connection "gateway"
//! ```
//!
//! Handles of deleted nodes are recycled; callers must not keep a [`NodeId`]
//! across a deletion of that node.

mod path;

pub use path::{ResolveMode, SYMBOLIC_SEPARATOR};

use std::cmp::Ordering;

use crate::error::{TreeError, TreeResult};

/// Maximum number of child slots per folder
pub const FOLDER_CAPACITY: usize = 1000;

/// Name of the root folder
pub const ROOT_NAME: &str = "root";

/// Handle of a node inside a [`GroupTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// Kind of a tree node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// A folder holding child slots
    Folder,
    /// A reference, by name, to a connection record
    Connection,
}

/// A folder or connection leaf
#[derive(Debug, Clone)]
pub struct GroupNode {
    kind: NodeKind,
    name: String,
    expanded: bool,
    parent: Option<NodeId>,
    slots: Vec<Option<NodeId>>,
}

impl GroupNode {
    fn new(kind: NodeKind, name: String, parent: Option<NodeId>) -> Self {
        Self {
            kind,
            name,
            expanded: false,
            parent,
            slots: Vec::new(),
        }
    }

    /// Node kind
    #[must_use]
    pub const fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Node name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns true for folders
    #[must_use]
    pub fn is_folder(&self) -> bool {
        self.kind == NodeKind::Folder
    }

    /// Whether the folder was left expanded in the UI
    #[must_use]
    pub const fn expanded(&self) -> bool {
        self.expanded
    }

    /// Parent folder, `None` for the root
    #[must_use]
    pub const fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Number of non-empty child slots
    #[must_use]
    pub fn child_count(&self) -> usize {
        self.slots.iter().flatten().count()
    }
}

/// Compares two names case-insensitively, falling back to byte order so the
/// result is total.
#[must_use]
pub fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Arena-backed folder/connection hierarchy rooted at a folder named `"root"`
#[derive(Debug, Clone)]
pub struct GroupTree {
    nodes: Vec<Option<GroupNode>>,
    free: Vec<usize>,
    root: NodeId,
}

impl Default for GroupTree {
    fn default() -> Self {
        Self::new()
    }
}

impl GroupTree {
    /// Creates a tree holding only the root folder
    #[must_use]
    pub fn new() -> Self {
        let mut root = GroupNode::new(NodeKind::Folder, ROOT_NAME.to_string(), None);
        root.expanded = true;
        Self {
            nodes: vec![Some(root)],
            free: Vec::new(),
            root: NodeId(0),
        }
    }

    /// Drops every node except the root
    pub fn clear(&mut self) {
        *self = Self::new();
    }

    /// Handle of the root folder
    #[must_use]
    pub const fn root(&self) -> NodeId {
        self.root
    }

    /// Returns the node behind a handle, if it is live
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&GroupNode> {
        self.nodes.get(id.0).and_then(Option::as_ref)
    }

    /// Like [`Self::node`] but reports a stale handle as `NotFound`
    ///
    /// # Errors
    ///
    /// Returns `TreeError::NotFound` if the handle is not live.
    pub fn get(&self, id: NodeId) -> TreeResult<&GroupNode> {
        self.node(id)
            .ok_or_else(|| TreeError::NotFound(format!("node #{}", id.0)))
    }

    fn get_mut(&mut self, id: NodeId) -> TreeResult<&mut GroupNode> {
        self.nodes
            .get_mut(id.0)
            .and_then(Option::as_mut)
            .ok_or_else(|| TreeError::NotFound(format!("node #{}", id.0)))
    }

    fn folder(&self, id: NodeId) -> TreeResult<&GroupNode> {
        let node = self.get(id)?;
        if node.is_folder() {
            Ok(node)
        } else {
            Err(TreeError::NotAFolder(node.name.clone()))
        }
    }

    /// Number of live nodes, root included
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len() - self.free.len()
    }

    /// Returns true if the root has no children
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 1
    }

    /// Name of a node, empty for stale handles
    #[must_use]
    pub fn name(&self, id: NodeId) -> &str {
        self.node(id).map_or("", GroupNode::name)
    }

    /// Parent of a node
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(GroupNode::parent)
    }

    /// Iterates over the live children of a folder in slot order
    pub fn children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.node(id)
            .into_iter()
            .flat_map(|node| node.slots.iter().flatten().copied())
    }

    /// Raw slot array of a folder, holes included
    #[must_use]
    pub fn slots(&self, id: NodeId) -> &[Option<NodeId>] {
        self.node(id).map_or(&[], |node| node.slots.as_slice())
    }

    /// Slot index holding `child` inside `parent`
    #[must_use]
    pub fn slot_of(&self, parent: NodeId, child: NodeId) -> Option<usize> {
        self.slots(parent)
            .iter()
            .position(|slot| *slot == Some(child))
    }

    fn free_slot(&self, parent: NodeId) -> TreeResult<usize> {
        let folder = self.folder(parent)?;
        if let Some(index) = folder.slots.iter().position(Option::is_none) {
            return Ok(index);
        }
        if folder.slots.len() < FOLDER_CAPACITY {
            return Ok(folder.slots.len());
        }
        Err(TreeError::CapacityExceeded(folder.name.clone()))
    }

    fn put_in_slot(&mut self, parent: NodeId, slot: usize, child: NodeId) -> TreeResult<()> {
        let folder = self.get_mut(parent)?;
        if slot == folder.slots.len() {
            folder.slots.push(Some(child));
        } else {
            folder.slots[slot] = Some(child);
        }
        Ok(())
    }

    fn allocate(&mut self, node: GroupNode) -> NodeId {
        if let Some(index) = self.free.pop() {
            self.nodes[index] = Some(node);
            NodeId(index)
        } else {
            self.nodes.push(Some(node));
            NodeId(self.nodes.len() - 1)
        }
    }

    /// Adds a child in the first empty slot of `parent`.
    ///
    /// No ordering is applied; call [`Self::sort_children`] afterwards.
    ///
    /// # Errors
    ///
    /// Returns `CapacityExceeded` when every slot is taken, `NotAFolder` if
    /// `parent` is a connection and `NotFound` for a stale handle.
    pub fn add_child(
        &mut self,
        parent: NodeId,
        kind: NodeKind,
        name: impl Into<String>,
    ) -> TreeResult<NodeId> {
        let slot = self.free_slot(parent)?;
        let id = self.allocate(GroupNode::new(kind, name.into(), Some(parent)));
        self.put_in_slot(parent, slot, id)?;
        tracing::trace!(parent = parent.0, slot, node = id.0, "Added tree node");
        Ok(id)
    }

    /// Finds a direct child of `parent` by exact name
    #[must_use]
    pub fn find_child(&self, parent: NodeId, name: &str) -> Option<NodeId> {
        self.children(parent)
            .find(|&child| self.name(child) == name)
    }

    /// Depth-first search of the whole tree (root excluded) by exact name
    #[must_use]
    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.find_in(self.root, name)
    }

    /// Depth-first search below `start` by exact name
    #[must_use]
    pub fn find_in(&self, start: NodeId, name: &str) -> Option<NodeId> {
        for child in self.children(start) {
            if self.name(child) == name {
                return Some(child);
            }
            if let Some(found) = self.find_in(child, name) {
                return Some(found);
            }
        }
        None
    }

    /// Finds the connection leaf with the given name
    #[must_use]
    pub fn find_connection(&self, name: &str) -> Option<NodeId> {
        self.descendants(self.root).into_iter().find(|&id| {
            self.node(id)
                .is_some_and(|n| n.kind == NodeKind::Connection && n.name == name)
        })
    }

    /// Pre-order list of every node below `start`
    #[must_use]
    pub fn descendants(&self, start: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(start).collect();
        stack.reverse();
        while let Some(id) = stack.pop() {
            out.push(id);
            let mut kids: Vec<NodeId> = self.children(id).collect();
            kids.reverse();
            stack.extend(kids);
        }
        out
    }

    /// Names of every connection leaf in the tree
    #[must_use]
    pub fn connection_names(&self) -> Vec<String> {
        self.descendants(self.root)
            .into_iter()
            .filter_map(|id| self.node(id))
            .filter(|n| n.kind == NodeKind::Connection)
            .map(|n| n.name.clone())
            .collect()
    }

    /// Returns true if `ancestor` is `node` or lies on its parent chain
    #[must_use]
    pub fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// Deletes `node` and its whole subtree, leaving a hole in its slot.
    ///
    /// Returns the names of the connection leaves that were removed so the
    /// caller can drop their registry records.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if `node` is not a child of `parent`.
    pub fn delete_child(&mut self, parent: NodeId, node: NodeId) -> TreeResult<Vec<String>> {
        let slot = self.slot_of(parent, node).ok_or_else(|| {
            TreeError::NotFound(format!(
                "'{}' in folder '{}'",
                self.name(node),
                self.name(parent)
            ))
        })?;

        let mut removed = Vec::new();
        self.release_subtree(node, &mut removed);
        self.get_mut(parent)?.slots[slot] = None;
        tracing::debug!(
            parent = parent.0,
            slot,
            connections = removed.len(),
            "Deleted subtree"
        );
        Ok(removed)
    }

    fn release_subtree(&mut self, id: NodeId, removed: &mut Vec<String>) {
        let Some(node) = self.nodes.get_mut(id.0).and_then(Option::take) else {
            return;
        };
        for child in node.slots.into_iter().flatten() {
            self.release_subtree(child, removed);
        }
        if node.kind == NodeKind::Connection {
            removed.push(node.name);
        }
        self.free.push(id.0);
    }

    /// Moves `node` into the first empty slot of `new_parent`.
    ///
    /// The tree is left untouched when the move fails.
    ///
    /// # Errors
    ///
    /// Returns `CapacityExceeded` when `new_parent` is full and `CyclicMove`
    /// when `new_parent` lies inside the subtree of `node`.
    pub fn move_node(&mut self, node: NodeId, new_parent: NodeId) -> TreeResult<()> {
        if self.is_ancestor(node, new_parent) {
            return Err(TreeError::CyclicMove(self.name(node).to_string()));
        }
        let old_parent = self
            .parent(node)
            .ok_or_else(|| TreeError::NotFound(format!("parent of node #{}", node.0)))?;
        if old_parent == new_parent {
            return Ok(());
        }

        let new_slot = self.free_slot(new_parent)?;
        let old_slot = self.slot_of(old_parent, node).ok_or_else(|| {
            TreeError::NotFound(format!("'{}' in its parent", self.name(node)))
        })?;

        self.get_mut(old_parent)?.slots[old_slot] = None;
        self.put_in_slot(new_parent, new_slot, node)?;
        self.get_mut(node)?.parent = Some(new_parent);
        tracing::debug!(node = node.0, from = old_parent.0, to = new_parent.0, "Moved node");
        Ok(())
    }

    /// Sorts the children of a folder by case-insensitive name.
    ///
    /// Live children are packed into the leading slots; holes disappear.
    /// With `recursive`, every folder below is sorted as well.
    pub fn sort_children(&mut self, id: NodeId, recursive: bool) {
        let mut children: Vec<NodeId> = self.children(id).collect();
        children.sort_by(|&a, &b| compare_names(self.name(a), self.name(b)));

        if let Ok(folder) = self.get_mut(id) {
            folder.slots = children.iter().copied().map(Some).collect();
        }

        if recursive {
            for child in children {
                if self.node(child).is_some_and(GroupNode::is_folder) {
                    self.sort_children(child, true);
                }
            }
        }
    }

    /// Renames a node
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for a stale handle.
    pub fn rename(&mut self, id: NodeId, name: impl Into<String>) -> TreeResult<()> {
        self.get_mut(id)?.name = name.into();
        Ok(())
    }

    /// Records whether a folder is expanded
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for a stale handle.
    pub fn set_expanded(&mut self, id: NodeId, expanded: bool) -> TreeResult<()> {
        self.get_mut(id)?.expanded = expanded;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree_with_abc() -> (GroupTree, NodeId, NodeId, NodeId) {
        let mut tree = GroupTree::new();
        let root = tree.root();
        let a = tree.add_child(root, NodeKind::Connection, "A").unwrap();
        let b = tree.add_child(root, NodeKind::Connection, "B").unwrap();
        let c = tree.add_child(root, NodeKind::Connection, "C").unwrap();
        (tree, a, b, c)
    }

    #[test]
    fn test_new_tree_has_root_only() {
        let tree = GroupTree::new();
        assert_eq!(tree.len(), 1);
        assert!(tree.is_empty());
        assert_eq!(tree.name(tree.root()), ROOT_NAME);
        assert_eq!(tree.parent(tree.root()), None);
    }

    #[test]
    fn test_add_child_sets_parent() {
        let mut tree = GroupTree::new();
        let root = tree.root();
        let folder = tree.add_child(root, NodeKind::Folder, "Servers").unwrap();
        let leaf = tree.add_child(folder, NodeKind::Connection, "DB1").unwrap();
        assert_eq!(tree.parent(leaf), Some(folder));
        assert_eq!(tree.parent(folder), Some(root));
        assert_eq!(tree.find_child(folder, "DB1"), Some(leaf));
        assert_eq!(tree.find_child(root, "DB1"), None);
        assert_eq!(tree.find("DB1"), Some(leaf));
    }

    #[test]
    fn test_add_child_to_connection_fails() {
        let (mut tree, a, _, _) = tree_with_abc();
        assert_eq!(
            tree.add_child(a, NodeKind::Connection, "x"),
            Err(TreeError::NotAFolder("A".to_string()))
        );
    }

    #[test]
    fn test_delete_leaves_hole_and_reuses_it() {
        let (mut tree, _, b, c) = tree_with_abc();
        let root = tree.root();
        let removed = tree.delete_child(root, b).unwrap();
        assert_eq!(removed, vec!["B".to_string()]);
        assert_eq!(tree.slots(root).len(), 3);
        assert_eq!(tree.slots(root)[1], None);
        assert_eq!(tree.slot_of(root, c), Some(2));

        let d = tree.add_child(root, NodeKind::Connection, "D").unwrap();
        assert_eq!(tree.slot_of(root, d), Some(1));
    }

    #[test]
    fn test_delete_folder_collects_connections() {
        let mut tree = GroupTree::new();
        let root = tree.root();
        let f = tree.add_child(root, NodeKind::Folder, "F").unwrap();
        let g = tree.add_child(f, NodeKind::Folder, "G").unwrap();
        tree.add_child(f, NodeKind::Connection, "one").unwrap();
        tree.add_child(g, NodeKind::Connection, "two").unwrap();

        let mut removed = tree.delete_child(root, f).unwrap();
        removed.sort();
        assert_eq!(removed, vec!["one".to_string(), "two".to_string()]);
        assert!(tree.is_empty());
        assert!(tree.node(g).is_none());
    }

    #[test]
    fn test_delete_wrong_parent() {
        let mut tree = GroupTree::new();
        let root = tree.root();
        let f = tree.add_child(root, NodeKind::Folder, "F").unwrap();
        let x = tree.add_child(root, NodeKind::Connection, "x").unwrap();
        assert!(matches!(
            tree.delete_child(f, x),
            Err(TreeError::NotFound(_))
        ));
        assert!(tree.node(x).is_some());
    }

    #[test]
    fn test_capacity_exceeded() {
        let mut tree = GroupTree::new();
        let root = tree.root();
        for i in 0..FOLDER_CAPACITY {
            tree.add_child(root, NodeKind::Connection, format!("c{i}"))
                .unwrap();
        }
        assert_eq!(
            tree.add_child(root, NodeKind::Connection, "overflow"),
            Err(TreeError::CapacityExceeded(ROOT_NAME.to_string()))
        );
    }

    #[test]
    fn test_move_node() {
        let (mut tree, a, _, _) = tree_with_abc();
        let root = tree.root();
        let f = tree.add_child(root, NodeKind::Folder, "F").unwrap();
        tree.move_node(a, f).unwrap();
        assert_eq!(tree.parent(a), Some(f));
        assert_eq!(tree.slots(root)[0], None);
        assert_eq!(tree.children(f).collect::<Vec<_>>(), vec![a]);
    }

    #[test]
    fn test_move_into_own_subtree_rejected() {
        let mut tree = GroupTree::new();
        let root = tree.root();
        let f = tree.add_child(root, NodeKind::Folder, "F").unwrap();
        let g = tree.add_child(f, NodeKind::Folder, "G").unwrap();
        assert!(matches!(tree.move_node(f, g), Err(TreeError::CyclicMove(_))));
        assert!(matches!(tree.move_node(f, f), Err(TreeError::CyclicMove(_))));
        assert_eq!(tree.parent(g), Some(f));
    }

    #[test]
    fn test_move_into_full_folder_is_noop() {
        let mut tree = GroupTree::new();
        let root = tree.root();
        let full = tree.add_child(root, NodeKind::Folder, "full").unwrap();
        for i in 0..FOLDER_CAPACITY {
            tree.add_child(full, NodeKind::Connection, format!("c{i}"))
                .unwrap();
        }
        let x = tree.add_child(root, NodeKind::Connection, "x").unwrap();
        assert!(tree.move_node(x, full).is_err());
        assert_eq!(tree.parent(x), Some(root));
        assert!(tree.slot_of(root, x).is_some());
    }

    #[test]
    fn test_sort_children_case_insensitive_and_compacts() {
        let mut tree = GroupTree::new();
        let root = tree.root();
        let z = tree.add_child(root, NodeKind::Connection, "zeta").unwrap();
        let hole = tree.add_child(root, NodeKind::Connection, "gone").unwrap();
        let a = tree.add_child(root, NodeKind::Connection, "Alpha").unwrap();
        let f = tree.add_child(root, NodeKind::Folder, "beta").unwrap();
        let inner_b = tree.add_child(f, NodeKind::Connection, "b").unwrap();
        let inner_a = tree.add_child(f, NodeKind::Connection, "A").unwrap();
        tree.delete_child(root, hole).unwrap();

        tree.sort_children(root, false);
        assert_eq!(tree.slots(root), &[Some(a), Some(f), Some(z)]);
        assert_eq!(tree.children(f).collect::<Vec<_>>(), vec![inner_b, inner_a]);

        tree.sort_children(root, true);
        assert_eq!(tree.children(f).collect::<Vec<_>>(), vec![inner_a, inner_b]);
    }

    #[test]
    fn test_descendants_preorder() {
        let mut tree = GroupTree::new();
        let root = tree.root();
        let f = tree.add_child(root, NodeKind::Folder, "F").unwrap();
        let x = tree.add_child(f, NodeKind::Connection, "x").unwrap();
        let y = tree.add_child(root, NodeKind::Connection, "y").unwrap();
        assert_eq!(tree.descendants(root), vec![f, x, y]);
        assert_eq!(tree.connection_names(), vec!["x".to_string(), "y".to_string()]);
        assert_eq!(tree.find_connection("y"), Some(y));
        assert_eq!(tree.find_connection("F"), None);
    }
}
