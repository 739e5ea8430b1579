//! Property-based tests for positional and symbolic addressing
//!
//! Random add/delete/move/sort sequences are applied to a tree; afterwards
//! every live node must be reachable through both of its paths.

use connbook_core::tree::{GroupTree, NodeId, NodeKind, ResolveMode};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    AddFolder(usize),
    AddLeaf(usize),
    Delete(usize),
    Move(usize, usize),
    Sort(usize),
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => any::<usize>().prop_map(Op::AddFolder),
        4 => any::<usize>().prop_map(Op::AddLeaf),
        2 => any::<usize>().prop_map(Op::Delete),
        1 => (any::<usize>(), any::<usize>()).prop_map(|(a, b)| Op::Move(a, b)),
        1 => any::<usize>().prop_map(Op::Sort),
    ]
}

fn live_nodes(tree: &GroupTree) -> Vec<NodeId> {
    let mut nodes = vec![tree.root()];
    nodes.extend(tree.descendants(tree.root()));
    nodes
}

fn folders(tree: &GroupTree) -> Vec<NodeId> {
    live_nodes(tree)
        .into_iter()
        .filter(|&id| tree.node(id).is_some_and(|n| n.is_folder()))
        .collect()
}

/// Applies operations, giving every node a unique name
fn build_tree(ops: &[Op]) -> GroupTree {
    let mut tree = GroupTree::new();
    for (counter, op) in ops.iter().enumerate() {
        match *op {
            Op::AddFolder(pick) => {
                let parents = folders(&tree);
                let parent = parents[pick % parents.len()];
                let _ = tree.add_child(parent, NodeKind::Folder, format!("folder{counter}"));
            }
            Op::AddLeaf(pick) => {
                let parents = folders(&tree);
                let parent = parents[pick % parents.len()];
                let _ = tree.add_child(parent, NodeKind::Connection, format!("conn{counter}"));
            }
            Op::Delete(pick) => {
                let nodes = tree.descendants(tree.root());
                if nodes.is_empty() {
                    continue;
                }
                let node = nodes[pick % nodes.len()];
                let parent = tree.parent(node).unwrap();
                tree.delete_child(parent, node).unwrap();
            }
            Op::Move(pick, target) => {
                let nodes = tree.descendants(tree.root());
                if nodes.is_empty() {
                    continue;
                }
                let node = nodes[pick % nodes.len()];
                let targets = folders(&tree);
                let target = targets[target % targets.len()];
                let _ = tree.move_node(node, target);
            }
            Op::Sort(pick) => {
                let targets = folders(&tree);
                let folder = targets[pick % targets.len()];
                tree.sort_children(folder, pick % 2 == 0);
            }
        }
    }
    tree
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Positional path and positional resolution are inverses for every
    /// live node, holes included.
    #[test]
    fn prop_positional_path_inverse(ops in prop::collection::vec(arb_op(), 0..60)) {
        let tree = build_tree(&ops);
        for node in live_nodes(&tree) {
            let path = tree.positional_path_of(node).unwrap();
            prop_assert_eq!(tree.resolve_positional(&path).unwrap(), node, "path {}", path);
        }
    }

    /// With unique names per level, symbolic lookup inverts symbolic paths
    #[test]
    fn prop_symbolic_path_inverse(ops in prop::collection::vec(arb_op(), 0..60)) {
        let tree = build_tree(&ops);
        for node in live_nodes(&tree) {
            let path = tree.symbolic_path_of(node).unwrap();
            prop_assert_eq!(tree.lookup_symbolic(&path).unwrap(), node, "path {}", path);
        }
    }

    /// Ordinals of a positional path never exceed the live child count
    #[test]
    fn prop_positional_ordinals_dense(ops in prop::collection::vec(arb_op(), 0..60)) {
        let tree = build_tree(&ops);
        for node in tree.descendants(tree.root()) {
            let parent = tree.parent(node).unwrap();
            let path = tree.positional_path_of(node).unwrap();
            let last: usize = path.rsplit(':').next().unwrap().parse().unwrap();
            prop_assert!(last < tree.get(parent).unwrap().child_count());
        }
    }

    /// Create mode is idempotent: resolving the same path twice yields the
    /// same folder and allocates nothing the second time
    #[test]
    fn prop_create_mode_idempotent(
        segments in prop::collection::vec("[a-z]{1,6}", 1..5),
    ) {
        let mut tree = GroupTree::new();
        let path = segments.join("/");
        let first = tree.resolve_symbolic(&path, ResolveMode::Create).unwrap();
        let size = tree.len();
        let second = tree.resolve_symbolic(&path, ResolveMode::Create).unwrap();
        prop_assert_eq!(first, second);
        prop_assert_eq!(tree.len(), size);
        prop_assert_eq!(tree.symbolic_path_of(first).unwrap(), path);
    }
}
