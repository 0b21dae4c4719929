//! Structural pruning
//!
//! Strips argument values from a canonical tree so that two commands can be
//! compared by structure alone (utilities, flags, operators, substitutions).

use super::tree::Tree;
use super::types::{ArgType, NodeId, NodeKind};

fn is_pruned(kind: &NodeKind) -> bool {
    matches!(kind, NodeKind::Argument { arg_type, .. } if *arg_type != ArgType::ReservedWord)
}

/// Copy of `tree` without Argument nodes, except ReservedWord ones.
///
/// The input is left untouched; siblings of removed nodes are linked to each
/// other in the copy.
pub fn prune(tree: &Tree) -> Tree {
    let mut out = Tree::new();
    let root = out.root();
    for child in tree.children(tree.root()) {
        if let Some(copy) = copy_pruned(tree, *child, &mut out) {
            out.attach(root, copy);
        }
    }
    out
}

fn copy_pruned(src: &Tree, id: NodeId, dest: &mut Tree) -> Option<NodeId> {
    let node = src.node(id);
    if is_pruned(&node.kind) {
        return None;
    }
    let copy = dest.add(node.kind.clone(), node.value.clone());
    for child in node.children() {
        if let Some(child_copy) = copy_pruned(src, *child, dest) {
            dest.attach(copy, child_copy);
        }
    }
    Some(copy)
}
