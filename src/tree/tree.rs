//! Tree arena
//!
//! All nodes of a canonical command tree live in one `Vec`, addressed by
//! [`NodeId`]. Children are owned through the parent's ordered child list;
//! parent and sibling links are plain ids into the same arena, recomputed on
//! every structural edit so they never disagree with the child lists.
//!
//! Detaching a node leaves it in the arena, unreachable from the root. Use
//! [`Tree::deep_clone`] to obtain a compact copy.

use super::types::{NodeId, Node, NodeKind};
use std::fmt;

#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Tree {
    /// An empty tree holding only its Root.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new(NodeKind::Root, "root")],
            root: NodeId(0),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.0].kind
    }

    pub fn value(&self, id: NodeId) -> &str {
        &self.nodes[id.0].value
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn left_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].left
    }

    pub fn right_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].right
    }

    /// Create a detached node.
    pub fn add(&mut self, kind: NodeKind, value: impl Into<String>) -> NodeId {
        self.nodes.push(Node::new(kind, value));
        NodeId(self.nodes.len() - 1)
    }

    pub fn set_value(&mut self, id: NodeId, value: impl Into<String>) {
        self.nodes[id.0].value = value.into();
    }

    // -------------------------------------------------------------------------
    // Structural edits
    // -------------------------------------------------------------------------

    /// Append `child` as the last child of `parent`, detaching it first.
    pub fn attach(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.nodes[parent.0].children.push(child);
        self.relink(parent);
    }

    /// Insert `child` at `index` among the children of `parent`.
    pub fn insert(&mut self, parent: NodeId, index: usize, child: NodeId) {
        self.detach(child);
        let children = &mut self.nodes[parent.0].children;
        let index = index.min(children.len());
        children.insert(index, child);
        self.relink(parent);
    }

    /// Remove `child` from its parent. No-op for a detached node.
    pub fn detach(&mut self, child: NodeId) {
        let Some(parent) = self.nodes[child.0].parent else {
            return;
        };
        self.nodes[parent.0].children.retain(|c| *c != child);
        let node = &mut self.nodes[child.0];
        node.parent = None;
        node.left = None;
        node.right = None;
        self.relink(parent);
    }

    /// Put `new` where `old` sits in its parent; `old` becomes detached.
    pub fn replace(&mut self, old: NodeId, new: NodeId) {
        let Some(parent) = self.nodes[old.0].parent else {
            return;
        };
        if old == new {
            return;
        }
        self.detach(new);
        let children = &mut self.nodes[parent.0].children;
        if let Some(pos) = children.iter().position(|c| *c == old) {
            children[pos] = new;
        }
        let node = &mut self.nodes[old.0];
        node.parent = None;
        node.left = None;
        node.right = None;
        self.relink(parent);
    }

    /// Replace the whole child list of `parent`.
    pub fn set_children(&mut self, parent: NodeId, children: Vec<NodeId>) {
        for old in std::mem::take(&mut self.nodes[parent.0].children) {
            let node = &mut self.nodes[old.0];
            node.parent = None;
            node.left = None;
            node.right = None;
        }
        for child in &children {
            self.detach(*child);
        }
        self.nodes[parent.0].children = children;
        self.relink(parent);
    }

    /// Recompute parent and sibling links of `parent`'s children.
    fn relink(&mut self, parent: NodeId) {
        let children = self.nodes[parent.0].children.clone();
        for (i, child) in children.iter().enumerate() {
            let node = &mut self.nodes[child.0];
            node.parent = Some(parent);
            node.left = if i > 0 { Some(children[i - 1]) } else { None };
            node.right = children.get(i + 1).copied();
        }
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    /// Nearest HeadCommand at or above `id`.
    pub fn head_command_of(&self, id: NodeId) -> Option<NodeId> {
        let mut cursor = Some(id);
        while let Some(cur) = cursor {
            if matches!(self.kind(cur), NodeKind::HeadCommand) {
                return Some(cur);
            }
            cursor = self.parent(cur);
        }
        None
    }

    /// Preorder list of `id` and everything below it.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(cur) = stack.pop() {
            out.push(cur);
            stack.extend(self.children(cur).iter().rev());
        }
        out
    }

    /// Number of nodes reachable from the root, the root included.
    pub fn len(&self) -> usize {
        self.descendants(self.root).len()
    }

    pub fn is_empty(&self) -> bool {
        self.children(self.root).is_empty()
    }

    // -------------------------------------------------------------------------
    // Cloning
    // -------------------------------------------------------------------------

    /// Deep-copy the subtree at `id` into `dest`.
    ///
    /// Kinds (spans included), values and child order are copied; parent and
    /// sibling links are rebased onto the copies. The returned copy of `id`
    /// is detached.
    pub fn clone_subtree_into(&self, id: NodeId, dest: &mut Tree) -> NodeId {
        let src = self.node(id);
        let copy = dest.add(src.kind.clone(), src.value.clone());
        for child in &src.children {
            let child_copy = self.clone_subtree_into(*child, dest);
            dest.attach(copy, child_copy);
        }
        copy
    }

    /// Compact copy containing only the nodes reachable from the root.
    pub fn deep_clone(&self) -> Tree {
        let mut out = Tree::new();
        let root = out.root();
        out.set_value(root, self.value(self.root).to_string());
        for child in self.children(self.root) {
            let copy = self.clone_subtree_into(*child, &mut out);
            out.attach(root, copy);
        }
        out
    }

    // -------------------------------------------------------------------------
    // Comparison
    // -------------------------------------------------------------------------

    /// Compare the subtree at `a` with the subtree at `b` of `other`.
    pub fn same_structure(&self, a: NodeId, other: &Tree, b: NodeId, ignore_arg_type: bool) -> bool {
        let (na, nb) = (self.node(a), other.node(b));
        if !na.kind.same_shape(&nb.kind, ignore_arg_type) {
            return false;
        }
        if !matches!(na.kind, NodeKind::Root) && na.value != nb.value {
            return false;
        }
        na.children.len() == nb.children.len()
            && na
                .children
                .iter()
                .zip(nb.children.iter())
                .all(|(ca, cb)| self.same_structure(*ca, other, *cb, ignore_arg_type))
    }

    /// Structural equality that ignores argument type annotations.
    pub fn eq_ignoring_arg_types(&self, other: &Tree) -> bool {
        self.same_structure(self.root, other, other.root, true)
    }

    /// Check that every reachable node's links agree with the child lists.
    pub fn links_consistent(&self) -> bool {
        self.descendants(self.root).into_iter().all(|id| {
            let children = self.children(id);
            children.iter().enumerate().all(|(i, c)| {
                let node = self.node(*c);
                node.parent == Some(id)
                    && node.left == (if i > 0 { Some(children[i - 1]) } else { None })
                    && node.right == children.get(i + 1).copied()
            })
        })
    }

    fn fmt_node(&self, id: NodeId, depth: usize, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let node = self.node(id);
        let indent = "    ".repeat(depth);
        match &node.kind {
            NodeKind::Root => writeln!(f, "{}Root", indent)?,
            NodeKind::Argument { arg_type, .. } => {
                writeln!(f, "{}Argument({}) <{}>", indent, node.value, arg_type)?
            }
            NodeKind::ProcessSubstitution(dir) => {
                writeln!(f, "{}ProcessSubstitution({})", indent, dir.as_str())?
            }
            kind => writeln!(f, "{}{}({})", indent, kind.name(), node.value)?,
        }
        for child in &node.children {
            self.fmt_node(*child, depth + 1, f)?;
        }
        Ok(())
    }
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Tree {
    fn eq(&self, other: &Self) -> bool {
        self.same_structure(self.root, other, other.root, false)
    }
}

impl fmt::Display for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_node(self.root, 0, f)
    }
}
