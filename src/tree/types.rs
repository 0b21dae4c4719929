//! Canonical Tree Types
//!
//! Node kinds, semantic argument types and operator associativity of the
//! normalized command tree.

use crate::ast::types::Span;
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// ARGUMENT TYPES
// =============================================================================

/// Semantic classification of an argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArgType {
    Number,
    Size,
    Time,
    Permission,
    Pattern,
    File,
    Utility,
    ReservedWord,
    Unknown,
}

impl ArgType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Number => "Number",
            Self::Size => "Size",
            Self::Time => "Time",
            Self::Permission => "Permission",
            Self::Pattern => "Pattern",
            Self::File => "File",
            Self::Utility => "Utility",
            Self::ReservedWord => "ReservedWord",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for ArgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// OPERATORS
// =============================================================================

/// Which sibling a unary logic operator adopts as its operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Associativity {
    /// Postfix: adopts the left sibling (`-prune`)
    Left,
    /// Prefix: adopts the right sibling (`!`, `-not`)
    Right,
}

/// Direction of a process substitution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// `<( ... )`
    Input,
    /// `>( ... )`
    Output,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Input => "<",
            Self::Output => ">",
        }
    }

    pub fn from_symbol(s: &str) -> Option<Self> {
        match s {
            "<" => Some(Self::Input),
            ">" => Some(Self::Output),
            _ => None,
        }
    }
}

// =============================================================================
// NODES
// =============================================================================

/// Index of a node inside its [`Tree`](super::Tree) arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

/// Kind of a canonical node, carrying only the fields that kind needs.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Root,
    Pipeline,
    CommandSubstitution,
    ProcessSubstitution(Direction),
    HeadCommand,
    Flag {
        /// Source span, kept for quote recovery
        span: Option<Span>,
    },
    Argument {
        arg_type: ArgType,
        span: Option<Span>,
    },
    UnaryLogicOp(Associativity),
    BinaryLogicOp,
}

impl NodeKind {
    pub fn argument(arg_type: ArgType) -> Self {
        Self::Argument { arg_type, span: None }
    }

    pub fn flag() -> Self {
        Self::Flag { span: None }
    }

    /// Kind name used as the prefix of serialized symbols.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Root => "Root",
            Self::Pipeline => "Pipeline",
            Self::CommandSubstitution => "CommandSubstitution",
            Self::ProcessSubstitution(_) => "ProcessSubstitution",
            Self::HeadCommand => "HeadCommand",
            Self::Flag { .. } => "Flag",
            Self::Argument { .. } => "Argument",
            Self::UnaryLogicOp(_) => "UnaryLogicOp",
            Self::BinaryLogicOp => "BinaryLogicOp",
        }
    }

    pub fn is_argument(&self) -> bool {
        matches!(self, Self::Argument { .. })
    }

    pub fn is_logic_op(&self) -> bool {
        matches!(self, Self::UnaryLogicOp(_) | Self::BinaryLogicOp)
    }

    pub fn arg_type(&self) -> Option<ArgType> {
        match self {
            Self::Argument { arg_type, .. } => Some(*arg_type),
            _ => None,
        }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            Self::Flag { span } | Self::Argument { span, .. } => *span,
            _ => None,
        }
    }

    /// Same variant and variant data, ignoring spans and optionally the
    /// argument type.
    pub fn same_shape(&self, other: &NodeKind, ignore_arg_type: bool) -> bool {
        match (self, other) {
            (Self::Argument { arg_type: a, .. }, Self::Argument { arg_type: b, .. }) => {
                ignore_arg_type || a == b
            }
            (Self::Flag { .. }, Self::Flag { .. }) => true,
            (Self::ProcessSubstitution(a), Self::ProcessSubstitution(b)) => a == b,
            (Self::UnaryLogicOp(a), Self::UnaryLogicOp(b)) => a == b,
            _ => std::mem::discriminant(self) == std::mem::discriminant(other),
        }
    }
}

/// A node stored in the tree arena.
///
/// `parent`, `left` and `right` are non-owning links. Sibling links are
/// recomputed from the parent's child list whenever it changes.
#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    pub value: String,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) left: Option<NodeId>,
    pub(crate) right: Option<NodeId>,
}

impl Node {
    pub fn new(kind: NodeKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
            parent: None,
            children: Vec::new(),
            left: None,
            right: None,
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn left_sibling(&self) -> Option<NodeId> {
        self.left
    }

    pub fn right_sibling(&self) -> Option<NodeId> {
        self.right
    }

    /// Serialized symbol, e.g. `Flag_-name`.
    pub fn symbol(&self) -> String {
        match &self.kind {
            NodeKind::Root => "Root".to_string(),
            NodeKind::ProcessSubstitution(dir) => format!("ProcessSubstitution_{}", dir.as_str()),
            kind => format!("{}_{}", kind.name(), self.value),
        }
    }
}
