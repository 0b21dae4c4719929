//! Pretty token output
//!
//! Turns a canonical tree back into the tokens of a runnable command:
//! `find . \( -name a -or -name b \)`, `find . -exec rm {} \;`.

use super::CodecError;
use crate::tree::{ArgType, Associativity, NodeId, NodeKind, Tree};
use serde::{Deserialize, Serialize};

/// Output switches for [`to_tokens`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenOptions {
    /// Degrade instead of failing on malformed trees
    pub loose_constraints: bool,
    /// Emit the children of a head command sorted by value
    pub ignore_flag_order: bool,
    /// Emit argument types instead of argument values
    pub arg_type_only: bool,
    /// Emit arguments as `Argument_<value>` symbols
    pub with_arg_type: bool,
}

/// Serialize `tree` to command tokens.
///
/// In strict mode a node that violates the tree invariants is an error; in
/// loose mode it is emitted as well as possible and this never fails.
pub fn to_tokens(tree: &Tree, options: TokenOptions) -> Result<Vec<String>, CodecError> {
    let mut out = Vec::new();
    Emitter { tree, options }.node(tree.root(), &mut out)?;
    Ok(out)
}

struct Emitter<'a> {
    tree: &'a Tree,
    options: TokenOptions,
}

impl<'a> Emitter<'a> {
    fn loose(&self) -> bool {
        self.options.loose_constraints
    }

    /// Fail in strict mode when `ok` does not hold.
    fn require(&self, ok: bool, kind: &'static str, reason: &str) -> Result<(), CodecError> {
        if ok || self.loose() {
            Ok(())
        } else {
            Err(CodecError::Structural {
                kind,
                reason: reason.to_string(),
            })
        }
    }

    fn children(&self, id: NodeId, out: &mut Vec<String>) -> Result<(), CodecError> {
        for child in self.tree.children(id) {
            self.node(*child, out)?;
        }
        Ok(())
    }

    fn node(&self, id: NodeId, out: &mut Vec<String>) -> Result<(), CodecError> {
        let tree = self.tree;
        let kids = tree.children(id);
        let value = tree.value(id);
        match tree.kind(id) {
            NodeKind::Root => {
                self.require(kids.len() == 1, "Root", "must have exactly one child")?;
                self.children(id, out)?;
            }
            NodeKind::Pipeline => {
                self.require(kids.len() > 1, "Pipeline", "needs at least two commands")?;
                if kids.is_empty() {
                    out.push("|".to_string());
                }
                for (i, child) in kids.iter().enumerate() {
                    if i > 0 {
                        out.push("|".to_string());
                    }
                    self.node(*child, out)?;
                }
            }
            NodeKind::CommandSubstitution => {
                self.require(kids.len() == 1, "CommandSubstitution", "must wrap one command")?;
                out.push("$(".to_string());
                self.children(id, out)?;
                out.push(")".to_string());
            }
            NodeKind::ProcessSubstitution(dir) => {
                self.require(kids.len() == 1, "ProcessSubstitution", "must wrap one command")?;
                out.push(format!("{}(", dir.as_str()));
                self.children(id, out)?;
                out.push(")".to_string());
            }
            NodeKind::HeadCommand => {
                out.push(value.to_string());
                let mut ordered = kids.to_vec();
                if self.options.ignore_flag_order {
                    ordered.sort_by(|a, b| tree.value(*a).cmp(tree.value(*b)));
                }
                for child in ordered {
                    self.node(child, out)?;
                }
            }
            NodeKind::Flag { .. } => {
                let (flag, delimiter) = match value.split_once("::") {
                    Some((flag, delimiter)) => (flag, Some(delimiter)),
                    None => (value, None),
                };
                out.push(flag.to_string());
                self.children(id, out)?;
                match delimiter {
                    Some(";") => out.push("\\;".to_string()),
                    Some(other) => out.push(other.to_string()),
                    None => {}
                }
            }
            NodeKind::BinaryLogicOp => {
                self.require(kids.len() > 1, "BinaryLogicOp", "needs at least two operands")?;
                if kids.len() < 2 {
                    return self.children(id, out);
                }
                out.push("\\(".to_string());
                for (i, child) in kids.iter().enumerate() {
                    if i > 0 {
                        out.push(value.to_string());
                    }
                    self.node(*child, out)?;
                }
                out.push("\\)".to_string());
            }
            NodeKind::UnaryLogicOp(assoc) => {
                let needs_operand = *assoc == Associativity::Right;
                self.require(!needs_operand || kids.len() == 1, "UnaryLogicOp", "needs one operand")?;
                match (assoc, kids.first()) {
                    (_, None) => out.push(value.to_string()),
                    (Associativity::Right, Some(child)) => {
                        out.push(value.to_string());
                        self.node(*child, out)?;
                    }
                    (Associativity::Left, Some(child)) => {
                        self.node(*child, out)?;
                        out.push(value.to_string());
                    }
                }
            }
            NodeKind::Argument { arg_type, .. } => {
                self.require(kids.is_empty(), "Argument", "cannot have children")?;
                if self.options.with_arg_type {
                    out.push(tree.node(id).symbol());
                } else if self.options.arg_type_only && *arg_type != ArgType::ReservedWord {
                    out.push(arg_type.to_string());
                } else {
                    out.push(value.to_string());
                }
                self.children(id, out)?;
            }
        }
        Ok(())
    }
}

/// Tokens joined into one command line.
pub fn to_command(tree: &Tree, options: TokenOptions) -> Result<String, CodecError> {
    Ok(to_tokens(tree, options)?.join(" "))
}
