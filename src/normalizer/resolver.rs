//! Logic-operator resolution
//!
//! Predicate-style commands (`find`) express a boolean expression through
//! their flags: `find . \( -name a -o -name b \) ! -empty`. The main pass
//! attaches operators and parentheses as flat children of the head command.
//! This module rebuilds the expression tree in place:
//!
//! 1. Parentheses are grouped with a stack of frames. A `(` opens a frame; a
//!    `)` closes the innermost one, and its run is resolved into one node.
//!    Groups therefore resolve innermost first, and an operator next to a
//!    group only sees the group once it has been closed.
//! 2. Within a run, right-associative unary operators (`!`, `-not`) adopt
//!    their right neighbour, processed right to left; left-associative ones
//!    (`-prune`) adopt their left neighbour.
//! 3. Binary operators adopt both neighbours, `-and` before `-or`, left to
//!    right. A left neighbour that is the same operator absorbs the right
//!    neighbour instead, so chains flatten.
//! 4. A bracketed run that still holds several nodes is wrapped in an
//!    implicit `-and`. The outermost run is not.
//!
//! An unmatched `)` is dropped and an unclosed `(` is closed at the end, each
//! with a diagnostic.

use super::errors::{Diagnostic, NormalizeError, RepairKind};
use crate::tree::{Associativity, NodeId, NodeKind, Tree};
use std::collections::{HashMap, HashSet};
use tracing::warn;

/// Kind of logic operator a word spells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicOp {
    Unary(Associativity),
    Binary,
}

lazy_static::lazy_static! {
    /// Operator spellings mapped to their canonical spelling and kind
    static ref LOGIC_OPERATORS: HashMap<&'static str, (&'static str, LogicOp)> = {
        let mut m = HashMap::new();
        m.insert("-a", ("-and", LogicOp::Binary));
        m.insert("-and", ("-and", LogicOp::Binary));
        m.insert("&&", ("&&", LogicOp::Binary));
        m.insert("-o", ("-or", LogicOp::Binary));
        m.insert("-or", ("-or", LogicOp::Binary));
        m.insert("||", ("||", LogicOp::Binary));
        m.insert("!", ("!", LogicOp::Unary(Associativity::Right)));
        m.insert("-not", ("-not", LogicOp::Unary(Associativity::Right)));
        m.insert("-prune", ("-prune", LogicOp::Unary(Associativity::Left)));
        m
    };
}

const AND_FAMILY: &[&str] = &["-and", "&&"];
const OR_FAMILY: &[&str] = &["-or", "||"];

/// Canonical spelling and kind of a logic operator word.
pub fn logic_operator(word: &str) -> Option<(&'static str, LogicOp)> {
    LOGIC_OPERATORS.get(word).copied()
}

pub fn is_operator_spelling(word: &str) -> bool {
    LOGIC_OPERATORS.contains_key(word)
}

/// Associativity of a unary operator spelling.
pub fn unary_associativity(op: &str) -> Associativity {
    match logic_operator(op) {
        Some((_, LogicOp::Unary(assoc))) => assoc,
        _ => Associativity::Right,
    }
}

pub fn is_paren(tree: &Tree, id: NodeId) -> bool {
    tree.kind(id).is_argument() && matches!(tree.value(id), "(" | ")")
}

/// Resolve the operators and parentheses among the children of `head`.
pub fn resolve(
    tree: &mut Tree,
    head: NodeId,
    command: &str,
    diagnostics: &mut Vec<Diagnostic>,
) -> Result<(), NormalizeError> {
    let children = tree.children(head).to_vec();
    let pending: HashSet<NodeId> = children
        .iter()
        .copied()
        .filter(|c| tree.kind(*c).is_logic_op() && tree.children(*c).is_empty())
        .collect();
    let mut resolver = Resolver {
        tree,
        command,
        pending,
        diagnostics,
    };

    let mut frames: Vec<Vec<NodeId>> = vec![Vec::new()];
    for child in children {
        let opens = is_paren(resolver.tree, child).then(|| resolver.tree.value(child) == "(");
        match opens {
            Some(true) => frames.push(Vec::new()),
            Some(false) => {
                if frames.len() == 1 {
                    resolver.repair(RepairKind::UnmatchedCloseParen, "dropped unmatched `)`");
                    continue;
                }
                resolver.close_frame(&mut frames)?;
            }
            None => {
                if let Some(frame) = frames.last_mut() {
                    frame.push(child);
                }
            }
        }
    }
    while frames.len() > 1 {
        resolver.repair(RepairKind::UnclosedParen, "closed unbalanced `(`");
        resolver.close_frame(&mut frames)?;
    }

    let top = frames.pop().unwrap_or_default();
    let top = resolver.resolve_run(top)?;
    resolver.tree.set_children(head, top);
    collapse_single_child_ops(resolver.tree, head);
    Ok(())
}

struct Resolver<'a> {
    tree: &'a mut Tree,
    command: &'a str,
    /// Operators that have not adopted their operands yet
    pending: HashSet<NodeId>,
    diagnostics: &'a mut Vec<Diagnostic>,
}

impl<'a> Resolver<'a> {
    fn repair(&mut self, kind: RepairKind, message: &str) {
        warn!(command = self.command, "{}", message);
        self.diagnostics.push(Diagnostic::new(kind, message));
    }

    fn inconsistent(&self, reason: String) -> NormalizeError {
        NormalizeError::StructuralInconsistency {
            command: self.command.to_string(),
            reason,
        }
    }

    fn is_pending(&self, id: NodeId) -> bool {
        self.pending.contains(&id)
    }

    /// Resolve the innermost frame and hand its result to the enclosing one.
    fn close_frame(&mut self, frames: &mut Vec<Vec<NodeId>>) -> Result<(), NormalizeError> {
        let run = frames.pop().unwrap_or_default();
        let mut nodes = self.resolve_run(run)?;
        if nodes.len() > 1 {
            let and = self.tree.add(NodeKind::BinaryLogicOp, "-and");
            self.tree.set_children(and, nodes);
            nodes = vec![and];
        }
        if let Some(outer) = frames.last_mut() {
            outer.extend(nodes);
        }
        Ok(())
    }

    /// Resolve the operators of one run of siblings.
    fn resolve_run(&mut self, mut run: Vec<NodeId>) -> Result<Vec<NodeId>, NormalizeError> {
        self.resolve_right_unary(&mut run)?;
        self.resolve_left_unary(&mut run);
        self.resolve_binary(&mut run, AND_FAMILY)?;
        self.resolve_binary(&mut run, OR_FAMILY)?;
        Ok(run)
    }

    fn unary_assoc(&self, id: NodeId) -> Option<Associativity> {
        match self.tree.kind(id) {
            NodeKind::UnaryLogicOp(assoc) if self.is_pending(id) => Some(*assoc),
            _ => None,
        }
    }

    fn resolve_right_unary(&mut self, run: &mut Vec<NodeId>) -> Result<(), NormalizeError> {
        let mut i = run.len();
        while i > 0 {
            i -= 1;
            let op = run[i];
            if self.unary_assoc(op) != Some(Associativity::Right) {
                continue;
            }
            // a childless `-prune` is a complete predicate
            let operand = match run.get(i + 1) {
                Some(next)
                    if !self.is_pending(*next)
                        || self.unary_assoc(*next) == Some(Associativity::Left) =>
                {
                    *next
                }
                _ => {
                    return Err(self.inconsistent(format!(
                        "`{}` has no operand",
                        self.tree.value(op)
                    )))
                }
            };
            self.tree.attach(op, operand);
            run.remove(i + 1);
            self.pending.remove(&op);
            self.pending.remove(&operand);
        }
        Ok(())
    }

    fn resolve_left_unary(&mut self, run: &mut Vec<NodeId>) {
        let mut i = 0;
        while i < run.len() {
            let op = run[i];
            if self.unary_assoc(op) != Some(Associativity::Left) {
                i += 1;
                continue;
            }
            self.pending.remove(&op);
            // positional arguments are search roots, not predicates
            let target = i
                .checked_sub(1)
                .map(|p| run[p])
                .filter(|p| !self.is_pending(*p) && !self.tree.kind(*p).is_argument());
            match target {
                Some(operand) => {
                    self.tree.attach(op, operand);
                    run.remove(i - 1);
                }
                None => i += 1,
            }
        }
    }

    fn resolve_binary(&mut self, run: &mut Vec<NodeId>, family: &[&str]) -> Result<(), NormalizeError> {
        let mut i = 0;
        while i < run.len() {
            let op = run[i];
            let is_candidate = matches!(self.tree.kind(op), NodeKind::BinaryLogicOp)
                && self.is_pending(op)
                && family.contains(&self.tree.value(op));
            if !is_candidate {
                i += 1;
                continue;
            }
            let lhs = i.checked_sub(1).map(|p| run[p]);
            let rhs = run.get(i + 1).copied();
            let (lhs, rhs) = match (lhs, rhs) {
                (Some(l), Some(r)) if !self.is_pending(l) && !self.is_pending(r) => (l, r),
                _ => {
                    return Err(self.inconsistent(format!(
                        "`{}` needs an operand on both sides",
                        self.tree.value(op)
                    )))
                }
            };
            self.pending.remove(&op);

            let same_op = matches!(self.tree.kind(lhs), NodeKind::BinaryLogicOp)
                && self.tree.value(lhs) == self.tree.value(op);
            if same_op {
                self.tree.attach(lhs, rhs);
                run.drain(i..=i + 1);
            } else {
                self.tree.attach(op, lhs);
                self.tree.attach(op, rhs);
                run.splice(i - 1..=i + 1, [op]);
            }
            // the merged node now sits at i - 1; look at what follows it
        }
        Ok(())
    }
}

/// Replace every BinaryLogicOp with a single child by that child.
pub fn collapse_single_child_ops(tree: &mut Tree, under: NodeId) {
    for id in tree.descendants(under) {
        if matches!(tree.kind(id), NodeKind::BinaryLogicOp) && tree.children(id).len() == 1 {
            let only = tree.children(id)[0];
            tree.replace(id, only);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::ArgType;

    /// Build `find` with flat children from a word list. Words after a
    /// flag in `with_arg` become that flag's argument.
    fn flat(words: &[&str]) -> (Tree, NodeId) {
        let mut tree = Tree::new();
        let head = tree.add(NodeKind::HeadCommand, "find");
        tree.attach(tree.root(), head);
        let mut pending_flag: Option<NodeId> = None;
        for word in words {
            if let Some(flag) = pending_flag.take() {
                let arg = tree.add(NodeKind::argument(ArgType::Pattern), *word);
                tree.attach(flag, arg);
                continue;
            }
            let id = match logic_operator(word) {
                Some((canon, LogicOp::Binary)) => tree.add(NodeKind::BinaryLogicOp, canon),
                Some((canon, LogicOp::Unary(assoc))) => tree.add(NodeKind::UnaryLogicOp(assoc), canon),
                None if *word == "(" || *word == ")" => {
                    tree.add(NodeKind::argument(ArgType::ReservedWord), *word)
                }
                None if word.starts_with('-') => {
                    let flag = tree.add(NodeKind::flag(), *word);
                    if matches!(*word, "-name" | "-type" | "-path") {
                        pending_flag = Some(flag);
                    }
                    flag
                }
                None => tree.add(NodeKind::argument(ArgType::File), *word),
            };
            tree.attach(head, id);
        }
        (tree, head)
    }

    fn run(words: &[&str]) -> (Tree, Vec<Diagnostic>) {
        let (mut tree, head) = flat(words);
        let mut diagnostics = Vec::new();
        resolve(&mut tree, head, "find", &mut diagnostics).unwrap();
        assert!(tree.links_consistent());
        (tree, diagnostics)
    }

    fn shape(tree: &Tree) -> String {
        fn walk(tree: &Tree, id: NodeId, out: &mut String) {
            out.push_str(tree.value(id));
            let kids = tree.children(id);
            if !kids.is_empty() && !matches!(tree.kind(id), NodeKind::Flag { .. }) {
                out.push('[');
                for (i, k) in kids.iter().enumerate() {
                    if i > 0 {
                        out.push(' ');
                    }
                    walk(tree, *k, out);
                }
                out.push(']');
            }
        }
        let mut out = String::new();
        let head = tree.children(tree.root())[0];
        walk(tree, head, &mut out);
        out
    }

    fn no_parens(tree: &Tree) -> bool {
        tree.descendants(tree.root()).into_iter().all(|id| !is_paren(tree, id))
    }

    #[test]
    fn test_top_level_or() {
        let (tree, diags) = run(&[".", "-name", "a", "-o", "-name", "b"]);
        assert_eq!(shape(&tree), "find[. -or[-name -name]]");
        assert!(diags.is_empty());
    }

    #[test]
    fn test_group_gets_implicit_and() {
        let (tree, diags) = run(&[".", "(", "-name", "a", "-print", ")"]);
        assert_eq!(shape(&tree), "find[. -and[-name -print]]");
        assert!(diags.is_empty());
        assert!(no_parens(&tree));
    }

    #[test]
    fn test_unclosed_paren_is_repaired() {
        let (tree, diags) = run(&[".", "(", "-name", "foo", "-print"]);
        assert_eq!(shape(&tree), "find[. -and[-name -print]]");
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].kind, RepairKind::UnclosedParen);
        assert!(no_parens(&tree));
    }

    #[test]
    fn test_unmatched_close_paren_is_dropped() {
        let (tree, diags) = run(&[".", "-name", "a", ")", "-print"]);
        assert_eq!(shape(&tree), "find[. -name -print]");
        assert_eq!(diags[0].kind, RepairKind::UnmatchedCloseParen);
    }

    #[test]
    fn test_and_binds_tighter_than_or() {
        let (tree, _) = run(&["-name", "a", "-o", "-name", "b", "-a", "-type", "f"]);
        assert_eq!(shape(&tree), "find[-or[-name -and[-name -type]]]");
    }

    #[test]
    fn test_same_operator_chains_flatten() {
        let (tree, _) = run(&["-name", "a", "-o", "-name", "b", "-o", "-name", "c"]);
        assert_eq!(shape(&tree), "find[-or[-name -name -name]]");
    }

    #[test]
    fn test_not_before_group() {
        let (tree, diags) = run(&[".", "!", "(", "-name", "a", "-o", "-name", "b", ")"]);
        assert_eq!(shape(&tree), "find[. ![-or[-name -name]]]");
        assert!(diags.is_empty());
    }

    #[test]
    fn test_operators_between_nested_groups() {
        let words = [
            ".", "(", "(", "-name", "a", "-o", "-name", "b", ")", "-a", "!", "(", "-type", "d", ")", ")",
            "-o", "-print",
        ];
        let (tree, diags) = run(&words);
        assert_eq!(shape(&tree), "find[. -or[-and[-or[-name -name] ![-type]] -print]]");
        assert!(diags.is_empty());
        assert!(no_parens(&tree));
    }

    #[test]
    fn test_double_negation_nests() {
        let (tree, _) = run(&["!", "!", "-empty"]);
        assert_eq!(shape(&tree), "find[![![-empty]]]");
    }

    #[test]
    fn test_prune_adopts_left_predicate() {
        let (tree, _) = run(&[".", "-path", "x", "-prune", "-o", "-print"]);
        assert_eq!(shape(&tree), "find[. -or[-prune[-path] -print]]");
    }

    #[test]
    fn test_prune_without_target_stays_childless() {
        let (tree, _) = run(&[".", "-prune"]);
        assert_eq!(shape(&tree), "find[. -prune]");
    }

    #[test]
    fn test_not_adopts_prune() {
        let (tree, diags) = run(&[".", "!", "-prune"]);
        assert_eq!(shape(&tree), "find[. ![-prune]]");
        assert!(diags.is_empty());

        let (tree, _) = run(&[".", "-path", "x", "!", "-prune", "-o", "-print"]);
        assert_eq!(shape(&tree), "find[. -path -or[![-prune] -print]]");
    }

    #[test]
    fn test_missing_operand_is_inconsistent() {
        let cases: [&[&str]; 4] = [
            &["-name", "a", "-o"],
            &["-o", "-print"],
            &["-print", "!"],
            &["-name", "a", "-o", "-a", "-print"],
        ];
        for words in cases {
            let (mut tree, head) = flat(words);
            let mut diagnostics = Vec::new();
            let result = resolve(&mut tree, head, "find", &mut diagnostics);
            assert!(
                matches!(result, Err(NormalizeError::StructuralInconsistency { .. })),
                "{:?}",
                words
            );
        }
    }

    #[test]
    fn test_empty_group_is_dropped() {
        let (tree, diags) = run(&[".", "(", ")", "-print"]);
        assert_eq!(shape(&tree), "find[. -print]");
        assert!(diags.is_empty());
    }

    #[test]
    fn test_collapse_single_child_ops() {
        let mut tree = Tree::new();
        let head = tree.add(NodeKind::HeadCommand, "find");
        tree.attach(tree.root(), head);
        let and = tree.add(NodeKind::BinaryLogicOp, "-and");
        tree.attach(head, and);
        let flag = tree.add(NodeKind::flag(), "-print");
        tree.attach(and, flag);
        collapse_single_child_ops(&mut tree, head);
        assert_eq!(tree.children(head), &[flag]);
        assert!(tree.links_consistent());
    }
}
