//! Symbol streams
//!
//! A depth-first rendering of the tree where every node is written as its
//! kind-prefixed symbol, followed by its children and a pop marker. The
//! stream carries enough to rebuild the tree; argument types are re-derived
//! from the grammar on the way back.

use super::CodecError;
use crate::ast::Span;
use crate::grammar::GrammarLookup;
use crate::normalizer::classify::{classify, is_reserved_word, SlotTracker};
use crate::normalizer::resolver::unary_associativity;
use crate::tree::{ArgType, Direction, NodeId, NodeKind, Tree};
use std::collections::HashMap;

/// Pop marker closing a node's children.
pub const V_NO_EXPAND: &str = "<V_NO_EXPAND>";
/// Alternate pop marker, accepted on input.
pub const H_NO_EXPAND: &str = "<H_NO_EXPAND>";

/// Flatten `tree` into its symbol stream.
///
/// ```text
/// Root HeadCommand_ls Flag_-l <V_NO_EXPAND> Argument_/tmp <V_NO_EXPAND> <V_NO_EXPAND>
/// ```
pub fn to_symbols(tree: &Tree) -> Vec<String> {
    let mut out = vec!["Root".to_string()];
    for child in tree.children(tree.root()) {
        push_symbols(tree, *child, &mut out);
    }
    out
}

fn push_symbols(tree: &Tree, id: NodeId, out: &mut Vec<String>) {
    out.push(tree.node(id).symbol());
    for child in tree.children(id) {
        push_symbols(tree, *child, out);
    }
    out.push(V_NO_EXPAND.to_string());
}

/// Rebuild a tree from a symbol stream.
///
/// A leading `Root` is optional. A pop marker with nothing left to close
/// ends the stream; anything after it is ignored.
pub fn from_symbols<S: AsRef<str>>(
    symbols: &[S],
    grammar: &dyn GrammarLookup,
) -> Result<Tree, CodecError> {
    let mut tree = Tree::new();
    let mut cursor = tree.root();
    let mut slots: HashMap<NodeId, SlotTracker> = HashMap::new();

    let mut stream = symbols.iter().map(|s| AsRef::<str>::as_ref(s)).peekable();
    if stream.peek() == Some(&"Root") {
        stream.next();
    }

    for symbol in stream {
        if symbol == V_NO_EXPAND || symbol == H_NO_EXPAND {
            match tree.parent(cursor) {
                Some(parent) => cursor = parent,
                None => break,
            }
            continue;
        }

        let malformed = || CodecError::MalformedSymbol(symbol.to_string());
        let (name, value) = symbol.split_once('_').ok_or_else(malformed)?;
        let kind = match name {
            "Pipeline" => NodeKind::Pipeline,
            "CommandSubstitution" => NodeKind::CommandSubstitution,
            "ProcessSubstitution" => {
                NodeKind::ProcessSubstitution(Direction::from_symbol(value).ok_or_else(malformed)?)
            }
            "HeadCommand" => NodeKind::HeadCommand,
            "Flag" => NodeKind::flag(),
            "UnaryLogicOp" => NodeKind::UnaryLogicOp(unary_associativity(value)),
            "BinaryLogicOp" => NodeKind::BinaryLogicOp,
            "Argument" => NodeKind::argument(argument_type(&tree, cursor, value, grammar, &mut slots)),
            _ => return Err(malformed()),
        };

        let id = tree.add(kind, value);
        tree.attach(cursor, id);
        cursor = id;
    }
    Ok(tree)
}

/// Type of an argument `value` about to be attached under `parent`.
fn argument_type(
    tree: &Tree,
    parent: NodeId,
    value: &str,
    grammar: &dyn GrammarLookup,
    slots: &mut HashMap<NodeId, SlotTracker>,
) -> ArgType {
    if is_reserved_word(value) {
        return ArgType::ReservedWord;
    }
    match tree.kind(parent) {
        NodeKind::Flag { .. } => {
            let flag = tree.value(parent);
            let flag = flag.split_once("::").map_or(flag, |(f, _)| f);
            tree.head_command_of(parent)
                .and_then(|head| grammar.flag_arg_type(tree.value(head), flag))
                .unwrap_or(ArgType::Unknown)
        }
        NodeKind::HeadCommand => {
            let tracker = slots
                .entry(parent)
                .or_insert_with(|| SlotTracker::new(grammar.arg_types_for(tree.value(parent))));
            let (word, span) = match unquote(value) {
                Some(inner) => (inner, Span::new(0, value.len())),
                None => (value, Span::new(0, value.len())),
            };
            let arg_type = classify(word, span, &tracker.allowed());
            tracker.fill(arg_type);
            arg_type
        }
        _ => ArgType::Unknown,
    }
}

fn unquote(value: &str) -> Option<&str> {
    ['\'', '"'].iter().find_map(|q| {
        value
            .strip_prefix(*q)
            .and_then(|rest| rest.strip_suffix(*q))
    })
}
