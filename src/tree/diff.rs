//! Tree comparison with a readable difference

use super::tree::Tree;
use similar::{ChangeTag, TextDiff};

/// Compare two trees. Returns `None` when they are structurally equal,
/// otherwise a unified diff of their rendered forms.
pub fn diff(left: &Tree, right: &Tree, ignore_arg_types: bool) -> Option<String> {
    let equal = if ignore_arg_types {
        left.eq_ignoring_arg_types(right)
    } else {
        left == right
    };
    if equal {
        return None;
    }

    let (a, b) = (left.to_string(), right.to_string());
    let diff = TextDiff::from_lines(&a, &b);
    let mut output = String::from("--- left\n+++ right\n");
    for hunk in diff.unified_diff().context_radius(3).iter_hunks() {
        output.push_str(&format!("{}\n", hunk.header()));
        for change in hunk.iter_changes() {
            let sign = match change.tag() {
                ChangeTag::Delete => "-",
                ChangeTag::Insert => "+",
                ChangeTag::Equal => " ",
            };
            output.push_str(sign);
            output.push_str(change.value());
            if !change.value().ends_with('\n') {
                output.push('\n');
            }
        }
    }
    Some(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{ArgType, NodeKind};

    fn ls(arg: &str, arg_type: ArgType) -> Tree {
        let mut tree = Tree::new();
        let head = tree.add(NodeKind::HeadCommand, "ls");
        tree.attach(tree.root(), head);
        let flag = tree.add(NodeKind::flag(), "-l");
        tree.attach(head, flag);
        let a = tree.add(NodeKind::argument(arg_type), arg);
        tree.attach(head, a);
        tree
    }

    #[test]
    fn test_equal_trees_have_no_diff() {
        assert!(diff(&ls("x", ArgType::File), &ls("x", ArgType::File), false).is_none());
    }

    #[test]
    fn test_arg_types_can_be_ignored() {
        let (a, b) = (ls("x", ArgType::File), ls("x", ArgType::Unknown));
        assert!(diff(&a, &b, true).is_none());
        let out = diff(&a, &b, false).unwrap();
        assert!(out.contains("-        Argument(x) <File>\n"));
        assert!(out.contains("+        Argument(x) <Unknown>\n"));
    }

    #[test]
    fn test_value_difference() {
        let out = diff(&ls("x", ArgType::File), &ls("y", ArgType::File), false).unwrap();
        assert!(out.starts_with("--- left\n+++ right\n@@"));
        assert!(out.contains("         Flag(-l)\n"));
    }
}
