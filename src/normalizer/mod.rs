//! Canonicalizing normalizer
//!
//! Turns a raw parse tree into a canonical [`Tree`]: head commands, split
//! flags, typed arguments, substitution wrappers and, for predicate-style
//! commands, a resolved boolean expression.
//!
//! Words of a command are consumed left to right with one attachment state
//! deciding what the next word may be: the head command, a flag or
//! positional argument of the head, or the argument a flag just asked for.

pub mod classify;
pub mod errors;
pub mod flags;
pub mod resolver;
pub mod text;

pub use errors::{Diagnostic, NormalizeError, RepairKind};

use crate::ast::{RawKind, RawNode};
use crate::grammar::GrammarLookup;
use crate::parser::parse;
use crate::tree::{ArgType, Direction, NodeId, NodeKind, Tree};
use classify::{classify, SlotTracker};
use flags::{is_flag_word, recover_quotation, split_flag};
use regex_lite::{NoExpand, Regex};
use resolver::LogicOp;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

lazy_static::lazy_static! {
    static ref DIGITS: Regex = Regex::new(r"\d*\.?\d+").unwrap();
}

/// Normalization switches and placeholders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizeOptions {
    /// Replace digit runs in arguments (except permissions)
    pub normalize_digits: bool,
    /// Replace arguments containing a space
    pub normalize_long_pattern: bool,
    /// Keep the quotes an argument was written with
    pub recover_quotation: bool,
    pub num_placeholder: String,
    pub long_pattern_placeholder: String,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            normalize_digits: true,
            normalize_long_pattern: true,
            recover_quotation: true,
            num_placeholder: "_NUM".to_string(),
            long_pattern_placeholder: "_LONG_PATTERN".to_string(),
        }
    }
}

/// A normalized command and the repairs applied to it.
#[derive(Debug, Clone)]
pub struct Normalized {
    /// The command text the tree was built from
    pub command: String,
    pub tree: Tree,
    pub diagnostics: Vec<Diagnostic>,
}

/// Normalizer bound to a grammar lookup.
pub struct Normalizer<'g> {
    grammar: &'g dyn GrammarLookup,
    options: NormalizeOptions,
}

impl<'g> Normalizer<'g> {
    pub fn new(grammar: &'g dyn GrammarLookup) -> Self {
        Self::with_options(grammar, NormalizeOptions::default())
    }

    pub fn with_options(grammar: &'g dyn GrammarLookup, options: NormalizeOptions) -> Self {
        Self { grammar, options }
    }

    pub fn options(&self) -> &NormalizeOptions {
        &self.options
    }

    /// Normalize a raw parse tree of `source`.
    pub fn normalize(&self, raw: &RawNode, source: &str) -> Result<Normalized, NormalizeError> {
        let mut pass = Pass {
            grammar: self.grammar,
            options: &self.options,
            source,
            tree: Tree::new(),
            diagnostics: Vec::new(),
        };
        let root = pass.tree.root();
        if let Err(err) = pass.node(raw, root) {
            warn!(kind = err.kind(), "{}", err);
            return Err(err);
        }
        debug!(command = source, repairs = pass.diagnostics.len(), "normalized");
        Ok(Normalized {
            command: source.to_string(),
            tree: pass.tree.deep_clone(),
            diagnostics: pass.diagnostics,
        })
    }

    /// Clean, parse and normalize command text.
    pub fn normalize_text(&self, command: &str) -> Result<Normalized, NormalizeError> {
        let cleaned = text::clean(command);
        let raw = parse(&cleaned).map_err(|e| {
            let err = NormalizeError::ParseRejected {
                command: command.to_string(),
                reason: e.to_string(),
            };
            warn!(kind = err.kind(), "{}", err);
            err
        })?;
        self.normalize(&raw, &cleaned)
    }
}

/// What the next word of a command may become.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Attachment {
    /// The command's head, attached to the current node
    Head,
    /// A flag, operator or positional argument of the head
    FlagOrArgument,
    /// The argument of this flag
    Argument(NodeId, ArgType),
}

/// State of one normalization call.
struct Pass<'a> {
    grammar: &'a dyn GrammarLookup,
    options: &'a NormalizeOptions,
    source: &'a str,
    tree: Tree,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Pass<'a> {
    fn unsupported(&self, construct: &str) -> NormalizeError {
        NormalizeError::UnsupportedConstruct {
            command: self.source.to_string(),
            construct: construct.to_string(),
        }
    }

    fn inconsistent(&self, reason: impl Into<String>) -> NormalizeError {
        NormalizeError::StructuralInconsistency {
            command: self.source.to_string(),
            reason: reason.into(),
        }
    }

    fn repair(&mut self, kind: RepairKind, message: String) {
        warn!(command = self.source, "{}", message);
        self.diagnostics.push(Diagnostic::new(kind, message));
    }

    fn node(&mut self, raw: &RawNode, current: NodeId) -> Result<(), NormalizeError> {
        match raw.kind {
            RawKind::Command => self.command(&raw.parts, current),
            RawKind::Pipeline => {
                if raw.parts.len() % 2 == 0 {
                    return Err(self.inconsistent("pipeline with an even number of parts"));
                }
                let pipeline = self.tree.add(NodeKind::Pipeline, "|");
                self.tree.attach(current, pipeline);
                for part in raw.parts.iter().filter(|p| p.kind != RawKind::Pipe) {
                    self.node(part, pipeline)?;
                }
                Ok(())
            }
            // a single command followed by `;` or `&`
            RawKind::List if raw.parts.len() <= 2 => match raw.parts.first() {
                Some(first) => self.node(first, current),
                None => Ok(()),
            },
            RawKind::CommandSubstitution | RawKind::ProcessSubstitution => {
                for body in &raw.parts {
                    self.node(body, current)?;
                }
                Ok(())
            }
            other => Err(self.unsupported(other.as_str())),
        }
    }

    /// Attach the word `raw` below `current` as an argument of `arg_type`,
    /// unwrapping substitutions.
    fn word(&mut self, raw: &RawNode, current: NodeId, arg_type: ArgType) -> Result<(), NormalizeError> {
        let Some(first) = raw.parts.first() else {
            self.argument(raw, current, arg_type);
            return Ok(());
        };
        match first.kind {
            RawKind::CommandSubstitution | RawKind::ProcessSubstitution => {
                let (kind, value) = if first.kind == RawKind::CommandSubstitution {
                    (NodeKind::CommandSubstitution, "$(")
                } else if first.word.starts_with('>') {
                    (NodeKind::ProcessSubstitution(Direction::Output), Direction::Output.as_str())
                } else {
                    (NodeKind::ProcessSubstitution(Direction::Input), Direction::Input.as_str())
                };
                let wrapper = self.tree.add(kind, value);
                self.tree.attach(current, wrapper);
                for part in &raw.parts {
                    for body in &part.parts {
                        self.node(body, wrapper)?;
                    }
                }
                Ok(())
            }
            RawKind::Parameter | RawKind::Tilde => {
                self.argument(raw, current, arg_type);
                Ok(())
            }
            _ => {
                for part in &raw.parts {
                    self.node(part, current)?;
                }
                Ok(())
            }
        }
    }

    fn argument(&mut self, raw: &RawNode, current: NodeId, arg_type: ArgType) {
        let value = self.argument_text(raw, arg_type);
        let kind = NodeKind::Argument {
            arg_type,
            span: Some(raw.span),
        };
        let id = self.tree.add(kind, value);
        self.tree.attach(current, id);
    }

    fn argument_text(&self, raw: &RawNode, arg_type: ArgType) -> String {
        let opts = self.options;
        let mut text = if opts.recover_quotation {
            recover_quotation(self.source, raw.span, &raw.word)
        } else {
            raw.word.clone()
        };
        if arg_type == ArgType::Permission {
            return text;
        }
        if opts.normalize_long_pattern && text.contains(' ') {
            text = opts.long_pattern_placeholder.clone();
        }
        if opts.normalize_digits {
            text = DIGITS
                .replace_all(&text, NoExpand(&opts.num_placeholder))
                .into_owned();
        }
        text
    }

    /// Normalize the words of one command below `current`.
    fn command(&mut self, parts: &[RawNode], current: NodeId) -> Result<(), NormalizeError> {
        let mut state = Attachment::Head;
        let mut head: Option<(NodeId, String)> = None;
        let mut slots = SlotTracker::default();
        let mut double_dash = false;

        let mut i = 0;
        while i < parts.len() {
            let part = &parts[i];
            if part.kind != RawKind::Word {
                return Err(self.unsupported(part.kind.as_str()));
            }
            let word = part.word.as_str();

            let current_head = head.as_ref().map(|(id, name)| (*id, name.clone()));
            match (state, current_head) {
                (Attachment::Head, _) | (_, None) => {
                    let id = self.tree.add(NodeKind::HeadCommand, word);
                    self.tree.attach(current, id);
                    slots = SlotTracker::new(self.grammar.arg_types_for(word));
                    head = Some((id, word.to_string()));
                    state = Attachment::FlagOrArgument;
                }
                (Attachment::Argument(flag, ArgType::Utility), _) => {
                    i = self.embedded_after_flag(parts, i, flag)?;
                    state = Attachment::FlagOrArgument;
                }
                (Attachment::Argument(flag, arg_type), _) => {
                    self.word(part, flag, arg_type)?;
                    state = Attachment::FlagOrArgument;
                }
                (Attachment::FlagOrArgument, Some((head_id, name))) => {
                    let predicate = self.grammar.is_predicate(&name);
                    let operator = resolver::logic_operator(word).filter(|_| predicate && !double_dash);

                    if let Some((canonical, op)) = operator {
                        let kind = match op {
                            LogicOp::Unary(assoc) => NodeKind::UnaryLogicOp(assoc),
                            LogicOp::Binary => NodeKind::BinaryLogicOp,
                        };
                        let id = self.tree.add(kind, canonical);
                        self.tree.attach(head_id, id);
                    } else if double_dash {
                        self.positional(part, head_id, &mut slots)?;
                    } else if word == "--" {
                        double_dash = true;
                    } else if is_flag_word(&name, word) {
                        state = self.flag(part, head_id, &name);
                    } else if predicate && matches!(word, "(" | ")") {
                        let kind = NodeKind::Argument {
                            arg_type: ArgType::ReservedWord,
                            span: Some(part.span),
                        };
                        let id = self.tree.add(kind, word);
                        self.tree.attach(head_id, id);
                    } else if slots.expects(ArgType::Utility) {
                        // xargs, sh, exec: the rest is a command of its own
                        self.command(&parts[i..], head_id)?;
                        i = parts.len();
                    } else {
                        self.positional(part, head_id, &mut slots)?;
                    }
                }
            }
            i += 1;
        }

        let Some((head_id, name)) = head else {
            self.repair(RepairKind::MissingHead, "dropped a command without a head command".to_string());
            return Ok(());
        };
        if self.grammar.is_predicate(&name) {
            // operators may adopt a misplaced path, so look before resolving
            let has_path = self
                .tree
                .children(head_id)
                .iter()
                .any(|c| self.tree.kind(*c).is_argument() && !resolver::is_paren(&self.tree, *c));
            resolver::resolve(&mut self.tree, head_id, self.source, &mut self.diagnostics)?;
            if !has_path {
                self.insert_implicit_path(head_id);
            }
        }
        Ok(())
    }

    /// A positional argument of the head, typed by the open slots.
    fn positional(&mut self, part: &RawNode, head: NodeId, slots: &mut SlotTracker) -> Result<(), NormalizeError> {
        let is_substitution = matches!(
            part.parts.first().map(|p| p.kind),
            Some(RawKind::CommandSubstitution | RawKind::ProcessSubstitution)
        );
        if is_substitution {
            return self.word(part, head, ArgType::Unknown);
        }
        let arg_type = classify(&part.word, part.span, &slots.allowed());
        if arg_type == ArgType::Unknown {
            self.repair(
                RepairKind::UnknownArgType,
                format!("cannot decide the type of `{}`", part.word),
            );
        }
        slots.fill(arg_type);
        self.word(part, head, arg_type)
    }

    /// Attach the flag word `part`, split if needed, and report what it
    /// expects next.
    fn flag(&mut self, part: &RawNode, head: NodeId, name: &str) -> Attachment {
        let mut last = None;
        for (n, spelling) in split_flag(self.grammar, name, &part.word).into_iter().enumerate() {
            let span = (n == 0).then_some(part.span);
            let id = self.tree.add(NodeKind::Flag { span }, spelling);
            self.tree.attach(head, id);
            last = Some(id);
        }
        let expected = last.and_then(|id| {
            self.grammar
                .flag_arg_type(name, self.tree.value(id))
                .map(|t| Attachment::Argument(id, t))
        });
        expected.unwrap_or(Attachment::FlagOrArgument)
    }

    /// Normalize the words from `start` up to `;` or `+` as a command under
    /// `flag` and record the delimiter on the flag. Returns the index of the
    /// delimiter (or the last word).
    fn embedded_after_flag(&mut self, parts: &[RawNode], start: usize, flag: NodeId) -> Result<usize, NormalizeError> {
        let end = parts[start..]
            .iter()
            .position(|p| p.is_word(";") || p.is_word("+"))
            .map(|offset| start + offset);
        let (words, delimiter, last) = match end {
            Some(j) => (&parts[start..j], parts[j].word.as_str(), j),
            None => {
                let message = format!("`{}` is missing its `;`", self.tree.value(flag));
                self.repair(RepairKind::MissingDelimiter, message);
                (&parts[start..], ";", parts.len() - 1)
            }
        };
        self.command(words, flag)?;
        let value = format!("{}::{}", self.tree.value(flag), delimiter);
        self.tree.set_value(flag, value);
        Ok(last)
    }

    /// Predicate commands without a search root search `.`.
    fn insert_implicit_path(&mut self, head: NodeId) {
        if self.tree.children(head).is_empty() {
            return;
        }
        let dot = self.tree.add(NodeKind::argument(ArgType::File), ".");
        self.tree.insert(head, 0, dot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::CommandGrammar;
    use crate::tree::Associativity;

    fn normalize_with(cmd: &str, options: NormalizeOptions) -> Result<Normalized, NormalizeError> {
        let grammar = CommandGrammar::builtin().unwrap();
        Normalizer::with_options(&grammar, options).normalize_text(cmd)
    }

    fn norm(cmd: &str) -> Normalized {
        let out = normalize_with(cmd, NormalizeOptions::default()).unwrap();
        assert!(out.tree.links_consistent());
        out
    }

    fn has_paren_argument(tree: &Tree) -> bool {
        tree.descendants(tree.root())
            .into_iter()
            .any(|id| resolver::is_paren(tree, id))
    }

    #[test]
    fn test_ls_splits_clustered_flags() {
        let out = norm("ls -la /tmp");
        let expected = "\
Root
    HeadCommand(ls)
        Flag(-l)
        Flag(-a)
        Argument(/tmp) <File>
";
        assert_eq!(out.tree.to_string(), expected);
        assert!(out.diagnostics.is_empty());
    }

    #[test]
    fn test_find_or_of_patterns() {
        let out = norm("find . -name '*.txt' -o -iname '*.TXT'");
        let expected = "\
Root
    HeadCommand(find)
        Argument(.) <File>
        BinaryLogicOp(-or)
            Flag(-name)
                Argument('*.txt') <Pattern>
            Flag(-iname)
                Argument('*.TXT') <Pattern>
";
        assert_eq!(out.tree.to_string(), expected);
    }

    #[test]
    fn test_find_unclosed_paren_repaired() {
        let out = norm("find . \\( -name foo -print");
        let expected = "\
Root
    HeadCommand(find)
        Argument(.) <File>
        BinaryLogicOp(-and)
            Flag(-name)
                Argument(foo) <Pattern>
            Flag(-print)
";
        assert_eq!(out.tree.to_string(), expected);
        assert_eq!(out.diagnostics.len(), 1);
        assert_eq!(out.diagnostics[0].kind, RepairKind::UnclosedParen);
        assert!(!has_paren_argument(&out.tree));
    }

    #[test]
    fn test_head_count_digit_normalization() {
        let out = norm("head -n 10 file.txt");
        let expected = "\
Root
    HeadCommand(head)
        Flag(-n)
            Argument(_NUM) <Number>
        Argument(file.txt) <File>
";
        assert_eq!(out.tree.to_string(), expected);

        let options = NormalizeOptions {
            normalize_digits: false,
            ..NormalizeOptions::default()
        };
        let out = normalize_with("head -n 10 file.txt", options).unwrap();
        assert!(out.tree.to_string().contains("Argument(10) <Number>"));
    }

    #[test]
    fn test_find_and_with_permission() {
        let out = norm("find . -type f -a -perm 755");
        let expected = "\
Root
    HeadCommand(find)
        Argument(.) <File>
        BinaryLogicOp(-and)
            Flag(-type)
                Argument(f) <Pattern>
            Flag(-perm)
                Argument(755) <Permission>
";
        assert_eq!(out.tree.to_string(), expected);
    }

    #[test]
    fn test_balanced_parens_need_no_repair() {
        for cmd in [
            "find . \\( -name a -o -name b \\) -print",
            "find /tmp ! \\( -name '*.c' -o \\( -name '*.h' -a -newer x \\) \\)",
            "find . \\( -type d -name .git -prune \\) -o -type f -print",
        ] {
            let out = norm(cmd);
            assert!(out.diagnostics.is_empty(), "{}: {:?}", cmd, out.diagnostics);
            assert!(!has_paren_argument(&out.tree), "{}", cmd);
        }
    }

    #[test]
    fn test_not_adjacent_to_nested_group() {
        let out = norm("find . ! \\( -name a -o -name b \\)");
        let expected = "\
Root
    HeadCommand(find)
        Argument(.) <File>
        UnaryLogicOp(!)
            BinaryLogicOp(-or)
                Flag(-name)
                    Argument(a) <Pattern>
                Flag(-name)
                    Argument(b) <Pattern>
";
        assert_eq!(out.tree.to_string(), expected);
        let head = out.tree.children(out.tree.root())[0];
        let not = out.tree.children(head)[1];
        assert_eq!(out.tree.kind(not), &NodeKind::UnaryLogicOp(Associativity::Right));
    }

    #[test]
    fn test_find_gets_implicit_path() {
        let out = norm("find -name x");
        let head = out.tree.children(out.tree.root())[0];
        let first = out.tree.children(head)[0];
        assert_eq!(out.tree.value(first), ".");
        assert_eq!(out.tree.kind(first).arg_type(), Some(ArgType::File));

        // a bare find stays bare
        let out = norm("find");
        let head = out.tree.children(out.tree.root())[0];
        assert!(out.tree.children(head).is_empty());
    }

    #[test]
    fn test_exec_with_delimiters() {
        let out = norm("find . -name '*.tmp' -exec rm {} \\;");
        assert!(out.tree.to_string().contains(
            "        Flag(-exec::;)\n            HeadCommand(rm)\n                Argument({}) <ReservedWord>\n"
        ));
        assert!(out.diagnostics.is_empty());

        let out = norm("find . -type f -exec grep -l foo {} +");
        assert!(out.tree.to_string().contains("Flag(-exec::+)"));
        assert!(out.tree.to_string().contains("HeadCommand(grep)"));
    }

    #[test]
    fn test_exec_missing_delimiter() {
        let out = norm("find . -exec rm {}");
        assert!(out.tree.to_string().contains("Flag(-exec::;)"));
        assert_eq!(out.diagnostics.len(), 1);
        assert_eq!(out.diagnostics[0].kind, RepairKind::MissingDelimiter);
    }

    #[test]
    fn test_exec_without_command_drops_it() {
        let out = norm("find . -exec \\;");
        let expected = "\
Root
    HeadCommand(find)
        Argument(.) <File>
        Flag(-exec::;)
";
        assert_eq!(out.tree.to_string(), expected);
        assert_eq!(out.diagnostics.len(), 1);
        assert_eq!(out.diagnostics[0].kind, RepairKind::MissingHead);
    }

    #[test]
    fn test_not_prune() {
        let out = norm("find . ! -prune");
        let expected = "\
Root
    HeadCommand(find)
        Argument(.) <File>
        UnaryLogicOp(!)
            UnaryLogicOp(-prune)
";
        assert_eq!(out.tree.to_string(), expected);
        assert!(out.diagnostics.is_empty());
    }

    #[test]
    fn test_adopted_path_gets_no_implicit_path() {
        let out = norm("find /tmp -o -print");
        let head = out.tree.children(out.tree.root())[0];
        assert_eq!(out.tree.children(head).len(), 1);
        assert!(!out.tree.to_string().contains("Argument(.)"));
        assert!(out.tree.to_string().contains("BinaryLogicOp(-or)\n            Argument(/tmp) <File>\n"));
    }

    #[test]
    fn test_exec_followed_by_more_predicates() {
        let out = norm("find . -exec chmod 644 {} \\; -print");
        let head = out.tree.children(out.tree.root())[0];
        let values: Vec<&str> = out.tree.children(head).iter().map(|c| out.tree.value(*c)).collect();
        assert_eq!(values, vec![".", "-exec::;", "-print"]);
    }

    #[test]
    fn test_xargs_embeds_command() {
        let out = norm("find . -name '*.log' | xargs rm -f");
        let expected = "\
Root
    Pipeline(|)
        HeadCommand(find)
            Argument(.) <File>
            Flag(-name)
                Argument('*.log') <Pattern>
        HeadCommand(xargs)
            HeadCommand(rm)
                Flag(-f)
";
        assert_eq!(out.tree.to_string(), expected);
    }

    #[test]
    fn test_xargs_flags_before_command() {
        let out = norm("ls | xargs -I {} mv {} /backup");
        let text = out.tree.to_string();
        assert!(text.contains("        HeadCommand(xargs)\n            Flag(-I)\n                Argument({}) <Pattern>\n            HeadCommand(mv)\n"));
    }

    #[test]
    fn test_substitutions() {
        let out = norm("wc -l $(find . -name '*.rs')");
        let text = out.tree.to_string();
        assert!(text.contains("        CommandSubstitution($()\n            HeadCommand(find)\n"));

        let out = norm("comm <(sort a) >(sort b)");
        let text = out.tree.to_string();
        assert!(text.contains("ProcessSubstitution(<)"));
        assert!(text.contains("ProcessSubstitution(>)"));
        assert!(out.diagnostics.is_empty());
    }

    #[test]
    fn test_parameters_are_opaque_arguments() {
        let out = norm("ls $HOME ~/docs");
        let text = out.tree.to_string();
        assert!(text.contains("Argument($HOME) <File>"));
        assert!(text.contains("Argument(~/docs) <File>"));
    }

    #[test]
    fn test_double_dash_makes_arguments() {
        let out = norm("rm -f -- -weird -x");
        let expected = "\
Root
    HeadCommand(rm)
        Flag(-f)
        Argument(-weird) <File>
        Argument(-x) <File>
";
        assert_eq!(out.tree.to_string(), expected);
    }

    #[test]
    fn test_flag_argument_may_start_with_dash() {
        let out = norm("find . -mtime -7");
        assert!(out.tree.to_string().contains("Flag(-mtime)\n            Argument(-_NUM) <Time>"));
        let out = norm("head -20 log");
        assert!(out.tree.to_string().contains("Argument(-_NUM) <File>"));
    }

    #[test]
    fn test_long_pattern_and_quotes() {
        let out = norm("grep \"foo bar\" notes");
        assert!(out.tree.to_string().contains("Argument(_LONG_PATTERN) <Pattern>"));

        let options = NormalizeOptions {
            recover_quotation: false,
            normalize_long_pattern: false,
            ..NormalizeOptions::default()
        };
        let out = normalize_with("grep \"foo bar\" notes", options).unwrap();
        assert!(out.tree.to_string().contains("Argument(foo bar) <Pattern>"));
    }

    #[test]
    fn test_operators_are_flags_outside_predicates() {
        let out = norm("ls -o");
        assert!(out.tree.to_string().contains("Flag(-o)"));
        let out = norm("chmod -R a=rx dir");
        assert!(out.tree.to_string().contains("Argument(a=rx) <Permission>"));
    }

    #[test]
    fn test_unknown_command_arguments() {
        let out = norm("frobnicate thing");
        assert!(out.tree.to_string().contains("Argument(thing) <Unknown>"));
        assert_eq!(out.diagnostics[0].kind, RepairKind::UnknownArgType);
    }

    #[test]
    fn test_trailing_separator_is_accepted() {
        let out = norm("ls -l;");
        assert!(out.tree.to_string().contains("HeadCommand(ls)"));
    }

    #[test]
    fn test_unsupported_constructs() {
        let cases = [
            ("ls > out.txt", "redirect"),
            ("FOO=1 ls", "assignment"),
            ("ls; pwd", "list"),
            ("ls && pwd", "list"),
            ("cat <<EOF", "heredoc"),
            ("for f in *; do echo $f; done", "for"),
            ("if true; then ls; fi", "if"),
            ("f() { ls; }", "function"),
            ("(cd /tmp && ls)", "subshell"),
        ];
        for (cmd, construct) in cases {
            match normalize_with(cmd, NormalizeOptions::default()) {
                Err(NormalizeError::UnsupportedConstruct { construct: got, .. }) => {
                    assert_eq!(got, construct, "{}", cmd)
                }
                other => panic!("{}: {:?}", cmd, other.map(|n| n.tree.to_string())),
            }
        }
    }

    #[test]
    fn test_parse_rejected() {
        for cmd in ["echo 'unterminated", "", "ls $(pwd"] {
            assert!(matches!(
                normalize_with(cmd, NormalizeOptions::default()),
                Err(NormalizeError::ParseRejected { .. })
            ));
        }
    }

    #[test]
    fn test_dangling_operator_is_inconsistent() {
        let err = normalize_with("find . -name a -o", NormalizeOptions::default()).unwrap_err();
        assert_eq!(err.kind(), "StructuralInconsistency");
        assert_eq!(err.command(), "find . -name a -o");
    }

    #[test]
    fn test_cleanup_runs_first() {
        let out = norm("sudo /usr/bin/find . -name x");
        assert_eq!(out.command, "find . -name x");
        assert!(out.tree.to_string().contains("HeadCommand(find)"));
    }
}
