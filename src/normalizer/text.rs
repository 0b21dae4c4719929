//! Command text cleanup
//!
//! Textual repairs applied before parsing. Commands collected from the web
//! carry prompts, `sudo`, typographic punctuation and a handful of recurring
//! typos that would otherwise make the parser reject them or produce a
//! different tree for the same command.

use regex_lite::Regex;

/// Plain substring rewrites, applied in order.
const REPLACEMENTS: &[(&str, &str)] = &[
    ("/usr/bin/find ", "find "),
    ("/bin/find ", "find "),
    ("/usr/bin/grep ", "grep "),
    ("/bin/rm ", "rm "),
    ("/bin/mv ", "mv "),
    ("/bin/echo ", "echo "),
    ("-i{}", "-I {}"),
    ("-I{}", "-I {}"),
    ("\u{2014} ", "-"),
    ("\u{2014}", "-"),
    ("\u{2013}", "-"),
    ("-\u{043e}", "-o"),
    (" [] ", " {} "),
    ("-\\(", "\\("),
    ("-\\)", "\\)"),
    ("\"\\)", "\" \\)"),
    ("\u{2018}", "'"),
    ("\u{2019}", "'"),
    ("\u{201c}", "\""),
    ("\u{201d}", "\""),
];

lazy_static::lazy_static! {
    static ref SUDO: Regex = Regex::new(r"\bsudo\s+").unwrap();
    static ref PROMPT: Regex = Regex::new(r"^[$#](?:\s+|(find\s))").unwrap();
    static ref TAR_BUNDLE: Regex = Regex::new(r"(^|\|\s*)tar ([A-Za-z])").unwrap();
}

/// Clean `command` for parsing. Returns an empty string for blank input.
pub fn clean(command: &str) -> String {
    let mut cmd = command.replace('\n', " ").trim().to_string();
    cmd = SUDO.replace_all(&cmd, "").into_owned();
    for (from, to) in REPLACEMENTS {
        if cmd.contains(from) {
            cmd = cmd.replace(from, to);
        }
    }
    cmd = PROMPT.replace(&cmd, "${1}").into_owned();
    // the first argument of tar is always an option bundle
    cmd = TAR_BUNDLE.replace_all(&cmd, "${1}tar -${2}").into_owned();
    cmd.trim().to_string()
}
