//! Data-driven rule tables shared by the segmenters and the follow-up resolver.
//!
//! Each table is an ordered `Vec` of compiled patterns evaluated top to
//! bottom. New clinical phrasing is added as a table row, never as a branch.

use regex::Regex;

/// A rewrite applied to every match: `regex` → `replacement`.
pub struct Rewrite {
    pub regex: Regex,
    pub replacement: &'static str,
    pub description: &'static str,
}

/// A pattern that tags text with a category when it matches.
pub struct Matcher<T> {
    pub regex: Regex,
    pub tag: T,
    pub description: &'static str,
}

pub fn compile(regex_str: &str) -> Regex {
    Regex::new(regex_str).expect("Invalid review rule pattern")
}

pub fn rewrite(regex_str: &str, replacement: &'static str, description: &'static str) -> Rewrite {
    Rewrite {
        regex: compile(regex_str),
        replacement,
        description,
    }
}

pub fn matcher<T>(regex_str: &str, tag: T, description: &'static str) -> Matcher<T> {
    Matcher {
        regex: compile(regex_str),
        tag,
        description,
    }
}

/// Run every rewrite in order, each over the output of the previous one.
pub fn apply_rewrites(text: &str, rules: &[Rewrite]) -> String {
    let mut out = text.to_string();
    for rule in rules {
        if rule.regex.is_match(&out) {
            tracing::trace!(rule = rule.description, "Rewrite rule applied");
            out = rule.regex.replace_all(&out, rule.replacement).into_owned();
        }
    }
    out
}

/// First matcher (in table order) that fires on `text`.
pub fn first_match<'a, T>(text: &str, rules: &'a [Matcher<T>]) -> Option<&'a Matcher<T>> {
    rules.iter().find(|m| m.regex.is_match(text))
}
