//! Diagnosis segmentation: one raw assessment cell → ordered, distinct
//! diagnosis statements with tooth numbers attached to the right statement.

use std::sync::LazyLock;

use regex::Regex;

use super::normalize::{capitalize_first, dedup_case_insensitive, normalize_space, strip_invisible};
use super::rules::compile;

/// Connector token after which the cell is administrative noise.
static FILLER: LazyLock<Regex> = LazyLock::new(|| compile(r"(?i)\bai\b"));
static STRONG_SPLIT: LazyLock<Regex> = LazyLock::new(|| compile(r"\s*(?:;|[\x{2013}\x{2014}])\s*"));
static TOOTH_ONLY: LazyLock<Regex> = LazyLock::new(|| compile(r"^\d{2}$"));
static LEADING_TOOTH: LazyLock<Regex> = LazyLock::new(|| compile(r"^(\d{2})\b[\s,.:]*"));
static TOOTH_LIST: LazyLock<Regex> = LazyLock::new(|| compile(r"\b\d{2}(?:\s*,\s*\d{2})*\b"));
static GIGI: LazyLock<Regex> = LazyLock::new(|| compile(r"(?i)\bgigi\b"));
static IMPACTION: LazyLock<Regex> = LazyLock::new(|| compile(r"(?i)\bimpa[kc]"));
static PERICORONITIS: LazyLock<Regex> = LazyLock::new(|| compile(r"(?i)peri[ck]oronitis"));

/// Segment a raw assessment cell into diagnosis statements.
pub fn segment_diagnosis(raw: &str) -> Vec<String> {
    let text = truncate_at_filler(raw);
    if text.is_empty() {
        return Vec::new();
    }

    let mut statements = attach_tooth_fragments(split_statements(&text));
    merge_pericoronitis_tooth(&mut statements);

    let labelled = statements
        .iter()
        .map(|s| label_teeth(s))
        .filter(|s| !s.is_empty())
        .collect();
    let out = dedup_case_insensitive(labelled);

    tracing::debug!(statements = out.len(), "Diagnosis segmented");
    out
}

/// Normalize the cell and cut it at the first filler connector.
pub fn truncate_at_filler(raw: &str) -> String {
    let text = normalize_space(&strip_invisible(raw));
    match FILLER.find(&text) {
        Some(m) => text[..m.start()]
            .trim_end_matches(|c: char| c.is_whitespace() || matches!(c, ',' | ';'))
            .to_string(),
        None => text,
    }
}

/// Split on semicolons and long dashes; a single resulting chunk is split
/// again on commas that open a new sentence.
fn split_statements(text: &str) -> Vec<String> {
    let chunks: Vec<&str> = STRONG_SPLIT
        .split(text)
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .collect();

    let chunks: Vec<String> = if chunks.len() == 1 {
        split_on_sentence_commas(chunks[0])
    } else {
        chunks.into_iter().map(str::to_string).collect()
    };

    chunks
        .into_iter()
        .map(|c| {
            c.trim()
                .trim_end_matches(|ch: char| ch.is_whitespace() || matches!(ch, ',' | '.'))
                .to_string()
        })
        .filter(|c| !c.is_empty())
        .collect()
}

/// A comma is a statement boundary only when followed by whitespace and
/// then an uppercase letter or a digit. "18,28" stays one tooth list.
fn split_on_sentence_commas(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut start = 0;
    for (idx, _) in text.match_indices(',') {
        let rest = &text[idx + 1..];
        let after_space = rest.trim_start();
        let had_space = after_space.len() < rest.len();
        let opens_sentence = after_space
            .chars()
            .next()
            .is_some_and(|c| c.is_uppercase() || c.is_ascii_digit());
        if had_space && opens_sentence {
            out.push(text[start..idx].to_string());
            start = idx + 1;
        }
    }
    out.push(text[start..].to_string());
    out
}

/// Bare two-digit chunks are tooth numbers of the preceding statement.
/// Numbers seen before any statement wait for the first one.
fn attach_tooth_fragments(chunks: Vec<String>) -> Vec<String> {
    let mut statements: Vec<String> = Vec::new();
    let mut pending: Vec<String> = Vec::new();

    for chunk in chunks {
        if TOOTH_ONLY.is_match(&chunk) {
            match statements.last_mut() {
                Some(prev) => append_tooth(prev, &chunk),
                None => pending.push(chunk),
            }
            continue;
        }
        let mut statement = capitalize_first(&chunk);
        for tooth in pending.drain(..) {
            append_tooth(&mut statement, &tooth);
        }
        statements.push(statement);
    }

    if !pending.is_empty() {
        tracing::debug!(dropped = pending.len(), "Tooth numbers without a statement discarded");
    }
    statements
}

fn append_tooth(statement: &mut String, tooth: &str) {
    let keep = statement
        .trim_end_matches(|c: char| c.is_whitespace() || matches!(c, '.' | ',' | ';' | ':'))
        .len();
    statement.truncate(keep);
    statement.push_str(", ");
    statement.push_str(tooth);
}

/// "Impaksi 38; 48 perikoronitis": 48 belongs to the impaction list.
fn merge_pericoronitis_tooth(statements: &mut [String]) {
    for i in 0..statements.len().saturating_sub(1) {
        if !IMPACTION.is_match(&statements[i]) || !PERICORONITIS.is_match(&statements[i + 1]) {
            continue;
        }
        let (tooth, consumed) = match LEADING_TOOTH.captures(&statements[i + 1]) {
            Some(caps) => (caps[1].to_string(), caps[0].len()),
            None => continue,
        };

        let already_listed = TOOTH_LIST
            .find_iter(&statements[i])
            .any(|m| m.as_str().split(',').any(|t| t.trim() == tooth));
        if !already_listed {
            append_tooth(&mut statements[i], &tooth);
        }
        let rest = statements[i + 1][consumed..].to_string();
        statements[i + 1] = capitalize_first(&rest);
    }
}

/// Insert "gigi" before the first tooth list when the statement lacks it.
fn label_teeth(statement: &str) -> String {
    if GIGI.is_match(statement) {
        return statement.to_string();
    }
    match TOOTH_LIST.find(statement) {
        Some(m) => capitalize_first(&format!(
            "{}gigi {}",
            &statement[..m.start()],
            &statement[m.start()..]
        )),
        None => statement.to_string(),
    }
}
