/// Collapse every whitespace run to a single space and trim both ends.
pub fn normalize_space(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Capitalize each whitespace-delimited token, lowercasing the rest of it.
/// Punctuation and diacritics inside a token are left alone.
pub fn title_case_keep(raw: &str) -> String {
    raw.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    let mut s: String = first.to_uppercase().collect();
                    s.push_str(&chars.as_str().to_lowercase());
                    s
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Uppercase the first character only.
pub fn capitalize_first(raw: &str) -> String {
    let mut chars = raw.chars();
    match chars.next() {
        Some(first) => {
            let mut s: String = first.to_uppercase().collect();
            s.push_str(chars.as_str());
            s
        }
        None => String::new(),
    }
}

/// Remove zero-width and control characters left behind by HTML export or OCR.
/// Newlines and tabs survive so segmenters can still see line structure.
pub fn strip_invisible(raw: &str) -> String {
    raw.chars()
        // &nbsp; from HTML cells
        .map(|c| if c == '\u{00A0}' { ' ' } else { c })
        .filter(|c| {
            if matches!(*c, ' ' | '\n' | '\t') {
                return true;
            }
            if matches!(
                *c,
                '\u{200B}'  // Zero-width space
                | '\u{200C}' // Zero-width non-joiner
                | '\u{200D}' // Zero-width joiner
                | '\u{2060}' // Word joiner
                | '\u{FEFF}' // BOM
            ) {
                return false;
            }
            !c.is_control()
        })
        .collect()
}

/// Case-insensitive, order-preserving de-duplication.
pub fn dedup_case_insensitive(items: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.to_lowercase()))
        .collect()
}
