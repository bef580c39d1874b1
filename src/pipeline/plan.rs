//! Plan segmentation and classification.
//!
//! The Plan/Monitoring cell (plus the Instruksi cell) is a run-on mix of
//! procedures done today, planned procedures ("Pro ..."), prescriptions,
//! and home-care advice. This module splits it into line items, drops the
//! noise, canonicalizes terminology, and partitions the rest into today's
//! actions (tindakan) and future orders.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use super::normalize::{capitalize_first, dedup_case_insensitive, normalize_space, strip_invisible};
use super::rules::{apply_rewrites, compile, first_match, matcher, rewrite, Matcher, Rewrite};

/// Fixed wound-care line added when sutures come out without irrigation.
pub const WOUND_CARE_LINE: &str = "Irigasi luka dengan NaCl 0.9%";

/// Consult line implied by imaging/consult work done today.
pub const CONSULT_LINE: &str = "Konsultasi";

/// Section labels that are headers, not content.
const HEADER_PREFIXES: &[&str] = &["instruksi", "evaluasi"];

/// How a single plan line is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanItemKind {
    /// Performed on the note's date.
    Action,
    /// Planned or conditional, marked with a leading "Pro".
    Order,
    /// Prescription, supply, diet or education noise.
    NonActionable(NoiseKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoiseKind {
    Prescription,
    Supply,
    HomeCare,
    Education,
}

/// Classified plan output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanItems {
    /// Tindakan: work done today.
    pub actions: Vec<String>,
    /// Kontrol candidates: "Pro ..." items.
    pub orders: Vec<String>,
}

// ═══════════════════════════════════════════════════════════
// Rule tables
// ═══════════════════════════════════════════════════════════

/// "X-rayPro Odontektomi": marker glued to the previous word.
static ORDER_MARKER_RUN_ON: LazyLock<Regex> =
    LazyLock::new(|| compile(r"([A-Za-z0-9.)])(Pro[ \t-])"));

/// "OPG pro odontektomi": marker after other text on the same line.
static ORDER_MARKER_SPACED: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?i)(\S)[ \t]+(pro[ \t-])"));

/// Lead-in words left behind when a marker split takes the rest of the line.
static CONNECTOR_ONLY: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"(?i)^(?:rencana|plan|p|lalu|kemudian|selanjutnya|dan|lanjut|dilanjutkan)\s*:?$")
});

static BULLETS: LazyLock<Regex> =
    LazyLock::new(|| compile(r"[\x{2022}\x{00B7}\x{25CF}\x{25AA}\x{2023};]"));

/// A dash used as a separator, not a hyphen inside a word ("X-ray").
static DASH_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?m)(?:^|[ \t])[-\x{2013}\x{2014}]+\s*|[\x{2013}\x{2014}]"));

static ORDER_LINE: LazyLock<Regex> = LazyLock::new(|| compile(r"(?i)^pro\b"));

static PRESCRIPTION_MARKER: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?i)(?:\bR/|\bRx\b|\bresep\b)"));

static SUTURE_REMOVAL: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?i)aff\s*hecting|angkat\s+jahitan"));

static WOUND_IRRIGATION: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?i)irigasi|irrigation|spooling"));

static IMAGING_OR_CONSULT: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?i)x-ray|\bopg\b|periapikal|\bcbct\b|rontgen|\bkonsul"));

static EXTRACTION_PROCEDURE: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?i)\b(?:ekstraksi|odontektomi)\b"));

/// Lines that carry no clinical action. Checked top to bottom.
static NON_ACTIONABLE: LazyLock<Vec<Matcher<NoiseKind>>> = LazyLock::new(|| {
    vec![
        matcher(
            r"(?i)\b\d+(?:[.,]\d+)?\s*(?:mg|mcg|ml|cc|gr|gram)\b",
            NoiseKind::Prescription,
            "Dosage amount",
        ),
        matcher(
            r"(?i)\b\d+\s*[x\x{00D7}]\s*\d+\b",
            NoiseKind::Prescription,
            "Dosing frequency (3x1)",
        ),
        matcher(
            r"(?i)\b(?:tab|tablet|kaps|kapsul|caps|sirup|syr|salep|obat|puyer)\b",
            NoiseKind::Prescription,
            "Dosage form",
        ),
        matcher(
            r"(?i)\b(?:amoxicillin|amoksisilin|asam\s+mefenamat|mefenamic|paracetamol|parasetamol|ibuprofen|metronidazol\w*|clindamycin|klindamisin|cefadroxil|cefixime|dexamethason\w*|ketorolac|natrium\s+diklofenak|chlorhexidine|povidone)\b",
            NoiseKind::Prescription,
            "Drug name",
        ),
        matcher(
            r"(?i)\b(?:kasa|tampon|spuit|handscoon|sarung\s+tangan|masker|cotton\s+roll|benang|kapas)\b",
            NoiseKind::Supply,
            "Equipment or supply",
        ),
        matcher(
            r"(?i)\b(?:diet|makan\w*|minum\w*|kompres|hindari|jangan|istirahat|kumur\w*|sikat\s+gigi|tidur)\b",
            NoiseKind::HomeCare,
            "Diet or take-home care",
        ),
        matcher(
            r"(?i)^(?:edukasi|kie|dhe)\b",
            NoiseKind::Education,
            "Patient education",
        ),
    ]
});

/// The one terminology table. Order matters: imaging expansions run
/// before the generic X-ray spelling fix.
static TERMINOLOGY: LazyLock<Vec<Rewrite>> = LazyLock::new(|| {
    vec![
        rewrite(r"(?i)\bopg(?:\s*x[\s-]?ray)?\b", "OPG X-ray", "OPG imaging"),
        rewrite(
            r"(?i)\bperiapi[kc]al(?:\s*x[\s-]?ray)?\b",
            "Periapikal X-ray",
            "Periapical imaging",
        ),
        rewrite(r"(?i)\bcbct\b", "CBCT", "CBCT imaging"),
        rewrite(r"(?i)\bx[\s-]?ray\b", "X-ray", "X-ray spelling"),
        rewrite(
            r"(?i)^konsul(?:\s+(?:interna|ipd|penyakit\s+dalam))?$",
            "Konsul interna",
            "Bare consult means internal medicine",
        ),
        rewrite(r"(?i)\bkonsultasi\b", "Konsultasi", "Consultation"),
        rewrite(r"(?i)\bodontektomi\b", "Odontektomi", "Odontectomy"),
        rewrite(r"(?i)\bekstraksi\b", "Ekstraksi", "Extraction"),
        rewrite(
            r"(?i)\b(?:aff\s*hecting|angkat\s+jahitan|aff\s+jahitan)\b",
            "Aff hecting",
            "Suture removal",
        ),
        rewrite(r"(?i)\bpod\s*(?:vii|7)\b", "POD VII", "Postoperative day 7"),
        rewrite(r"(?i)^pro[\s-]+", "Pro ", "Order marker"),
    ]
});

/// A procedure phrase and where its name and tooth list sit.
struct ProcedureShape {
    regex: Regex,
    procedure_group: usize,
    teeth_group: usize,
    description: &'static str,
}

/// Procedure + tooth phrasings collapsed to one canonical sentence.
static PROCEDURE_SHAPES: LazyLock<Vec<ProcedureShape>> = LazyLock::new(|| {
    vec![
        ProcedureShape {
            regex: compile(
                r"(?i)\b(odontektomi|ekstraksi)(?:\s*gigi)?\s*(\d{2}(?:\s*,\s*\d{2})*)\b.*$",
            ),
            procedure_group: 1,
            teeth_group: 2,
            description: "Procedure then tooth",
        },
        ProcedureShape {
            regex: compile(
                r"(?i)\bgigi\s+(\d{2}(?:\s*,\s*\d{2})*)\s+(?:di)?(odontektomi|ekstraksi)\b.*$",
            ),
            procedure_group: 2,
            teeth_group: 1,
            description: "Tooth then procedure",
        },
    ]
});

// ═══════════════════════════════════════════════════════════
// Pipeline
// ═══════════════════════════════════════════════════════════

/// Segment and classify the plan and instruction cells.
pub fn segment_plan(plan: &str, instruction: &str) -> PlanItems {
    let joined = strip_invisible(&format!("{plan}\n{instruction}"));
    let lines = split_lines(&joined);

    let mut items = Vec::with_capacity(lines.len());
    let mut dropped = 0usize;
    for line in lines {
        if let Some(noise) = noise_kind(&line) {
            tracing::trace!(kind = ?noise, "Plan line dropped as non-actionable");
            dropped += 1;
            continue;
        }
        let normalized = apply_rewrites(&line, &TERMINOLOGY);
        let canonical = canonicalize_procedure(&normalized);
        let stripped = strip_prescription_clause(&canonical);
        if !stripped.is_empty() {
            items.push(stripped);
        }
    }

    let mut items = dedup_case_insensitive(items);

    let has_suture_removal = items.iter().any(|i| SUTURE_REMOVAL.is_match(i));
    let has_irrigation = items.iter().any(|i| WOUND_IRRIGATION.is_match(i));
    if has_suture_removal && !has_irrigation {
        items.insert(0, WOUND_CARE_LINE.to_string());
    }

    let (orders, mut actions): (Vec<String>, Vec<String>) =
        items.into_iter().partition(|i| classify(i) == PlanItemKind::Order);

    let implies_consult = actions.iter().any(|a| is_imaging_or_consult(a));
    let has_consult = actions.iter().any(|a| a.eq_ignore_ascii_case(CONSULT_LINE));
    if implies_consult && !has_consult {
        actions.insert(0, CONSULT_LINE.to_string());
    }

    tracing::debug!(
        actions = actions.len(),
        orders = orders.len(),
        dropped,
        "Plan segmented"
    );

    PlanItems { actions, orders }
}

/// Classify one normalized plan line.
pub fn classify(line: &str) -> PlanItemKind {
    if let Some(noise) = noise_kind(line) {
        return PlanItemKind::NonActionable(noise);
    }
    if ORDER_LINE.is_match(line) {
        PlanItemKind::Order
    } else {
        PlanItemKind::Action
    }
}

/// Imaging or consult work ("OPG X-ray", "Konsul interna").
pub fn is_imaging_or_consult(item: &str) -> bool {
    IMAGING_OR_CONSULT.is_match(item)
}

/// Names an extraction or odontectomy.
pub fn is_extraction_procedure(item: &str) -> bool {
    EXTRACTION_PROCEDURE.is_match(item)
}

/// Break the joined cells into trimmed candidate lines.
fn split_lines(text: &str) -> Vec<String> {
    let t = ORDER_MARKER_RUN_ON.replace_all(text, "${1}\n${2}");
    let t = ORDER_MARKER_SPACED.replace_all(&t, "${1}\n${2}");
    let t = BULLETS.replace_all(&t, "\n");
    let t = DASH_SEPARATOR.replace_all(&t, "\n");
    let t = split_commas_keep_teeth(&t);

    t.lines()
        .map(|line| {
            normalize_space(line)
                .trim_matches(|c: char| c.is_whitespace() || matches!(c, '.' | ';'))
                .to_string()
        })
        .filter(|line| !line.is_empty() && !CONNECTOR_ONLY.is_match(line))
        .filter(|line| {
            let lower = line.to_lowercase();
            !HEADER_PREFIXES.iter().any(|h| lower.starts_with(h))
        })
        .collect()
}

/// Every comma becomes a line break unless a tooth number follows it
/// ("14, 15, 16" stays together).
fn split_commas_keep_teeth(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut start = 0;
    for (idx, _) in text.match_indices(',') {
        out.push_str(&text[start..idx]);
        if starts_with_tooth_number(&text[idx + 1..]) {
            out.push(',');
        } else {
            out.push('\n');
        }
        start = idx + 1;
    }
    out.push_str(&text[start..]);
    out
}

fn starts_with_tooth_number(rest: &str) -> bool {
    let mut chars = rest.trim_start_matches([' ', '\t']).chars();
    matches!(
        (chars.next(), chars.next(), chars.next()),
        (Some(a), Some(b), next) if a.is_ascii_digit() && b.is_ascii_digit()
            && !next.is_some_and(|c| c.is_ascii_digit())
    )
}

/// Only the text before a prescription marker decides whether a line is
/// noise, so "Ekstraksi 36 R/ Amoxicillin" still counts as an action.
fn noise_kind(line: &str) -> Option<NoiseKind> {
    let head = match PRESCRIPTION_MARKER.find(line) {
        Some(m) => &line[..m.start()],
        None => line,
    };
    if head.trim().is_empty() {
        return Some(NoiseKind::Prescription);
    }
    first_match(head, &NON_ACTIONABLE).map(|m| {
        tracing::trace!(rule = m.description, "Non-actionable rule matched");
        m.tag
    })
}

/// "Pro odontektomi 38 dgn LA" → "Pro Odontektomi gigi 38 dalam lokal anestesi".
/// The tooth list may be glued to the procedure name ("odontektomi38").
fn canonicalize_procedure(line: &str) -> String {
    for shape in PROCEDURE_SHAPES.iter() {
        if !shape.regex.is_match(line) {
            continue;
        }
        tracing::trace!(shape = shape.description, "Procedure canonicalized");
        return shape
            .regex
            .replace(line, |caps: &Captures| {
                let procedure = capitalize_first(&caps[shape.procedure_group].to_lowercase());
                let teeth = caps[shape.teeth_group]
                    .split(',')
                    .map(str::trim)
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("{procedure} gigi {teeth} dalam lokal anestesi")
            })
            .into_owned();
    }
    line.to_string()
}

/// Remove a prescription note appended to an action line.
fn strip_prescription_clause(line: &str) -> String {
    let kept = match PRESCRIPTION_MARKER.find(line) {
        Some(m) => &line[..m.start()],
        None => line,
    };
    kept.trim_end_matches(|c: char| c.is_whitespace() || matches!(c, '.' | ',' | ';' | ':'))
        .trim_start()
        .to_string()
}
