//! Record sources: where `ClinicalRecord`s come from.
//!
//! The SIMRS patient page carries a header table (RM, name, place and date
//! of birth, phone) and nested CPPT tables of eight-column rows. A
//! `PatientExport` is that same content as JSON; `into_record` applies the
//! header clean-up and picks the note entry for review.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::identity::parse_flexible_date;
use super::normalize::{normalize_space, title_case_keep};
use super::rules::compile;
use super::ReviewError;
use crate::models::ClinicalRecord;

static PHONE: LazyLock<Regex> = LazyLock::new(|| compile(r"08\d{8,13}"));

static BIRTH_DATE: LazyLock<Regex> =
    LazyLock::new(|| compile(r"\d{4}[-/]\d{2}[-/]\d{2}|\d{2}[-/]\d{2}[-/]\d{4}"));

static TIMESTAMP_DATE: LazyLock<Regex> = LazyLock::new(|| compile(r"\d{4}-\d{2}-\d{2}"));
static TIMESTAMP_TIME: LazyLock<Regex> = LazyLock::new(|| compile(r"\d{2}:\d{2}:\d{2}"));

/// Objective findings are preferred as the diagnosis cell when they name
/// one of these conditions.
static KEY_CLINICAL_TERM: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"(?i)tumor|malignan|gangren|impak|karies|osteosarcom|carcinoma|odontogenic|odontektomi")
});

/// One CPPT row, in column order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoteEntry {
    /// Raw date cell, e.g. "2026-10-19 09:30:00" or "2026-10-19<br>09:30:00".
    pub timestamp: String,
    pub physician: String,
    pub subjective: String,
    pub objective_diagnosis: String,
    pub assessment: String,
    pub plan: String,
    pub instruction: String,
    pub evaluation: String,
}

/// One patient page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatientExport {
    pub record_number: String,
    pub patient_name: String,
    /// "PAREPARE 2004-09-04", "- 2004-09-04"
    pub birth_place_date: String,
    pub phone: String,
    pub cppt: Vec<NoteEntry>,
}

impl PatientExport {
    /// Clean the header and select the note entry to review.
    pub fn into_record(self, target_date: Option<NaiveDate>) -> ClinicalRecord {
        let birth_date = BIRTH_DATE
            .find(&self.birth_place_date)
            .map(|m| m.as_str().to_string())
            .unwrap_or_default();
        let phone = PHONE
            .find(&self.phone)
            .map(|m| m.as_str().to_string())
            .unwrap_or_else(|| normalize_space(&self.phone));

        let mut record = ClinicalRecord {
            patient_name: title_case_keep(&normalize_space(&self.patient_name)),
            record_number: normalize_space(&self.record_number),
            birth_date,
            phone,
            ..ClinicalRecord::default()
        };

        if let Some((timestamp, note)) = select_note(&self.cppt, target_date) {
            record.note_timestamp = Some(timestamp);
            record.physician_raw = normalize_space(&note.physician);
            record.assessment_text = diagnosis_cell(note).to_string();
            record.plan_text = note.plan.clone();
            record.instruction_text = note.instruction.clone();
        } else {
            tracing::debug!(rows = self.cppt.len(), "No usable CPPT entry");
        }
        record
    }
}

/// Latest row on `target_date`, or the latest row overall when no target
/// date is given. Nothing written on the target date selects nothing, so
/// the report shows empty sections. Rows whose date cell cannot be parsed
/// are skipped.
pub fn select_note(
    rows: &[NoteEntry],
    target_date: Option<NaiveDate>,
) -> Option<(NaiveDateTime, &NoteEntry)> {
    let dated: Vec<(NaiveDateTime, &NoteEntry)> = rows
        .iter()
        .filter_map(|row| parse_note_timestamp(&row.timestamp).map(|ts| (ts, row)))
        .collect();

    if dated.len() < rows.len() {
        tracing::debug!(skipped = rows.len() - dated.len(), "CPPT rows without a date skipped");
    }

    let selected = dated
        .into_iter()
        .filter(|(ts, _)| target_date.map_or(true, |target| ts.date() == target))
        .max_by_key(|(ts, _)| *ts);
    if selected.is_none() && target_date.is_some() {
        tracing::debug!(rows = rows.len(), "No CPPT entry on target date");
    }
    selected
}

/// Last `YYYY-MM-DD` in the cell plus its last `HH:MM:SS` (midnight when
/// absent). Falls back to looser date forms.
pub fn parse_note_timestamp(cell: &str) -> Option<NaiveDateTime> {
    let date = TIMESTAMP_DATE
        .find_iter(cell)
        .last()
        .and_then(|m| NaiveDate::parse_from_str(m.as_str(), "%Y-%m-%d").ok())
        .or_else(|| parse_flexible_date(cell))?;
    let time = TIMESTAMP_TIME
        .find_iter(cell)
        .last()
        .and_then(|m| NaiveTime::parse_from_str(m.as_str(), "%H:%M:%S").ok())
        .unwrap_or_default();
    Some(date.and_time(time))
}

fn diagnosis_cell(note: &NoteEntry) -> &str {
    if KEY_CLINICAL_TERM.is_match(&note.objective_diagnosis) {
        &note.objective_diagnosis
    } else {
        &note.assessment
    }
}

/// Anything that can produce a batch of records.
pub trait RecordSource {
    fn records(&self, target_date: Option<NaiveDate>) -> Result<Vec<ClinicalRecord>, ReviewError>;
}

/// JSON file holding one `PatientExport` or an array of them.
#[derive(Debug, Clone)]
pub struct JsonExportSource {
    path: PathBuf,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ExportFile {
    Many(Vec<PatientExport>),
    One(Box<PatientExport>),
}

impl JsonExportSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exports(&self) -> Result<Vec<PatientExport>, ReviewError> {
        let bytes = std::fs::read(&self.path)?;
        let exports = match serde_json::from_slice::<ExportFile>(&bytes)? {
            ExportFile::Many(list) => list,
            ExportFile::One(one) => vec![*one],
        };
        tracing::info!(
            path = %self.path.display(),
            patients = exports.len(),
            "Loaded patient exports"
        );
        Ok(exports)
    }
}

impl RecordSource for JsonExportSource {
    fn records(&self, target_date: Option<NaiveDate>) -> Result<Vec<ClinicalRecord>, ReviewError> {
        Ok(self
            .exports()?
            .into_iter()
            .map(|export| export.into_record(target_date))
            .collect())
    }
}

/// Records from several sources, in source order.
pub fn collect_records<S: RecordSource>(
    sources: &[S],
    target_date: Option<NaiveDate>,
) -> Result<Vec<ClinicalRecord>, ReviewError> {
    let mut records = Vec::new();
    for source in sources {
        records.extend(source.records(target_date)?);
    }
    Ok(records)
}
