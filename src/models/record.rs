use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One patient's selected CPPT entry plus the header identity fields.
///
/// When no note entry was selected, `note_timestamp` is `None` and every
/// note-derived field is an empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClinicalRecord {
    pub patient_name: String,
    pub record_number: String,
    pub birth_date: String,
    pub phone: String,
    #[serde(default)]
    pub note_timestamp: Option<NaiveDateTime>,
    #[serde(default)]
    pub physician_raw: String,
    #[serde(default)]
    pub assessment_text: String,
    #[serde(default)]
    pub plan_text: String,
    #[serde(default)]
    pub instruction_text: String,
}

impl ClinicalRecord {
    pub fn has_note(&self) -> bool {
        self.note_timestamp.is_some()
    }
}
