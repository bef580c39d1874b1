use serde::{Deserialize, Serialize};

/// Fully formatted review fields for one patient, ready to render.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedReport {
    /// 1-based position in the batch.
    pub index: usize,
    pub name: String,
    pub birth_date: String,
    pub record_number: String,
    pub phone: String,
    pub diagnosis_items: Vec<String>,
    pub treatment_items: Vec<String>,
    /// `"-"` means explicitly no follow-up.
    pub follow_up: String,
    pub physician: String,
    pub operator: String,
}
