//! Manual review entry.
//!
//! A hand-typed review for patients without an export. Diagnosis and
//! treatment are free text, one item per line; the rest are single values.
//! Output goes through the same renderer as derived reports.

use serde::{Deserialize, Serialize};

use crate::models::DerivedReport;
use crate::pipeline::identity::{format_date_dmy, format_record_number};
use crate::pipeline::normalize::{capitalize_first, dedup_case_insensitive, normalize_space};
use crate::pipeline::render::{
    render_report, LABEL_BIRTH_DATE, LABEL_DIAGNOSIS, LABEL_NAME, LABEL_OPERATOR, LABEL_PHONE,
    LABEL_PHYSICIAN, LABEL_RECORD_NUMBER,
};
use crate::pipeline::{PhysicianDirectory, ReviewError};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManualEntry {
    pub name: String,
    pub birth_date: String,
    pub record_number: String,
    /// One diagnosis per line.
    pub diagnosis: String,
    /// One treatment item per line.
    pub treatment: String,
    pub follow_up: String,
    pub physician: String,
    pub phone: String,
    pub operator: String,
}

impl ManualEntry {
    /// Labels of required fields left blank, in form order.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            (LABEL_NAME, &self.name),
            (LABEL_BIRTH_DATE, &self.birth_date),
            (LABEL_RECORD_NUMBER, &self.record_number),
            (LABEL_DIAGNOSIS, &self.diagnosis),
            (LABEL_PHYSICIAN, &self.physician),
            (LABEL_PHONE, &self.phone),
            (LABEL_OPERATOR, &self.operator),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(label, _)| label)
        .collect()
    }

    pub fn validate(&self) -> Result<(), ReviewError> {
        let missing = self.missing_fields();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ReviewError::MissingFields(missing))
        }
    }

    /// Format every field; the physician is resolved against `directory`.
    pub fn to_report(&self, index: usize, directory: &PhysicianDirectory) -> DerivedReport {
        DerivedReport {
            index,
            name: normalize_space(&self.name),
            birth_date: format_date_dmy(&self.birth_date),
            record_number: format_record_number(&self.record_number),
            phone: normalize_space(&self.phone),
            diagnosis_items: line_items(&self.diagnosis),
            treatment_items: line_items(&self.treatment),
            follow_up: normalize_space(&self.follow_up),
            physician: directory.resolve(&normalize_space(&self.physician)),
            operator: normalize_space(&self.operator),
        }
    }

    /// Validate, then render as block number `index`.
    pub fn render(&self, index: usize, directory: &PhysicianDirectory) -> Result<String, ReviewError> {
        self.validate()?;
        Ok(render_report(&self.to_report(index, directory)))
    }
}

fn line_items(text: &str) -> Vec<String> {
    let items = text
        .lines()
        .map(|line| normalize_space(line.trim_start_matches(['-', '*', '\u{2022}'])))
        .filter(|line| !line.is_empty())
        .map(|line| capitalize_first(&line))
        .collect();
    dedup_case_insensitive(items)
}
