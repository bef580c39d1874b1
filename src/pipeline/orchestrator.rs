//! Review pipeline orchestrator.
//!
//! Ties the stages together:
//! 1. Header identity (name, birth date, RM, phone)
//! 2. Diagnosis and plan segmentation (independent of each other)
//! 3. Follow-up resolution from both
//! 4. DPJP resolution
//! 5. Rendering
//!
//! Every stage is pure; the orchestrator never fails.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::diagnosis::segment_diagnosis;
use super::followup::resolve_follow_up;
use super::identity::{format_date_dmy, format_record_number};
use super::normalize::normalize_space;
use super::physician::{resolve_physician, PhysicianDirectory};
use super::plan::segment_plan;
use super::render::{render_batch, render_report};
use crate::models::{ClinicalRecord, DerivedReport};

/// Per-invocation settings shared by every record in a batch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReviewOptions {
    pub operator: String,
    /// Replaces the resolved DPJP on every report when non-empty.
    #[serde(default)]
    pub physician_override: Option<String>,
    /// Enables the date-aware follow-up variant.
    #[serde(default)]
    pub target_date: Option<NaiveDate>,
    #[serde(default)]
    pub directory: PhysicianDirectory,
}

impl ReviewOptions {
    pub fn new(operator: impl Into<String>) -> Self {
        Self {
            operator: operator.into(),
            ..Self::default()
        }
    }
}

/// Derive every review field of one record.
pub fn derive_report(record: &ClinicalRecord, index: usize, options: &ReviewOptions) -> DerivedReport {
    let diagnosis_items = segment_diagnosis(&record.assessment_text);
    let plan = segment_plan(&record.plan_text, &record.instruction_text);
    let follow_up = resolve_follow_up(
        &diagnosis_items,
        &plan.actions,
        &plan.orders,
        options.target_date,
    );
    let physician = resolve_physician(
        &normalize_space(&record.physician_raw),
        &options.directory,
        options.physician_override.as_deref(),
    );

    tracing::debug!(
        index,
        has_note = record.has_note(),
        diagnoses = diagnosis_items.len(),
        actions = plan.actions.len(),
        orders = plan.orders.len(),
        "Report derived"
    );

    DerivedReport {
        index,
        name: normalize_space(&record.patient_name),
        birth_date: format_date_dmy(&record.birth_date),
        record_number: format_record_number(&record.record_number),
        phone: normalize_space(&record.phone),
        diagnosis_items,
        treatment_items: plan.actions,
        follow_up,
        physician,
        operator: normalize_space(&options.operator),
    }
}

/// Review text for a single record, numbered 1.
pub fn build_review(record: &ClinicalRecord, options: &ReviewOptions) -> String {
    render_report(&derive_report(record, 1, options))
}

/// Sort by note timestamp (records without a note first), number from 1,
/// and render all blocks.
pub fn build_batch(records: &[ClinicalRecord], options: &ReviewOptions) -> String {
    render_batch(&derive_batch(records, options))
}

/// The derived reports of a batch, in output order.
pub fn derive_batch(records: &[ClinicalRecord], options: &ReviewOptions) -> Vec<DerivedReport> {
    let mut ordered: Vec<&ClinicalRecord> = records.iter().collect();
    ordered.sort_by_key(|r| r.note_timestamp);

    let reports: Vec<DerivedReport> = ordered
        .into_iter()
        .enumerate()
        .map(|(i, record)| derive_report(record, i + 1, options))
        .collect();

    tracing::info!(
        records = reports.len(),
        dated = options.target_date.is_some(),
        "Review batch built"
    );
    reports
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    const RUSLIN: &str =
        "Prof. drg. Muhammad Ruslin, M.Kes., Ph.D., Sp.B.M.M., Subsp. Orthognat-D (K)";

    fn at(ts: &str) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(ts, "%Y-%m-%d %H:%M:%S").ok()
    }

    fn odontectomy_record() -> ClinicalRecord {
        ClinicalRecord {
            patient_name: "Budi Santoso".into(),
            record_number: "253385".into(),
            birth_date: "2004-09-04".into(),
            phone: "081234567890".into(),
            note_timestamp: at("2026-10-19 09:30:00"),
            physician_raw: "drg. Ruslin".into(),
            assessment_text: "Impaksi 38".into(),
            plan_text: "Pro Odontektomi gigi 38".into(),
            instruction_text: String::new(),
        }
    }

    // =================================================================
    // END-TO-END
    // =================================================================

    #[test]
    fn odontectomy_end_to_end() {
        let text = build_review(&odontectomy_record(), &ReviewOptions::new("Andi"));

        assert!(text.starts_with("1. Nama            : Budi Santoso\n"));
        assert!(text.contains("\u{2022} RM              : 25.33.85\n"));
        assert!(text.contains("\u{2022} Tanggal Lahir   : 04/09/2004\n"));
        assert!(text.contains("\u{2022} Diagnosa        : Impaksi gigi 38\n"));
        assert!(text.contains("\u{2022} Tindakan        :\n"));
        assert!(text.contains(
            "\u{2022} Kontrol         : Pro Odontektomi gigi 38 dalam lokal anestesi\n"
        ));
        assert!(text.contains(&format!("\u{2022} DPJP            : {RUSLIN}\n")));
        assert!(text.ends_with("\u{2022} Operator        : Andi"));
    }

    #[test]
    fn derived_fields() {
        let report = derive_report(&odontectomy_record(), 4, &ReviewOptions::new(" Andi "));
        assert_eq!(report.index, 4);
        assert_eq!(report.record_number, "25.33.85");
        assert_eq!(report.birth_date, "04/09/2004");
        assert_eq!(report.physician, RUSLIN);
        assert_eq!(report.diagnosis_items, vec!["Impaksi gigi 38"]);
        assert!(report.treatment_items.is_empty());
        assert_eq!(report.follow_up, "Pro Odontektomi gigi 38 dalam lokal anestesi");
        assert_eq!(report.operator, "Andi");
    }

    #[test]
    fn consult_visit_proposes_odontectomy() {
        let record = ClinicalRecord {
            plan_text: "Konsultasi, OPG".into(),
            ..odontectomy_record()
        };
        let report = derive_report(&record, 1, &ReviewOptions::new("Andi"));
        assert_eq!(report.treatment_items, vec!["Konsultasi", "OPG X-ray"]);
        assert_eq!(report.follow_up, "Pro Odontektomi gigi 38 dalam lokal anestesi");
    }

    #[test]
    fn physician_override_wins() {
        let options = ReviewOptions {
            physician_override: Some("drg. Carolina Stevanie, Sp.B.M.M.".into()),
            ..ReviewOptions::new("Andi")
        };
        let report = derive_report(&odontectomy_record(), 1, &options);
        assert_eq!(report.physician, "drg. Carolina Stevanie, Sp.B.M.M.");
    }

    #[test]
    fn record_without_note_keeps_layout() {
        let record = ClinicalRecord {
            patient_name: "Siti".into(),
            record_number: "1253385".into(),
            ..ClinicalRecord::default()
        };
        let text = build_review(&record, &ReviewOptions::new("Andi"));
        assert_eq!(text.lines().count(), 9);
        assert!(text.contains("\u{2022} RM              : 1.25.33.85\n"));
        assert!(text.contains("\u{2022} Kontrol         :\n"));
        assert!(text.contains("\u{2022} DPJP            :\n"));
    }

    #[test]
    fn dated_variant_reaches_review_date() {
        let record = ClinicalRecord {
            assessment_text: "POD VII; Post ORIF fraktur mandibula".into(),
            plan_text: "Kontrol poli".into(),
            ..odontectomy_record()
        };
        let undated = derive_report(&record, 1, &ReviewOptions::new("Andi"));
        assert_eq!(undated.follow_up, "-");

        let options = ReviewOptions {
            target_date: NaiveDate::from_ymd_opt(2026, 10, 19),
            ..ReviewOptions::new("Andi")
        };
        let dated = derive_report(&record, 1, &options);
        assert_eq!(dated.follow_up, "Kamis, 22/10/2026");
    }

    // =================================================================
    // BATCH
    // =================================================================

    #[test]
    fn batch_sorted_by_timestamp_and_numbered() {
        let late = ClinicalRecord {
            patient_name: "Late".into(),
            note_timestamp: at("2026-10-19 15:00:00"),
            ..odontectomy_record()
        };
        let early = ClinicalRecord {
            patient_name: "Early".into(),
            note_timestamp: at("2026-10-19 08:00:00"),
            ..odontectomy_record()
        };
        let none = ClinicalRecord {
            patient_name: "Nameless".into(),
            ..ClinicalRecord::default()
        };

        let reports = derive_batch(&[late, early, none], &ReviewOptions::new("Andi"));
        let names: Vec<&str> = reports.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Nameless", "Early", "Late"]);
        let indices: Vec<usize> = reports.iter().map(|r| r.index).collect();
        assert_eq!(indices, vec![1, 2, 3]);
    }

    #[test]
    fn batch_text_joins_blocks() {
        let second = ClinicalRecord {
            patient_name: "Siti".into(),
            note_timestamp: at("2026-10-19 11:00:00"),
            ..odontectomy_record()
        };
        let text = build_batch(&[odontectomy_record(), second], &ReviewOptions::new("Andi"));
        assert_eq!(text.matches("\n\n").count(), 1);
        assert!(text.contains("Operator        : Andi\n\n2. Nama            : Siti"));
    }

    #[test]
    fn empty_batch_is_empty_text() {
        assert_eq!(build_batch(&[], &ReviewOptions::new("Andi")), "");
    }
}
