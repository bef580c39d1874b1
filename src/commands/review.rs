//! Batch and manual review command handlers.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::pipeline::source::collect_records;
use crate::pipeline::{JsonExportSource, PhysicianDirectory, ReviewError, ReviewOptions};
use crate::review::ManualEntry;
use crate::session::ReviewSession;

pub fn batch_options(
    operator: String,
    dpjp: Option<String>,
    target_date: Option<NaiveDate>,
    directory: PhysicianDirectory,
) -> ReviewOptions {
    ReviewOptions {
        operator,
        physician_override: dpjp.filter(|d| !d.trim().is_empty()),
        target_date,
        directory,
    }
}

/// Load every export into one session and render the numbered batch.
pub fn run_batch(inputs: &[PathBuf], options: &ReviewOptions) -> Result<String, ReviewError> {
    let sources: Vec<JsonExportSource> = inputs.iter().map(JsonExportSource::new).collect();
    let mut session = ReviewSession::new();
    session.extend(collect_records(&sources, options.target_date)?);
    tracing::info!(files = inputs.len(), records = session.len(), "Batch loaded");
    Ok(session.render(options))
}

pub fn run_manual(entry_path: &Path, index: usize, directory: &PhysicianDirectory) -> Result<String, ReviewError> {
    let bytes = std::fs::read(entry_path)?;
    let entry: ManualEntry = serde_json::from_slice(&bytes)?;
    if let Err(e) = entry.validate() {
        tracing::warn!(error = %e, "Manual entry rejected");
        return Err(e);
    }
    entry.render(index, directory)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXPORT: &str = r#"{
        "record_number": "253385",
        "patient_name": "BUDI SANTOSO",
        "birth_place_date": "PAREPARE 2004-09-04",
        "phone": "081234567890",
        "cppt": [
            {"timestamp": "2026-10-19<br>09:30:00", "physician": "drg. Ruslin",
             "assessment": "Impaksi 38", "plan": "Konsultasi, OPG"},
            {"timestamp": "2026-10-12<br>10:00:00", "physician": "drg. Gazali",
             "assessment": "Karies media 47", "plan": "Tumpatan"}
        ]
    }"#;

    fn write(dir: &tempfile::TempDir, name: &str, body: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn batch_from_export_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = write(&dir, "budi.json", EXPORT);
        let options = batch_options("Andi".into(), None, None, PhysicianDirectory::default());

        let text = run_batch(&[input], &options).unwrap();
        assert!(text.starts_with("1. Nama            : Budi Santoso\n"));
        assert!(text.contains("\u{2022} Tindakan        :\n    * Konsultasi\n    * OPG X-ray\n"));
        assert!(text.contains(
            "\u{2022} Kontrol         : Pro Odontektomi gigi 38 dalam lokal anestesi\n"
        ));
        assert!(text.contains("Muhammad Ruslin"));
    }

    #[test]
    fn target_date_selects_earlier_note() {
        let dir = tempfile::tempdir().unwrap();
        let input = write(&dir, "budi.json", EXPORT);
        let options = batch_options(
            "Andi".into(),
            None,
            NaiveDate::from_ymd_opt(2026, 10, 12),
            PhysicianDirectory::default(),
        );

        let text = run_batch(&[input], &options).unwrap();
        assert!(text.contains("\u{2022} Diagnosa        : Karies media gigi 47\n"));
        assert!(text.contains("Mohammad Gazali"));
    }

    #[test]
    fn files_are_merged_into_one_batch() {
        let dir = tempfile::tempdir().unwrap();
        let first = write(&dir, "budi.json", EXPORT);
        let second = write(
            &dir,
            "siti.json",
            r#"[{"record_number": "1253385", "patient_name": "SITI AMINAH", "cppt": []}]"#,
        );
        let options = batch_options("Andi".into(), None, None, PhysicianDirectory::default());

        let text = run_batch(&[first, second], &options).unwrap();
        assert!(text.starts_with("1. Nama            : Siti Aminah\n"));
        assert!(text.contains("\n\n2. Nama            : Budi Santoso\n"));
    }

    #[test]
    fn blank_dpjp_override_is_ignored() {
        let options = batch_options("Andi".into(), Some("  ".into()), None, PhysicianDirectory::default());
        assert!(options.physician_override.is_none());
    }

    #[test]
    fn missing_export_fails_batch() {
        let dir = tempfile::tempdir().unwrap();
        let options = batch_options(String::new(), None, None, PhysicianDirectory::default());
        let result = run_batch(&[dir.path().join("absent.json")], &options);
        assert!(matches!(result, Err(ReviewError::Io(_))));
    }

    #[test]
    fn manual_entry_renders() {
        let dir = tempfile::tempdir().unwrap();
        let entry = write(
            &dir,
            "entry.json",
            r#"{"name":"Siti","birth_date":"2001-02-03","record_number":"1253385",
                "diagnosis":"Fraktur mandibula","physician":"Yossy",
                "phone":"085211112222","operator":"Andi"}"#,
        );
        let text = run_manual(&entry, 3, &PhysicianDirectory::default()).unwrap();
        assert!(text.starts_with("3. Nama            : Siti\n"));
        assert!(text.contains("\u{2022} RM              : 1.25.33.85\n"));
        assert!(text.contains("Yossy Yoanita Ariestiana"));
    }

    #[test]
    fn incomplete_manual_entry_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let entry = write(&dir, "entry.json", r#"{"name":"Siti"}"#);
        match run_manual(&entry, 1, &PhysicianDirectory::default()) {
            Err(ReviewError::MissingFields(labels)) => {
                assert_eq!(labels, vec!["Tanggal Lahir", "RM", "Diagnosa", "DPJP", "No. Telp.", "Operator"]);
            }
            other => panic!("expected MissingFields, got {other:?}"),
        }
    }
}
