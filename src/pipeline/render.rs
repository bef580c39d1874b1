//! Fixed-layout review text.
//!
//! ```text
//! 1. Nama            : Budi Santoso
//! • Tanggal Lahir   : 04/09/2004
//! • Tindakan        :
//!     * Konsultasi
//!     * OPG X-ray
//! ```

use crate::config::LABEL_WIDTH;
use crate::models::DerivedReport;

pub const LABEL_NAME: &str = "Nama";
pub const LABEL_BIRTH_DATE: &str = "Tanggal Lahir";
pub const LABEL_RECORD_NUMBER: &str = "RM";
pub const LABEL_DIAGNOSIS: &str = "Diagnosa";
pub const LABEL_TREATMENT: &str = "Tindakan";
pub const LABEL_FOLLOW_UP: &str = "Kontrol";
pub const LABEL_PHYSICIAN: &str = "DPJP";
pub const LABEL_PHONE: &str = "No. Telp.";
pub const LABEL_OPERATOR: &str = "Operator";

const BULLET: &str = "\u{2022}";
const ITEM_PREFIX: &str = "    * ";

/// Render one patient block. Lines are joined with `\n`, no trailing newline.
pub fn render_report(report: &DerivedReport) -> String {
    let mut lines = vec![
        main_line(report.index, LABEL_NAME, &report.name),
        bullet_line(LABEL_BIRTH_DATE, &report.birth_date),
        bullet_line(LABEL_RECORD_NUMBER, &report.record_number),
    ];
    lines.extend(list_lines(LABEL_DIAGNOSIS, &report.diagnosis_items));
    lines.extend(list_lines(LABEL_TREATMENT, &report.treatment_items));
    lines.push(bullet_line(LABEL_FOLLOW_UP, &report.follow_up));
    lines.push(bullet_line(LABEL_PHYSICIAN, &report.physician));
    lines.push(bullet_line(LABEL_PHONE, &report.phone));
    lines.push(bullet_line(LABEL_OPERATOR, &report.operator));
    lines.join("\n")
}

/// Render several blocks separated by one blank line.
pub fn render_batch(reports: &[DerivedReport]) -> String {
    reports
        .iter()
        .map(render_report)
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn main_line(index: usize, label: &str, value: &str) -> String {
    format!("{index}. {label:<width$} : {value}", width = LABEL_WIDTH)
        .trim_end()
        .to_string()
}

fn bullet_line(label: &str, value: &str) -> String {
    format!("{BULLET} {label:<width$} : {value}", width = LABEL_WIDTH)
        .trim_end()
        .to_string()
}

/// Inline for zero or one item, otherwise a header line plus one bullet per item.
fn list_lines(label: &str, items: &[String]) -> Vec<String> {
    if items.len() <= 1 {
        let value = items.first().map(String::as_str).unwrap_or("");
        return vec![bullet_line(label, value)];
    }
    let mut lines = Vec::with_capacity(items.len() + 1);
    lines.push(bullet_line(label, ""));
    lines.extend(items.iter().map(|item| format!("{ITEM_PREFIX}{item}")));
    lines
}
