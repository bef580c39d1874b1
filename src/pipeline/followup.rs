//! Kontrol (follow-up) resolution.
//!
//! An ordered cascade over the segmented diagnosis, today's actions and the
//! pending orders. The first rule that fires decides the single follow-up
//! value.

use std::sync::LazyLock;

use chrono::{Days, NaiveDate};
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::identity::format_day_label;
use super::plan::{is_extraction_procedure, is_imaging_or_consult};
use super::rules::{compile, matcher, Matcher};

/// Postoperative-day-7 control marker.
pub const POD_VII: &str = "POD VII";

/// Explicit "nothing further" sentinel.
pub const NO_FOLLOW_UP: &str = "-";

/// Days after the target date for a post-reconstruction review.
const RECONSTRUCTIVE_REVIEW_DAYS: u64 = 3;

/// Which cascade step produced the follow-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FollowUpRule {
    /// Diagnosis names a tooth and today's visit was a consult/imaging work-up.
    ProposedProcedure,
    /// Extraction or odontectomy done today.
    ExtractionToday,
    /// Already at POD VII after major reconstruction.
    ReconstructiveReview,
    /// Already at POD VII, nothing further.
    Completed,
    /// A planned "Pro ..." order from the note.
    PendingOrder,
    /// Nothing to report.
    Empty,
}

/// Diagnosis → procedure proposed once the work-up is done. Tag is the
/// procedure name; capture group 1 is the tooth number.
static PROPOSED_PROCEDURES: LazyLock<Vec<Matcher<&'static str>>> = LazyLock::new(|| {
    vec![
        matcher(
            r"(?i)\bimpa[kc]\w*(?:\s+gigi)?\s+(\d{2})\b",
            "Odontektomi",
            "Impacted tooth",
        ),
        matcher(
            r"(?i)\bgangr[ae]n\w*\s+(?:pulpa?|radi[kx]s?|root)\w*(?:\s+gigi)?\s+(\d{2})\b",
            "Ekstraksi",
            "Gangrenous pulp or root",
        ),
    ]
});

static POD_MARKER: LazyLock<Regex> = LazyLock::new(|| compile(r"(?i)\bpod\s*(?:vii|7)\b"));

static RECONSTRUCTIVE: LazyLock<Regex> = LazyLock::new(|| {
    compile(
        r"(?i)\b(?:orif|rekonstruksi|reconstruction|bsso|le\s*fort|mandibulektomi|mandibulectomy|maksilektomi|maxillectomy|flap|graft)\b",
    )
});

static ODONTECTOMY: LazyLock<Regex> = LazyLock::new(|| compile(r"(?i)odontektomi"));

/// Resolve the Kontrol line.
///
/// Supplying `target_date` enables the dated variant, where a POD VII
/// diagnosis after reconstruction yields a concrete review date.
pub fn resolve_follow_up(
    diagnosis: &[String],
    actions: &[String],
    orders: &[String],
    target_date: Option<NaiveDate>,
) -> String {
    let (rule, value) = decide(diagnosis, actions, orders, target_date);
    tracing::debug!(rule = ?rule, dated = target_date.is_some(), "Follow-up resolved");
    value
}

/// The cascade itself, returning the rule that fired alongside the value.
pub fn decide(
    diagnosis: &[String],
    actions: &[String],
    orders: &[String],
    target_date: Option<NaiveDate>,
) -> (FollowUpRule, String) {
    let worked_up = actions.iter().any(|a| is_imaging_or_consult(a));

    if worked_up {
        for rule in PROPOSED_PROCEDURES.iter() {
            let tooth = diagnosis
                .iter()
                .find_map(|d| rule.regex.captures(d).map(|caps| caps[1].to_string()));
            if let Some(tooth) = tooth {
                return (
                    FollowUpRule::ProposedProcedure,
                    format!("Pro {} gigi {tooth} dalam lokal anestesi", rule.tag),
                );
            }
        }
    }

    if actions.iter().any(|a| is_extraction_procedure(a)) {
        return (FollowUpRule::ExtractionToday, POD_VII.to_string());
    }

    if diagnosis.iter().any(|d| POD_MARKER.is_match(d)) {
        let reconstructive = diagnosis.iter().any(|d| RECONSTRUCTIVE.is_match(d));
        let review_date = target_date
            .filter(|_| reconstructive)
            .and_then(|d| d.checked_add_days(Days::new(RECONSTRUCTIVE_REVIEW_DAYS)));
        return match review_date {
            Some(date) => (FollowUpRule::ReconstructiveReview, format_day_label(date)),
            None => (FollowUpRule::Completed, NO_FOLLOW_UP.to_string()),
        };
    }

    let order = orders
        .iter()
        .find(|o| ODONTECTOMY.is_match(o))
        .or_else(|| orders.first());
    match order {
        Some(o) => (FollowUpRule::PendingOrder, o.clone()),
        None => (FollowUpRule::Empty, String::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn impaction_after_consult_proposes_odontectomy() {
        let value = resolve_follow_up(
            &strings(&["Impaksi gigi 38"]),
            &strings(&["Konsultasi"]),
            &[],
            None,
        );
        assert_eq!(value, "Pro Odontektomi gigi 38 dalam lokal anestesi");
    }

    #[test]
    fn impaction_uses_first_tooth_of_list() {
        let value = resolve_follow_up(
            &strings(&["Impaksi gigi 18,28,38,48"]),
            &strings(&["Konsultasi", "OPG X-ray"]),
            &[],
            None,
        );
        assert_eq!(value, "Pro Odontektomi gigi 18 dalam lokal anestesi");
    }

    #[test]
    fn gangrene_after_imaging_proposes_extraction() {
        let (rule, value) = decide(
            &strings(&["Gangren radiks gigi 36"]),
            &strings(&["Periapikal X-ray"]),
            &[],
            None,
        );
        assert_eq!(rule, FollowUpRule::ProposedProcedure);
        assert_eq!(value, "Pro Ekstraksi gigi 36 dalam lokal anestesi");
    }

    #[test]
    fn impaction_without_workup_falls_through_to_orders() {
        let (rule, value) = decide(
            &strings(&["Impaksi gigi 38"]),
            &[],
            &strings(&["Pro Odontektomi gigi 38 dalam lokal anestesi"]),
            None,
        );
        assert_eq!(rule, FollowUpRule::PendingOrder);
        assert_eq!(value, "Pro Odontektomi gigi 38 dalam lokal anestesi");
    }

    #[test]
    fn extraction_today_means_pod_vii() {
        let value = resolve_follow_up(
            &strings(&["Gangren radiks gigi 36"]),
            &strings(&["Ekstraksi gigi 36 dalam lokal anestesi"]),
            &[],
            None,
        );
        assert_eq!(value, POD_VII);
    }

    #[test]
    fn pod_vii_diagnosis_without_reconstruction_is_done() {
        let value = resolve_follow_up(&strings(&["POD VII"]), &[], &[], None);
        assert_eq!(value, NO_FOLLOW_UP);
        let dated = NaiveDate::from_ymd_opt(2026, 10, 19);
        assert_eq!(resolve_follow_up(&strings(&["Pod vii"]), &[], &[], dated), NO_FOLLOW_UP);
    }

    #[test]
    fn pod_vii_after_reconstruction_gets_review_date() {
        let target = NaiveDate::from_ymd_opt(2026, 10, 19);
        let (rule, value) = decide(
            &strings(&["POD VII", "Post ORIF fraktur mandibula"]),
            &[],
            &[],
            target,
        );
        assert_eq!(rule, FollowUpRule::ReconstructiveReview);
        assert_eq!(value, "Kamis, 22/10/2026");
    }

    #[test]
    fn undated_variant_cannot_compute_review_date() {
        let value = resolve_follow_up(
            &strings(&["POD VII", "Post ORIF fraktur mandibula"]),
            &[],
            &[],
            None,
        );
        assert_eq!(value, NO_FOLLOW_UP);
    }

    #[test]
    fn odontectomy_order_preferred() {
        let value = resolve_follow_up(
            &[],
            &[],
            &strings(&[
                "Pro Ekstraksi gigi 46 dalam lokal anestesi",
                "Pro Odontektomi gigi 38 dalam lokal anestesi",
            ]),
            None,
        );
        assert_eq!(value, "Pro Odontektomi gigi 38 dalam lokal anestesi");
    }

    #[test]
    fn first_order_when_no_odontectomy() {
        let value = resolve_follow_up(&[], &[], &strings(&["Pro scaling"]), None);
        assert_eq!(value, "Pro scaling");
    }

    #[test]
    fn nothing_resolves_to_empty() {
        let (rule, value) = decide(&[], &[], &[], None);
        assert_eq!(rule, FollowUpRule::Empty);
        assert_eq!(value, "");
    }
}
