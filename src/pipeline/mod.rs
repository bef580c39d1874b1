pub mod normalize;
pub mod rules;
pub mod identity;
pub mod physician;
pub mod diagnosis;
pub mod plan;
pub mod followup;
pub mod render;
pub mod orchestrator;
pub mod source;

use thiserror::Error;

pub use orchestrator::{build_batch, build_review, derive_batch, derive_report, ReviewOptions};
pub use physician::{PhysicianDirectory, PhysicianEntry};
pub use source::{JsonExportSource, PatientExport, RecordSource};

/// The pipeline itself never fails; these are the surfaces around it.
#[derive(Error, Debug)]
pub enum ReviewError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("Invalid date '{0}': expected YYYY-MM-DD or DD/MM/YYYY")]
    InvalidDate(String),
}
