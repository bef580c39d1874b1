pub mod record;
pub mod report;

pub use record::ClinicalRecord;
pub use report::DerivedReport;
