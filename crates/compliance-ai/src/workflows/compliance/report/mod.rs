mod insights;
mod summary;
pub mod views;

pub use summary::ComplianceReport;

pub(crate) use insights::generate_insights;
