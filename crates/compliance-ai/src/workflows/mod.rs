pub mod compliance;
pub mod rules_import;
