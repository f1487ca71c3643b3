mod mapping;
mod normalizer;
mod parser;

use crate::workflows::compliance::{ComplianceCatalog, RuleOverride, RuleOverrides};
use std::io::Read;
use std::path::Path;

#[derive(Debug)]
pub enum RulesImportError {
    Io(std::io::Error),
    Csv(csv::Error),
}

impl std::fmt::Display for RulesImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RulesImportError::Io(err) => {
                write!(f, "failed to read compliance rules export: {}", err)
            }
            RulesImportError::Csv(err) => {
                write!(f, "invalid compliance rules CSV data: {}", err)
            }
        }
    }
}

impl std::error::Error for RulesImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RulesImportError::Io(err) => Some(err),
            RulesImportError::Csv(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for RulesImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for RulesImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// What one import run produced: the override table ready to layer onto a
/// catalog, plus the rows that could not be applied.
#[derive(Debug, Default)]
pub struct ImportSummary {
    pub overrides: RuleOverrides,
    pub skipped: Vec<String>,
}

impl ImportSummary {
    pub fn applied(&self) -> usize {
        self.overrides.len()
    }
}

pub struct RulesImporter;

impl RulesImporter {
    pub fn from_path<P: AsRef<Path>>(
        path: P,
        catalog: &ComplianceCatalog,
    ) -> Result<ImportSummary, RulesImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file, catalog)
    }

    /// Load override rows against an existing catalog. Overrides refine
    /// templates that already exist; rows naming unknown event types or
    /// entity types are reported in the summary, never applied. The first
    /// row for a given state, entity type, and event type wins.
    pub fn from_reader<R: Read>(
        reader: R,
        catalog: &ComplianceCatalog,
    ) -> Result<ImportSummary, RulesImportError> {
        let mut summary = ImportSummary::default();

        for record in parser::parse_records(reader)? {
            if record.state.is_empty() {
                summary
                    .skipped
                    .push(format!("{}: row missing a state code", record.event_type));
                continue;
            }
            let Some(entity_type) = mapping::entity_type_for_normalized(&record.entity_type)
            else {
                summary.skipped.push(format!(
                    "{} {}: unrecognized entity type {:?}",
                    record.state, record.event_type, record.entity_type
                ));
                continue;
            };
            if catalog.template(&record.event_type).is_none() {
                summary.skipped.push(format!(
                    "{} {}: no catalog template for this event type",
                    record.state, record.event_type
                ));
                continue;
            }
            let due = match mapping::resolve_rule(&record) {
                Ok(due) => due,
                Err(reason) => {
                    summary.skipped.push(format!(
                        "{} {}: {}",
                        record.state, record.event_type, reason
                    ));
                    continue;
                }
            };
            if summary
                .overrides
                .lookup(&record.state, entity_type, &record.event_type)
                .is_some()
            {
                continue;
            }

            summary.overrides.insert(
                &record.state,
                entity_type,
                &record.event_type,
                RuleOverride {
                    due,
                    lead_times: record.lead_times.clone(),
                },
            );
        }

        Ok(summary)
    }
}
