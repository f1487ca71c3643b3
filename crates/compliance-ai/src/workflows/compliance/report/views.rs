use chrono::NaiveDate;
use serde::Serialize;

use super::super::domain::{EntryStatus, EventCategory, EventPriority};

#[derive(Debug, Clone, Serialize)]
pub struct CategoryProgressEntry {
    pub category: EventCategory,
    pub category_label: &'static str,
    pub total: usize,
    pub completed: usize,
    pub cancelled: usize,
    pub overdue: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct PriorityLoadEntry {
    pub priority: EventPriority,
    pub priority_label: &'static str,
    pub open: usize,
    pub overdue: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct EntrySnapshotView {
    pub id: String,
    pub event_type: String,
    pub title: String,
    pub category: EventCategory,
    pub category_label: &'static str,
    pub priority: EventPriority,
    pub priority_label: &'static str,
    pub due_date: NaiveDate,
    pub days_until_due: i64,
    pub status: EntryStatus,
    pub status_label: &'static str,
}

#[derive(Debug, Default, Clone, Serialize)]
pub struct ReminderStats {
    pub pending: usize,
    pub sent: usize,
    pub failed: usize,
    pub cancelled: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ComplianceReportSummary {
    pub entity_id: String,
    pub legal_name: String,
    pub generated_on: NaiveDate,
    pub category_progress: Vec<CategoryProgressEntry>,
    pub priority_load: Vec<PriorityLoadEntry>,
    pub overdue_entries: Vec<EntrySnapshotView>,
    pub upcoming_entries: Vec<EntrySnapshotView>,
    pub reminder_stats: ReminderStats,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StandingLevel {
    GoodStanding,
    Monitor,
    AtRisk,
    Delinquent,
}

impl StandingLevel {
    pub const fn label(self) -> &'static str {
        match self {
            Self::GoodStanding => "Good Standing",
            Self::Monitor => "Monitor",
            Self::AtRisk => "At Risk",
            Self::Delinquent => "Delinquent",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ComplianceInsights {
    pub standing_score: u8,
    pub standing_level: StandingLevel,
    pub open_obligations: usize,
    pub overdue_obligations: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_deadline: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_deadline_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub focus_category: Option<&'static str>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub observations: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recommended_actions: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub automation_triggers: Vec<String>,
}
