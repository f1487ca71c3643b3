use std::collections::HashMap;

use chrono::NaiveDate;

use super::super::domain::{
    BusinessEntity, CalendarEntry, EntryId, EntryStatus, EventCategory, EventPriority,
    Notification, NotificationStatus,
};
use super::super::policy::RegulatoryWindows;
use super::views::{
    CategoryProgressEntry, ComplianceInsights, ComplianceReportSummary, EntrySnapshotView,
    PriorityLoadEntry, ReminderStats,
};

#[derive(Debug, Default, Clone)]
pub struct CategoryProgress {
    pub total: usize,
    pub completed: usize,
    pub cancelled: usize,
    pub overdue: usize,
}

#[derive(Debug, Default, Clone)]
pub struct PriorityLoad {
    pub open: usize,
    pub overdue: usize,
}

/// Raw aggregates for one entity's calendar. `summary()` turns this into
/// the serializable view handed to callers.
#[derive(Debug)]
pub struct ComplianceReport {
    pub entity: BusinessEntity,
    pub generated_on: NaiveDate,
    pub category_progress: HashMap<EventCategory, CategoryProgress>,
    pub priority_load: HashMap<EventPriority, PriorityLoad>,
    pub overdue_entries: Vec<EntrySnapshot>,
    pub upcoming_entries: Vec<EntrySnapshot>,
    pub reminder_stats: ReminderStats,
}

impl ComplianceReport {
    pub fn build(
        entity: BusinessEntity,
        entries: &[CalendarEntry],
        notifications: &[Notification],
        today: NaiveDate,
        upcoming_horizon_days: i64,
    ) -> Self {
        let mut category_progress: HashMap<EventCategory, CategoryProgress> = HashMap::new();
        let mut priority_load: HashMap<EventPriority, PriorityLoad> = HashMap::new();
        let mut overdue_entries = Vec::new();
        let mut upcoming_entries = Vec::new();

        for entry in entries {
            let progress = category_progress.entry(entry.category).or_default();
            progress.total += 1;
            match entry.status {
                EntryStatus::Completed => progress.completed += 1,
                EntryStatus::Cancelled => progress.cancelled += 1,
                EntryStatus::Pending => {}
            }

            if entry.is_open() {
                let load = priority_load.entry(entry.priority).or_default();
                load.open += 1;
                if entry.is_overdue(today) {
                    load.overdue += 1;
                }
            }

            if entry.is_overdue(today) {
                progress.overdue += 1;
                overdue_entries.push(EntrySnapshot::from_entry(entry, today));
            } else if entry.is_open() && entry.days_until_due(today) <= upcoming_horizon_days {
                upcoming_entries.push(EntrySnapshot::from_entry(entry, today));
            }
        }

        overdue_entries.sort_by(|a, b| a.due_date.cmp(&b.due_date));
        upcoming_entries.sort_by(|a, b| a.due_date.cmp(&b.due_date));

        let mut reminder_stats = ReminderStats::default();
        for notification in notifications {
            match notification.status {
                NotificationStatus::Pending => reminder_stats.pending += 1,
                NotificationStatus::Sent => reminder_stats.sent += 1,
                NotificationStatus::Failed => reminder_stats.failed += 1,
                NotificationStatus::Cancelled => reminder_stats.cancelled += 1,
            }
        }

        Self {
            entity,
            generated_on: today,
            category_progress,
            priority_load,
            overdue_entries,
            upcoming_entries,
            reminder_stats,
        }
    }

    pub fn summary(&self) -> ComplianceReportSummary {
        let category_progress = EventCategory::ordered()
            .into_iter()
            .filter_map(|category| {
                self.category_progress
                    .get(&category)
                    .map(|progress| CategoryProgressEntry {
                        category,
                        category_label: category.label(),
                        total: progress.total,
                        completed: progress.completed,
                        cancelled: progress.cancelled,
                        overdue: progress.overdue,
                    })
            })
            .collect();

        let priority_load = EventPriority::ordered()
            .into_iter()
            .filter_map(|priority| {
                self.priority_load
                    .get(&priority)
                    .map(|load| PriorityLoadEntry {
                        priority,
                        priority_label: priority.label(),
                        open: load.open,
                        overdue: load.overdue,
                    })
            })
            .collect();

        let overdue_entries = self
            .overdue_entries
            .iter()
            .map(EntrySnapshot::to_view)
            .collect();

        let upcoming_entries = self
            .upcoming_entries
            .iter()
            .map(EntrySnapshot::to_view)
            .collect();

        ComplianceReportSummary {
            entity_id: self.entity.id.0.clone(),
            legal_name: self.entity.legal_name.clone(),
            generated_on: self.generated_on,
            category_progress,
            priority_load,
            overdue_entries,
            upcoming_entries,
            reminder_stats: self.reminder_stats.clone(),
        }
    }
}

impl ComplianceReportSummary {
    pub fn insights(
        &self,
        entity: &BusinessEntity,
        today: NaiveDate,
        regulatory: &RegulatoryWindows,
    ) -> ComplianceInsights {
        super::generate_insights(self, entity, today, regulatory)
    }
}

#[derive(Debug, Clone)]
pub struct EntrySnapshot {
    pub id: EntryId,
    pub event_type: String,
    pub title: String,
    pub category: EventCategory,
    pub priority: EventPriority,
    pub due_date: NaiveDate,
    pub days_until_due: i64,
    pub status: EntryStatus,
}

impl EntrySnapshot {
    fn from_entry(entry: &CalendarEntry, today: NaiveDate) -> Self {
        Self {
            id: entry.id.clone(),
            event_type: entry.event_type.clone(),
            title: entry.title.clone(),
            category: entry.category,
            priority: entry.priority,
            due_date: entry.due_date,
            days_until_due: entry.days_until_due(today),
            status: entry.status,
        }
    }

    pub fn to_view(&self) -> EntrySnapshotView {
        EntrySnapshotView {
            id: self.id.0.clone(),
            event_type: self.event_type.clone(),
            title: self.title.clone(),
            category: self.category,
            category_label: self.category.label(),
            priority: self.priority,
            priority_label: self.priority.label(),
            due_date: self.due_date,
            days_until_due: self.days_until_due,
            status: self.status,
            status_label: self.status.label(),
        }
    }
}
