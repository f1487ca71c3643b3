use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::domain::{
    BusinessEntity, CalendarEntry, EntityId, EntryId, Notification, NotificationId,
    ReminderUrgency,
};

/// Read side of the entity directory. The engine never mutates entity
/// records.
pub trait EntityStore: Send + Sync {
    fn get(&self, id: &EntityId) -> Result<Option<BusinessEntity>, StoreError>;
}

/// Persistence seam for calendar entries.
pub trait CalendarStore: Send + Sync {
    fn insert(&self, entry: CalendarEntry) -> Result<CalendarEntry, StoreError>;

    fn update(&self, entry: CalendarEntry) -> Result<(), StoreError>;

    fn fetch(&self, id: &EntryId) -> Result<Option<CalendarEntry>, StoreError>;

    /// Lookup by the `(entity, event type, due date)` identity used to keep
    /// materialization idempotent.
    fn find_by_key(
        &self,
        entity_id: &EntityId,
        event_type: &str,
        due_date: NaiveDate,
    ) -> Result<Option<CalendarEntry>, StoreError>;

    fn for_entity(&self, entity_id: &EntityId) -> Result<Vec<CalendarEntry>, StoreError>;
}

/// Persistence seam for scheduled reminders.
pub trait NotificationStore: Send + Sync {
    fn insert(&self, notification: Notification) -> Result<Notification, StoreError>;

    /// Pending notifications whose fire date is `now` or earlier.
    fn find_due(&self, now: NaiveDate) -> Result<Vec<Notification>, StoreError>;

    fn mark_sent(&self, id: &NotificationId, on: NaiveDate) -> Result<(), StoreError>;

    fn mark_failed(&self, id: &NotificationId) -> Result<(), StoreError>;

    /// Increment the delivery attempt counter, returning the new count.
    fn record_attempt(&self, id: &NotificationId) -> Result<u8, StoreError>;

    /// Cancel every still-pending reminder for an entry, returning how many
    /// were touched.
    fn cancel_for_entry(&self, entry_id: &EntryId) -> Result<usize, StoreError>;

    fn for_entry(&self, entry_id: &EntryId) -> Result<Vec<Notification>, StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// In-app activity feed. Every dispatched reminder lands here, whatever the
/// external channel did with it.
pub trait DashboardFeed: Send + Sync {
    fn push(&self, item: DashboardItem) -> Result<(), FeedError>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardItem {
    pub entity_id: EntityId,
    pub entry_id: EntryId,
    pub title: String,
    pub body: String,
    pub urgency: ReminderUrgency,
    pub due_date: NaiveDate,
}

#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("dashboard feed unavailable: {0}")]
    Unavailable(String),
}
