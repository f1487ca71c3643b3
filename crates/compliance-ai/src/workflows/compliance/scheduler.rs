use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use serde::Serialize;
use tracing::{debug, info};

use super::catalog::ComplianceCatalog;
use super::domain::{
    BusinessEntity, CalendarEntry, EntityId, EntryId, EntryStateError, EntryStatus, Notification,
    NotificationChannel, NotificationId, NotificationStatus, RecurringInterval,
};
use super::policy::EnginePolicy;
use super::report::ComplianceReport;
use super::store::{CalendarStore, EntityStore, NotificationStore, StoreError};

static ENTRY_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static NOTIFICATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_entry_id() -> EntryId {
    let id = ENTRY_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    EntryId(format!("cal-{id:06}"))
}

fn next_notification_id() -> NotificationId {
    let id = NOTIFICATION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    NotificationId(format!("ntf-{id:06}"))
}

/// Outcome of closing out an entry: the closed entry plus the next
/// occurrence when the obligation recurs.
#[derive(Debug, Clone, Serialize)]
pub struct CompletionOutcome {
    pub entry: CalendarEntry,
    pub rolled: Option<CalendarEntry>,
}

#[derive(Debug, thiserror::Error)]
pub enum ScheduleError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    State(#[from] EntryStateError),
}

/// Service tying the template catalog and due-date rules to the calendar and
/// notification stores.
pub struct ComplianceScheduler<E, C, N> {
    entities: Arc<E>,
    calendar: Arc<C>,
    notifications: Arc<N>,
    catalog: Arc<ComplianceCatalog>,
    policy: EnginePolicy,
}

impl<E, C, N> ComplianceScheduler<E, C, N>
where
    E: EntityStore,
    C: CalendarStore,
    N: NotificationStore,
{
    pub fn new(
        entities: Arc<E>,
        calendar: Arc<C>,
        notifications: Arc<N>,
        catalog: Arc<ComplianceCatalog>,
        policy: EnginePolicy,
    ) -> Self {
        Self {
            entities,
            calendar,
            notifications,
            catalog,
            policy,
        }
    }

    pub fn policy(&self) -> &EnginePolicy {
        &self.policy
    }

    /// Materialize calendar entries for every template applicable to the
    /// entity. Obligations already on the calendar under the same
    /// `(entity, event type, due date)` identity are skipped, so repeated
    /// runs are idempotent. The entity is resolved before anything is
    /// written; an unknown entity aborts with no partial state.
    pub fn materialize(
        &self,
        entity_id: &EntityId,
        today: NaiveDate,
    ) -> Result<Vec<CalendarEntry>, ScheduleError> {
        let entity = self.entities.get(entity_id)?.ok_or(StoreError::NotFound)?;

        let mut created = Vec::new();
        for effective in self.catalog.applicable(&entity) {
            for due_date in effective.due.due_dates(entity.formation_date, today) {
                if self
                    .calendar
                    .find_by_key(entity_id, effective.template.event_type, due_date)?
                    .is_some()
                {
                    debug!(
                        entity = %entity_id.0,
                        event_type = effective.template.event_type,
                        %due_date,
                        "obligation already materialized"
                    );
                    continue;
                }

                let entry = self.calendar.insert(CalendarEntry {
                    id: next_entry_id(),
                    entity_id: entity_id.clone(),
                    event_type: effective.template.event_type.to_string(),
                    title: effective.template.title.to_string(),
                    category: effective.template.category,
                    priority: effective.template.priority,
                    due_date,
                    status: EntryStatus::Pending,
                    recurrence: effective.template.recurrence,
                    completed_on: None,
                })?;

                self.schedule_reminders(&entry, &effective.lead_times, &entity)?;
                created.push(entry);
            }
        }

        info!(
            entity = %entity_id.0,
            created = created.len(),
            "materialized compliance calendar"
        );
        Ok(created)
    }

    /// One pending reminder per lead time and configured channel. Fire dates
    /// already in the past are stored as-is; the dispatcher's next sweep
    /// picks them up immediately.
    fn schedule_reminders(
        &self,
        entry: &CalendarEntry,
        lead_times: &[i64],
        entity: &BusinessEntity,
    ) -> Result<Vec<Notification>, StoreError> {
        let mut scheduled = Vec::new();
        for lead in lead_times {
            let fire_date = entry.due_date - Duration::days(*lead);
            for channel in &self.policy.channels {
                let Some(recipient) = recipient_for(*channel, entity) else {
                    continue;
                };
                let notification = self.notifications.insert(Notification {
                    id: next_notification_id(),
                    entry_id: entry.id.clone(),
                    entity_id: entry.entity_id.clone(),
                    channel: *channel,
                    recipient,
                    scheduled_for: fire_date,
                    status: NotificationStatus::Pending,
                    delivery_attempts: 0,
                    sent_on: None,
                })?;
                scheduled.push(notification);
            }
        }
        Ok(scheduled)
    }

    /// Close out a pending entry. Recurring obligations roll forward: the
    /// next occurrence is derived from the completed entry's due date, not
    /// the completion date, so late filings do not drift the cadence.
    pub fn complete(
        &self,
        entry_id: &EntryId,
        today: NaiveDate,
    ) -> Result<CompletionOutcome, ScheduleError> {
        let mut entry = self.calendar.fetch(entry_id)?.ok_or(StoreError::NotFound)?;
        let entity = self
            .entities
            .get(&entry.entity_id)?
            .ok_or(StoreError::NotFound)?;

        entry.complete(today)?;
        self.calendar.update(entry.clone())?;
        let cancelled = self.notifications.cancel_for_entry(entry_id)?;

        let rolled = match entry.recurrence {
            Some(interval) => self.roll_forward(&entry, interval, &entity)?,
            None => None,
        };

        info!(
            entry = %entry_id.0,
            cancelled_reminders = cancelled,
            rolled = rolled.is_some(),
            "calendar entry completed"
        );
        Ok(CompletionOutcome { entry, rolled })
    }

    fn roll_forward(
        &self,
        completed: &CalendarEntry,
        interval: RecurringInterval,
        entity: &BusinessEntity,
    ) -> Result<Option<CalendarEntry>, ScheduleError> {
        let next_due = interval.advance(completed.due_date);
        if self
            .calendar
            .find_by_key(&completed.entity_id, &completed.event_type, next_due)?
            .is_some()
        {
            debug!(
                entry = %completed.id.0,
                %next_due,
                "next occurrence already on the calendar"
            );
            return Ok(None);
        }

        let entry = self.calendar.insert(CalendarEntry {
            id: next_entry_id(),
            entity_id: completed.entity_id.clone(),
            event_type: completed.event_type.clone(),
            title: completed.title.clone(),
            category: completed.category,
            priority: completed.priority,
            due_date: next_due,
            status: EntryStatus::Pending,
            recurrence: completed.recurrence,
            completed_on: None,
        })?;

        let lead_times = self
            .catalog
            .effective(&completed.event_type, entity)
            .map(|effective| effective.lead_times)
            .unwrap_or_default();
        self.schedule_reminders(&entry, &lead_times, entity)?;

        Ok(Some(entry))
    }

    /// Cancel a pending entry. No roll-forward happens; pending reminders
    /// for the entry are withdrawn.
    pub fn cancel(&self, entry_id: &EntryId) -> Result<CalendarEntry, ScheduleError> {
        let mut entry = self.calendar.fetch(entry_id)?.ok_or(StoreError::NotFound)?;
        entry.cancel()?;
        self.calendar.update(entry.clone())?;
        let cancelled = self.notifications.cancel_for_entry(entry_id)?;

        info!(
            entry = %entry_id.0,
            cancelled_reminders = cancelled,
            "calendar entry cancelled"
        );
        Ok(entry)
    }

    /// The entity's calendar sorted by due date.
    pub fn calendar_for(&self, entity_id: &EntityId) -> Result<Vec<CalendarEntry>, ScheduleError> {
        self.entities.get(entity_id)?.ok_or(StoreError::NotFound)?;
        let mut entries = self.calendar.for_entity(entity_id)?;
        entries.sort_by(|a, b| a.due_date.cmp(&b.due_date));
        Ok(entries)
    }

    pub fn reminders_for(&self, entry_id: &EntryId) -> Result<Vec<Notification>, ScheduleError> {
        self.calendar.fetch(entry_id)?.ok_or(StoreError::NotFound)?;
        Ok(self.notifications.for_entry(entry_id)?)
    }

    /// Aggregate compliance standing for one entity.
    pub fn report(
        &self,
        entity_id: &EntityId,
        today: NaiveDate,
    ) -> Result<ComplianceReport, ScheduleError> {
        let entity = self.entities.get(entity_id)?.ok_or(StoreError::NotFound)?;
        let entries = self.calendar.for_entity(entity_id)?;

        let mut notifications = Vec::new();
        for entry in &entries {
            notifications.extend(self.notifications.for_entry(&entry.id)?);
        }

        Ok(ComplianceReport::build(
            entity,
            &entries,
            &notifications,
            today,
            self.policy.upcoming_horizon_days,
        ))
    }
}

fn recipient_for(channel: NotificationChannel, entity: &BusinessEntity) -> Option<String> {
    match channel {
        NotificationChannel::Email => entity.contact_email.clone(),
        NotificationChannel::Sms => entity.contact_phone.clone(),
        NotificationChannel::Dashboard => Some(entity.id.0.clone()),
    }
}
