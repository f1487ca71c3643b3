use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{info, warn};

use super::channel::{ChannelError, SendChannel};
use super::domain::{NotificationChannel, ReminderUrgency};
use super::message;
use super::store::{
    CalendarStore, DashboardFeed, DashboardItem, EntityStore, NotificationStore, StoreError,
};

/// Counts from one sweep of the pending queue.
#[derive(Debug, Default, Clone, Serialize)]
pub struct DispatchReport {
    pub swept: usize,
    pub sent: usize,
    pub retrying: usize,
    pub failed: usize,
    pub dashboard_records: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Routes due reminders to their delivery channels with bounded retries.
pub struct NotificationDispatcher<E, C, N, F> {
    entities: Arc<E>,
    calendar: Arc<C>,
    notifications: Arc<N>,
    feed: Arc<F>,
    email: Box<dyn SendChannel>,
    sms: Box<dyn SendChannel>,
    retry_cap: u8,
}

impl<E, C, N, F> NotificationDispatcher<E, C, N, F>
where
    E: EntityStore,
    C: CalendarStore,
    N: NotificationStore,
    F: DashboardFeed,
{
    pub fn new(
        entities: Arc<E>,
        calendar: Arc<C>,
        notifications: Arc<N>,
        feed: Arc<F>,
        email: Box<dyn SendChannel>,
        sms: Box<dyn SendChannel>,
        retry_cap: u8,
    ) -> Self {
        Self {
            entities,
            calendar,
            notifications,
            feed,
            email,
            sms,
            retry_cap,
        }
    }

    /// Sweep every pending notification whose fire date has arrived. A
    /// delivery failure affects only its own notification; the sweep always
    /// runs to completion. Sent notifications leave the pending pool and are
    /// never swept again.
    pub fn dispatch_due(&self, now: NaiveDate) -> Result<DispatchReport, DispatchError> {
        let due = self.notifications.find_due(now)?;
        let mut report = DispatchReport {
            swept: due.len(),
            ..DispatchReport::default()
        };

        for notification in due {
            let Some(entry) = self.calendar.fetch(&notification.entry_id)? else {
                warn!(
                    notification = %notification.id.0,
                    "reminder points at a missing entry; skipped"
                );
                continue;
            };

            let days_until_due = entry.days_until_due(now);
            let urgency = ReminderUrgency::classify(days_until_due, entry.priority);
            let legal_name = self
                .entities
                .get(&notification.entity_id)?
                .map(|entity| entity.legal_name)
                .unwrap_or_else(|| notification.entity_id.0.clone());

            let outbound = message::compose(
                &entry,
                &legal_name,
                &notification.recipient,
                urgency,
                days_until_due,
            );

            // The in-app record is written for every swept reminder,
            // independent of what the external channel does. For a
            // dashboard reminder the record is the delivery itself, so a
            // rejected push fails the delivery and stays retryable.
            let feed_outcome = self.feed.push(DashboardItem {
                entity_id: notification.entity_id.clone(),
                entry_id: notification.entry_id.clone(),
                title: outbound.subject.clone(),
                body: outbound.body.clone(),
                urgency,
                due_date: entry.due_date,
            });
            match &feed_outcome {
                Ok(()) => report.dashboard_records += 1,
                Err(err) => warn!(
                    notification = %notification.id.0,
                    error = %err,
                    "dashboard feed rejected reminder record"
                ),
            }

            let delivered = match notification.channel {
                NotificationChannel::Email => self.email.send(&outbound).map(|_| ()),
                NotificationChannel::Sms => self.sms.send(&outbound).map(|_| ()),
                NotificationChannel::Dashboard => {
                    feed_outcome.map_err(|err| ChannelError::Transport(err.to_string()))
                }
            };

            match delivered {
                Ok(()) => {
                    self.notifications.mark_sent(&notification.id, now)?;
                    report.sent += 1;
                }
                Err(err) => {
                    let attempts = self.notifications.record_attempt(&notification.id)?;
                    if attempts >= self.retry_cap {
                        self.notifications.mark_failed(&notification.id)?;
                        report.failed += 1;
                        warn!(
                            notification = %notification.id.0,
                            attempts,
                            error = %err,
                            "delivery attempts exhausted"
                        );
                    } else {
                        report.retrying += 1;
                        warn!(
                            notification = %notification.id.0,
                            attempts,
                            error = %err,
                            "delivery failed; reminder stays pending"
                        );
                    }
                }
            }
        }

        info!(
            swept = report.swept,
            sent = report.sent,
            retrying = report.retrying,
            failed = report.failed,
            "reminder sweep complete"
        );
        Ok(report)
    }
}
