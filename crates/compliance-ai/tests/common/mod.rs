#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;

use compliance_ai::workflows::compliance::channel::{ChannelError, DeliveryReceipt, SendChannel};
use compliance_ai::workflows::compliance::domain::{
    BusinessEntity, CalendarEntry, EntityId, EntityType, EntryId, Notification, NotificationId,
    NotificationStatus,
};
use compliance_ai::workflows::compliance::policy::EnginePolicy;
use compliance_ai::workflows::compliance::store::{
    CalendarStore, DashboardFeed, DashboardItem, EntityStore, FeedError, NotificationStore,
    StoreError,
};
use compliance_ai::workflows::compliance::{
    ComplianceCatalog, ComplianceScheduler, NotificationDispatcher, OutboundMessage,
};

pub type Scheduler = ComplianceScheduler<MemoryDirectory, MemoryCalendar, MemoryNotifications>;
pub type Dispatcher =
    NotificationDispatcher<MemoryDirectory, MemoryCalendar, MemoryNotifications, MemoryFeed>;

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub fn ca_llc() -> BusinessEntity {
    BusinessEntity {
        id: EntityId("biz-ca-llc".to_string()),
        legal_name: "Golden Gate Consulting LLC".to_string(),
        entity_type: EntityType::Llc,
        state: "CA".to_string(),
        formation_date: date(2024, 1, 10),
        contact_email: Some("owner@goldengate.example".to_string()),
        contact_phone: Some("+15105550134".to_string()),
    }
}

pub fn ny_corp() -> BusinessEntity {
    BusinessEntity {
        id: EntityId("biz-ny-corp".to_string()),
        legal_name: "Hudson Loft Ventures Inc.".to_string(),
        entity_type: EntityType::CCorporation,
        state: "NY".to_string(),
        formation_date: date(2023, 6, 20),
        contact_email: Some("filings@hudsonloft.example".to_string()),
        contact_phone: None,
    }
}

pub struct EngineFixture {
    pub scheduler: Arc<Scheduler>,
    pub directory: Arc<MemoryDirectory>,
    pub calendar: Arc<MemoryCalendar>,
    pub notifications: Arc<MemoryNotifications>,
}

pub fn build_scheduler() -> EngineFixture {
    build_scheduler_with(ComplianceCatalog::standard())
}

pub fn build_scheduler_with(catalog: ComplianceCatalog) -> EngineFixture {
    let directory = Arc::new(MemoryDirectory::default());
    let calendar = Arc::new(MemoryCalendar::default());
    let notifications = Arc::new(MemoryNotifications::default());
    let scheduler = Arc::new(ComplianceScheduler::new(
        directory.clone(),
        calendar.clone(),
        notifications.clone(),
        Arc::new(catalog),
        EnginePolicy::default(),
    ));
    EngineFixture {
        scheduler,
        directory,
        calendar,
        notifications,
    }
}

pub fn build_dispatcher(
    fixture: &EngineFixture,
    email: Box<dyn SendChannel>,
    sms: Box<dyn SendChannel>,
) -> (Dispatcher, Arc<MemoryFeed>) {
    let feed = Arc::new(MemoryFeed::default());
    let dispatcher = NotificationDispatcher::new(
        fixture.directory.clone(),
        fixture.calendar.clone(),
        fixture.notifications.clone(),
        feed.clone(),
        email,
        sms,
        EnginePolicy::default().retry_cap,
    );
    (dispatcher, feed)
}

#[derive(Default, Clone)]
pub struct MemoryDirectory {
    entities: Arc<Mutex<HashMap<EntityId, BusinessEntity>>>,
}

impl MemoryDirectory {
    pub fn register(&self, entity: BusinessEntity) {
        self.entities
            .lock()
            .expect("directory mutex poisoned")
            .insert(entity.id.clone(), entity);
    }
}

impl EntityStore for MemoryDirectory {
    fn get(&self, id: &EntityId) -> Result<Option<BusinessEntity>, StoreError> {
        let guard = self.entities.lock().expect("directory mutex poisoned");
        Ok(guard.get(id).cloned())
    }
}

#[derive(Default, Clone)]
pub struct MemoryCalendar {
    entries: Arc<Mutex<HashMap<EntryId, CalendarEntry>>>,
}

impl MemoryCalendar {
    pub fn all(&self) -> Vec<CalendarEntry> {
        self.entries
            .lock()
            .expect("calendar mutex poisoned")
            .values()
            .cloned()
            .collect()
    }
}

impl CalendarStore for MemoryCalendar {
    fn insert(&self, entry: CalendarEntry) -> Result<CalendarEntry, StoreError> {
        let mut guard = self.entries.lock().expect("calendar mutex poisoned");
        if guard.contains_key(&entry.id) {
            return Err(StoreError::Conflict);
        }
        guard.insert(entry.id.clone(), entry.clone());
        Ok(entry)
    }

    fn update(&self, entry: CalendarEntry) -> Result<(), StoreError> {
        let mut guard = self.entries.lock().expect("calendar mutex poisoned");
        guard.insert(entry.id.clone(), entry);
        Ok(())
    }

    fn fetch(&self, id: &EntryId) -> Result<Option<CalendarEntry>, StoreError> {
        let guard = self.entries.lock().expect("calendar mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn find_by_key(
        &self,
        entity_id: &EntityId,
        event_type: &str,
        due_date: NaiveDate,
    ) -> Result<Option<CalendarEntry>, StoreError> {
        let guard = self.entries.lock().expect("calendar mutex poisoned");
        Ok(guard
            .values()
            .find(|entry| {
                entry.entity_id == *entity_id
                    && entry.event_type == event_type
                    && entry.due_date == due_date
            })
            .cloned())
    }

    fn for_entity(&self, entity_id: &EntityId) -> Result<Vec<CalendarEntry>, StoreError> {
        let guard = self.entries.lock().expect("calendar mutex poisoned");
        Ok(guard
            .values()
            .filter(|entry| entry.entity_id == *entity_id)
            .cloned()
            .collect())
    }
}

#[derive(Default, Clone)]
pub struct MemoryNotifications {
    rows: Arc<Mutex<HashMap<NotificationId, Notification>>>,
}

impl MemoryNotifications {
    pub fn all(&self) -> Vec<Notification> {
        self.rows
            .lock()
            .expect("notification mutex poisoned")
            .values()
            .cloned()
            .collect()
    }
}

impl NotificationStore for MemoryNotifications {
    fn insert(&self, notification: Notification) -> Result<Notification, StoreError> {
        let mut guard = self.rows.lock().expect("notification mutex poisoned");
        if guard.contains_key(&notification.id) {
            return Err(StoreError::Conflict);
        }
        guard.insert(notification.id.clone(), notification.clone());
        Ok(notification)
    }

    fn find_due(&self, now: NaiveDate) -> Result<Vec<Notification>, StoreError> {
        let guard = self.rows.lock().expect("notification mutex poisoned");
        let mut due: Vec<Notification> = guard
            .values()
            .filter(|row| row.status == NotificationStatus::Pending && row.scheduled_for <= now)
            .cloned()
            .collect();
        due.sort_by(|a, b| a.scheduled_for.cmp(&b.scheduled_for));
        Ok(due)
    }

    fn mark_sent(&self, id: &NotificationId, on: NaiveDate) -> Result<(), StoreError> {
        let mut guard = self.rows.lock().expect("notification mutex poisoned");
        let row = guard.get_mut(id).ok_or(StoreError::NotFound)?;
        row.status = NotificationStatus::Sent;
        row.sent_on = Some(on);
        Ok(())
    }

    fn mark_failed(&self, id: &NotificationId) -> Result<(), StoreError> {
        let mut guard = self.rows.lock().expect("notification mutex poisoned");
        let row = guard.get_mut(id).ok_or(StoreError::NotFound)?;
        row.status = NotificationStatus::Failed;
        Ok(())
    }

    fn record_attempt(&self, id: &NotificationId) -> Result<u8, StoreError> {
        let mut guard = self.rows.lock().expect("notification mutex poisoned");
        let row = guard.get_mut(id).ok_or(StoreError::NotFound)?;
        row.delivery_attempts = row.delivery_attempts.saturating_add(1);
        Ok(row.delivery_attempts)
    }

    fn cancel_for_entry(&self, entry_id: &EntryId) -> Result<usize, StoreError> {
        let mut guard = self.rows.lock().expect("notification mutex poisoned");
        let mut cancelled = 0;
        for row in guard.values_mut() {
            if row.entry_id == *entry_id && row.status == NotificationStatus::Pending {
                row.status = NotificationStatus::Cancelled;
                cancelled += 1;
            }
        }
        Ok(cancelled)
    }

    fn for_entry(&self, entry_id: &EntryId) -> Result<Vec<Notification>, StoreError> {
        let guard = self.rows.lock().expect("notification mutex poisoned");
        Ok(guard
            .values()
            .filter(|row| row.entry_id == *entry_id)
            .cloned()
            .collect())
    }
}

#[derive(Default, Clone)]
pub struct MemoryFeed {
    items: Arc<Mutex<Vec<DashboardItem>>>,
}

impl MemoryFeed {
    pub fn items(&self) -> Vec<DashboardItem> {
        self.items.lock().expect("feed mutex poisoned").clone()
    }
}

impl DashboardFeed for MemoryFeed {
    fn push(&self, item: DashboardItem) -> Result<(), FeedError> {
        self.items.lock().expect("feed mutex poisoned").push(item);
        Ok(())
    }
}

#[derive(Debug, Default, Clone)]
pub struct RecordingChannel {
    sent: Arc<Mutex<Vec<OutboundMessage>>>,
}

impl RecordingChannel {
    pub fn sent(&self) -> Vec<OutboundMessage> {
        self.sent.lock().expect("channel mutex poisoned").clone()
    }
}

impl SendChannel for RecordingChannel {
    fn send(&self, message: &OutboundMessage) -> Result<DeliveryReceipt, ChannelError> {
        self.sent
            .lock()
            .expect("channel mutex poisoned")
            .push(message.clone());
        Ok(DeliveryReceipt { provider_ref: None })
    }
}

#[derive(Debug, Default)]
pub struct FailingChannel;

impl SendChannel for FailingChannel {
    fn send(&self, _message: &OutboundMessage) -> Result<DeliveryReceipt, ChannelError> {
        Err(ChannelError::Transport("provider offline".to_string()))
    }
}
