use chrono::NaiveDate;
use compliance_ai::workflows::compliance::domain::{
    BusinessEntity, CalendarEntry, EntityId, EntityType, EntryId, Notification, NotificationId,
    NotificationStatus,
};
use compliance_ai::workflows::compliance::store::{
    CalendarStore, DashboardFeed, DashboardItem, EntityStore, FeedError, NotificationStore,
    StoreError,
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Directory of registered business entities. The engine only reads from it;
/// registration happens through the service's own endpoint.
#[derive(Default, Clone)]
pub(crate) struct EntityDirectory {
    entities: Arc<Mutex<HashMap<EntityId, BusinessEntity>>>,
}

impl EntityDirectory {
    pub(crate) fn register(&self, entity: BusinessEntity) -> Result<BusinessEntity, StoreError> {
        let mut guard = self.entities.lock().expect("directory mutex poisoned");
        if guard.contains_key(&entity.id) {
            return Err(StoreError::Conflict);
        }
        guard.insert(entity.id.clone(), entity.clone());
        Ok(entity)
    }
}

impl EntityStore for EntityDirectory {
    fn get(&self, id: &EntityId) -> Result<Option<BusinessEntity>, StoreError> {
        let guard = self.entities.lock().expect("directory mutex poisoned");
        Ok(guard.get(id).cloned())
    }
}

#[derive(Default, Clone)]
pub(crate) struct CalendarLedger {
    entries: Arc<Mutex<HashMap<EntryId, CalendarEntry>>>,
}

impl CalendarStore for CalendarLedger {
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
        if !guard.contains_key(&entry.id) {
            return Err(StoreError::NotFound);
        }
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
pub(crate) struct NotificationLedger {
    rows: Arc<Mutex<HashMap<NotificationId, Notification>>>,
}

impl NotificationStore for NotificationLedger {
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

/// In-app reminder feed backing the dashboard view.
#[derive(Default, Clone)]
pub(crate) struct FeedLog {
    items: Arc<Mutex<Vec<DashboardItem>>>,
}

impl FeedLog {
    pub(crate) fn items(&self) -> Vec<DashboardItem> {
        self.items.lock().expect("feed mutex poisoned").clone()
    }
}

impl DashboardFeed for FeedLog {
    fn push(&self, item: DashboardItem) -> Result<(), FeedError> {
        self.items.lock().expect("feed mutex poisoned").push(item);
        Ok(())
    }
}

pub(crate) fn demo_entities() -> Vec<BusinessEntity> {
    vec![
        BusinessEntity {
            id: EntityId("biz-000101".to_string()),
            legal_name: "Golden Gate Consulting LLC".to_string(),
            entity_type: EntityType::Llc,
            state: "CA".to_string(),
            formation_date: NaiveDate::from_ymd_opt(2024, 1, 10).expect("valid formation date"),
            contact_email: Some("owner@goldengate.example".to_string()),
            contact_phone: Some("+15105550134".to_string()),
        },
        BusinessEntity {
            id: EntityId("biz-000102".to_string()),
            legal_name: "Hudson Loft Ventures Inc.".to_string(),
            entity_type: EntityType::CCorporation,
            state: "NY".to_string(),
            formation_date: NaiveDate::from_ymd_opt(2023, 6, 20).expect("valid formation date"),
            contact_email: Some("filings@hudsonloft.example".to_string()),
            contact_phone: None,
        },
    ]
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

pub(crate) fn parse_entity_type(raw: &str) -> Result<EntityType, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "llc" => Ok(EntityType::Llc),
        "c_corporation" | "c-corp" | "corporation" => Ok(EntityType::CCorporation),
        "s_corporation" | "s-corp" => Ok(EntityType::SCorporation),
        "partnership" => Ok(EntityType::Partnership),
        "sole_proprietorship" | "sole-prop" => Ok(EntityType::SoleProprietorship),
        other => Err(format!(
            "unknown entity type '{other}' (expected llc, c_corporation, s_corporation, \
             partnership, or sole_proprietorship)"
        )),
    }
}

pub(crate) fn deserialize_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_date(&raw).map_err(serde::de::Error::custom)
}
