use std::fmt;

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntryId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NotificationId(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Llc,
    CCorporation,
    SCorporation,
    Partnership,
    SoleProprietorship,
}

impl EntityType {
    pub const fn ordered() -> [Self; 5] {
        [
            Self::Llc,
            Self::CCorporation,
            Self::SCorporation,
            Self::Partnership,
            Self::SoleProprietorship,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Llc => "LLC",
            Self::CCorporation => "C Corporation",
            Self::SCorporation => "S Corporation",
            Self::Partnership => "Partnership",
            Self::SoleProprietorship => "Sole Proprietorship",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    Tax,
    StateFiling,
    FederalFiling,
    Licensing,
    Governance,
}

impl EventCategory {
    pub const fn ordered() -> [Self; 5] {
        [
            Self::Tax,
            Self::StateFiling,
            Self::FederalFiling,
            Self::Licensing,
            Self::Governance,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Tax => "Tax",
            Self::StateFiling => "State Filing",
            Self::FederalFiling => "Federal Filing",
            Self::Licensing => "Licensing",
            Self::Governance => "Governance",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventPriority {
    High,
    Medium,
    Low,
}

impl EventPriority {
    pub const fn ordered() -> [Self; 3] {
        [Self::High, Self::Medium, Self::Low]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }
}

/// Cadence of a repeating obligation. Roll-forward anchors on the completed
/// due date so a late filing does not drift the whole calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecurringInterval {
    Monthly,
    Quarterly,
    Annual,
    Biennial,
}

impl RecurringInterval {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Monthly => "Monthly",
            Self::Quarterly => "Quarterly",
            Self::Annual => "Annual",
            Self::Biennial => "Biennial",
        }
    }

    const fn months(self) -> u32 {
        match self {
            Self::Monthly => 1,
            Self::Quarterly => 3,
            Self::Annual => 12,
            Self::Biennial => 24,
        }
    }

    /// Next occurrence after `from`. Month-end overflow clamps, so a January 31
    /// monthly obligation lands on the last day of February.
    pub fn advance(self, from: NaiveDate) -> NaiveDate {
        from.checked_add_months(Months::new(self.months()))
            .unwrap_or(from)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    Pending,
    Completed,
    Cancelled,
}

impl EntryStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
        }
    }

    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationStatus {
    Pending,
    Sent,
    Failed,
    Cancelled,
}

impl NotificationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Sent => "Sent",
            Self::Failed => "Failed",
            Self::Cancelled => "Cancelled",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationChannel {
    Email,
    Sms,
    Dashboard,
}

impl NotificationChannel {
    pub const fn ordered() -> [Self; 3] {
        [Self::Email, Self::Sms, Self::Dashboard]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Email => "Email",
            Self::Sms => "SMS",
            Self::Dashboard => "Dashboard",
        }
    }
}

/// Tone tier for an outbound reminder. The tier never decides whether a
/// reminder fires, only how it reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderUrgency {
    Urgent,
    High,
    Medium,
    Low,
}

impl ReminderUrgency {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Urgent => "Urgent",
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }

    /// Tier from proximity and event priority. Anything due within a day is
    /// urgent regardless of priority; the high and medium bands apply to
    /// high-priority events only.
    pub fn classify(days_until_due: i64, priority: EventPriority) -> Self {
        if days_until_due <= 1 {
            Self::Urgent
        } else if days_until_due <= 7 && priority == EventPriority::High {
            Self::High
        } else if days_until_due <= 14 && priority == EventPriority::High {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessEntity {
    pub id: EntityId,
    pub legal_name: String,
    pub entity_type: EntityType,
    pub state: String,
    pub formation_date: NaiveDate,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
}

/// One materialized obligation on an entity's calendar. The
/// `(entity_id, event_type, due_date)` triple identifies the obligation
/// across repeated materialization runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEntry {
    pub id: EntryId,
    pub entity_id: EntityId,
    pub event_type: String,
    pub title: String,
    pub category: EventCategory,
    pub priority: EventPriority,
    pub due_date: NaiveDate,
    pub status: EntryStatus,
    pub recurrence: Option<RecurringInterval>,
    pub completed_on: Option<NaiveDate>,
}

impl CalendarEntry {
    pub fn is_open(&self) -> bool {
        self.status == EntryStatus::Pending
    }

    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.is_open() && self.due_date < today
    }

    pub fn days_until_due(&self, today: NaiveDate) -> i64 {
        (self.due_date - today).num_days()
    }

    pub fn complete(&mut self, on: NaiveDate) -> Result<(), EntryStateError> {
        self.transition(EntryStatus::Completed)?;
        self.completed_on = Some(on);
        Ok(())
    }

    pub fn cancel(&mut self) -> Result<(), EntryStateError> {
        self.transition(EntryStatus::Cancelled)
    }

    fn transition(&mut self, next: EntryStatus) -> Result<(), EntryStateError> {
        if self.status.is_terminal() {
            return Err(EntryStateError::AlreadyClosed {
                entry: self.id.clone(),
                status: self.status,
            });
        }
        self.status = next;
        Ok(())
    }
}

/// One scheduled reminder bound to a calendar entry, channel, and fire date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub entry_id: EntryId,
    pub entity_id: EntityId,
    pub channel: NotificationChannel,
    pub recipient: String,
    pub scheduled_for: NaiveDate,
    pub status: NotificationStatus,
    pub delivery_attempts: u8,
    pub sent_on: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EntryStateError {
    AlreadyClosed { entry: EntryId, status: EntryStatus },
}

impl fmt::Display for EntryStateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryStateError::AlreadyClosed { entry, status } => {
                write!(f, "calendar entry {} is closed ({})", entry.0, status.label())
            }
        }
    }
}

impl std::error::Error for EntryStateError {}
