use chrono::NaiveDateTime;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use serde_json::Value;

use uuid::Uuid;

use crate::domain::{ReminderTitle, ScheduledAt};
use crate::error::{Error, Result};

/// New Reminder request
#[derive(Debug)]
pub struct NewReminder {
    pub title: ReminderTitle,
    pub description: String,
    pub scheduled_at: ScheduledAt,
}

/// Replacement values for an existing reminder
#[derive(Debug)]
pub struct ReminderEdit {
    pub title: ReminderTitle,
    pub description: String,
    pub scheduled_at: ScheduledAt,
}

/// Stored Reminder record
///
/// Loading never fails. A missing field falls back to its default, and
/// `scheduled_at` is kept verbatim so a malformed value is skipped by the evaluator
/// and written back untouched. A record whose fields have the wrong JSON types is
/// kept whole: it reads as malformed and is written back exactly as it was found.
#[derive(Debug, Clone, PartialEq)]
pub struct Reminder {
    pub id: String,
    /// Owning user. `None` for records created before accounts existed
    pub owner: Option<Uuid>,
    pub title: String,
    pub description: String,
    /// Civil date and time, `YYYY-MM-DD HH:MM`
    pub scheduled_at: String,
    /// Set once a notification for this schedule was confirmed delivered
    pub sent: bool,
    /// The record as found on disk, when its fields could not be read
    unreadable: Option<Value>,
}

/// On-disk layout of a readable record
#[derive(Serialize, Deserialize)]
struct StoredReminder {
    #[serde(default)]
    id: String,
    #[serde(default)]
    owner: Option<Uuid>,
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    scheduled_at: String,
    #[serde(default)]
    sent: bool,
}

impl From<StoredReminder> for Reminder {
    fn from(stored: StoredReminder) -> Self {
        Self {
            id: stored.id,
            owner: stored.owner,
            title: stored.title,
            description: stored.description,
            scheduled_at: stored.scheduled_at,
            sent: stored.sent,
            unreadable: None,
        }
    }
}

impl From<Value> for Reminder {
    fn from(value: Value) -> Self {
        match StoredReminder::deserialize(&value) {
            Ok(stored) => stored.into(),
            Err(error) => {
                let text = |field: &str| {
                    value
                        .get(field)
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_string()
                };
                let reminder = Self {
                    id: text("id"),
                    owner: value
                        .get("owner")
                        .and_then(Value::as_str)
                        .and_then(|owner| owner.parse().ok()),
                    title: text("title"),
                    description: text("description"),
                    scheduled_at: text("scheduled_at"),
                    sent: false,
                    unreadable: None,
                };
                tracing::warn!(
                    error.cause_chain = ?error,
                    "Keeping unreadable reminder record as found (id: {:?})",
                    reminder.id
                );
                Self {
                    unreadable: Some(value),
                    ..reminder
                }
            }
        }
    }
}

impl<'de> Deserialize<'de> for Reminder {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Value::deserialize(deserializer).map(Self::from)
    }
}

impl Serialize for Reminder {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if let Some(value) = &self.unreadable {
            return value.serialize(serializer);
        }
        StoredReminder {
            id: self.id.clone(),
            owner: self.owner,
            title: self.title.clone(),
            description: self.description.clone(),
            scheduled_at: self.scheduled_at.clone(),
            sent: self.sent,
        }
        .serialize(serializer)
    }
}

/// Where a reminder stands relative to a given instant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderStatus {
    Sent,
    Due,
    Upcoming,
    Invalid,
}

impl Reminder {
    pub fn new(owner: Option<Uuid>, new_reminder: NewReminder) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            owner,
            title: new_reminder.title.into(),
            description: new_reminder.description,
            scheduled_at: new_reminder.scheduled_at.to_string(),
            sent: false,
            unreadable: None,
        }
    }

    /// Whether the stored record could not be read field by field
    pub fn is_unreadable(&self) -> bool {
        self.unreadable.is_some()
    }

    /// Parse the stored schedule
    pub fn schedule(&self) -> Result<ScheduledAt> {
        if self.unreadable.is_some() {
            return Err(Error::ParsingError("Stored record is unreadable".into()));
        }
        self.scheduled_at.parse()
    }

    /// Replace the editable fields. Any edit re-arms the reminder, even when the
    /// new schedule is already in the past.
    pub fn apply(&mut self, edit: ReminderEdit) {
        self.title = edit.title.into();
        self.description = edit.description;
        self.scheduled_at = edit.scheduled_at.to_string();
        self.sent = false;
        self.unreadable = None;
    }

    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.owner == Some(user_id)
    }

    pub fn status(&self, now: NaiveDateTime) -> ReminderStatus {
        if self.sent {
            return ReminderStatus::Sent;
        }
        match self.schedule() {
            Ok(scheduled_at) if scheduled_at.is_due(now) => ReminderStatus::Due,
            Ok(_) => ReminderStatus::Upcoming,
            Err(_) => ReminderStatus::Invalid,
        }
    }
}
