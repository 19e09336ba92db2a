use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::Result;
use crate::model::Reminder;
use crate::repo::JsonFile;

/// Whole-collection access to stored reminders.
///
/// There is no partial update: callers load a snapshot, change it in memory and save
/// the whole snapshot back. Visibility rules are applied on top of this, never inside it.
#[async_trait]
pub trait ReminderStore: Send + Sync {
    /// Every stored reminder, in stored order. Never fails: unreadable storage is empty.
    async fn load(&self) -> Vec<Reminder>;

    /// Replace the stored collection
    async fn save(&self, reminders: &[Reminder]) -> Result<()>;
}

/// Reminders kept as a JSON array in a single file
#[derive(Clone)]
pub struct JsonReminderStore {
    file: JsonFile,
}

impl JsonReminderStore {
    pub fn new(file: JsonFile) -> Self {
        Self { file }
    }
}

#[async_trait]
impl ReminderStore for JsonReminderStore {
    async fn load(&self) -> Vec<Reminder> {
        self.file.load().await
    }

    #[tracing::instrument(name = "Save reminders", skip(self, reminders), fields(count = reminders.len()))]
    async fn save(&self, reminders: &[Reminder]) -> Result<()> {
        self.file.save(reminders).await
    }
}

/// Reminders held in memory, counting saves
#[derive(Debug, Default)]
pub struct InMemoryReminderStore {
    reminders: Mutex<Vec<Reminder>>,
    saves: AtomicUsize,
}

impl InMemoryReminderStore {
    pub fn new(reminders: Vec<Reminder>) -> Self {
        Self {
            reminders: Mutex::new(reminders),
            saves: AtomicUsize::new(0),
        }
    }

    /// How many times the collection was saved
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Reminder>> {
        // A poisoned lock still holds a complete snapshot
        self.reminders
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl ReminderStore for InMemoryReminderStore {
    async fn load(&self) -> Vec<Reminder> {
        self.lock().clone()
    }

    async fn save(&self, reminders: &[Reminder]) -> Result<()> {
        *self.lock() = reminders.to_vec();
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
