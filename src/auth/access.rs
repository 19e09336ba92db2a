use uuid::Uuid;

use crate::auth::{Administrator, Session};
use crate::context::Context;
use crate::error::{Error, Result};
use crate::model::{NewReminder, Reminder, ReminderEdit, UserProfile};
use crate::repo::ReminderStore;

/// The reminder store as seen by one session.
///
/// Normal users see and change only the reminders they own; administrators see and
/// change all of them. A reminder outside the session's reach is reported as missing.
pub struct ReminderAccess<'a> {
    store: &'a dyn ReminderStore,
    session: &'a Session,
}

impl<'a> ReminderAccess<'a> {
    pub fn new(store: &'a dyn ReminderStore, session: &'a Session) -> Self {
        Self { store, session }
    }

    fn can_reach(&self, reminder: &Reminder) -> bool {
        self.session.is_admin() || reminder.is_owned_by(self.session.user_id())
    }

    /// Visible reminders ordered by schedule, unparsable schedules last
    pub async fn list(&self) -> Vec<Reminder> {
        let mut reminders: Vec<Reminder> = self
            .store
            .load()
            .await
            .into_iter()
            .filter(|reminder| self.can_reach(reminder))
            .collect();

        reminders.sort_by_key(|reminder| match reminder.schedule() {
            Ok(scheduled_at) => (false, Some(*scheduled_at.as_ref())),
            Err(_) => (true, None),
        });
        reminders
    }

    #[tracing::instrument(name = "Create reminder", skip(self), fields(user = %self.session.username()))]
    pub async fn create(&self, new_reminder: NewReminder) -> Result<Reminder> {
        let reminder = Reminder::new(Some(self.session.user_id()), new_reminder);

        let mut reminders = self.store.load().await;
        reminders.push(reminder.clone());
        self.store.save(&reminders).await?;

        Ok(reminder)
    }

    /// Replace a reminder's fields, re-arming it for delivery
    #[tracing::instrument(name = "Update reminder", skip(self, edit), fields(user = %self.session.username()))]
    pub async fn update(&self, id: &str, edit: ReminderEdit) -> Result<Reminder> {
        let mut reminders = self.store.load().await;
        let reminder = reminders
            .iter_mut()
            .find(|reminder| reminder.id == id && self.can_reach(reminder))
            .ok_or_else(|| Error::NotFound(format!("Reminder {}", id)))?;

        reminder.apply(edit);
        let updated = reminder.clone();
        self.store.save(&reminders).await?;

        Ok(updated)
    }

    #[tracing::instrument(name = "Delete reminder", skip(self), fields(user = %self.session.username()))]
    pub async fn delete(&self, id: &str) -> Result<()> {
        let mut reminders = self.store.load().await;
        let position = reminders
            .iter()
            .position(|reminder| reminder.id == id && self.can_reach(reminder))
            .ok_or_else(|| Error::NotFound(format!("Reminder {}", id)))?;

        reminders.remove(position);
        self.store.save(&reminders).await
    }
}

/// Delete an account together with its reminders and destination entry
#[tracing::instrument(name = "Delete user", skip(context, admin), fields(admin = %admin.session().username()))]
pub async fn delete_user(
    context: &Context,
    admin: &Administrator,
    user_id: Uuid,
) -> Result<UserProfile> {
    if admin.session().user_id() == user_id {
        return Err(Error::Forbidden(
            "Administrators cannot delete their own account".into(),
        ));
    }

    let user = context.users.delete(user_id).await?;

    let mut reminders = context.reminders.load().await;
    let before = reminders.len();
    reminders.retain(|reminder| !reminder.is_owned_by(user_id));
    if reminders.len() != before {
        context.reminders.save(&reminders).await?;
        tracing::info!("Deleted {} reminders of {}", before - reminders.len(), user.username);
    }

    context.destinations.remove(user_id).await?;

    Ok(UserProfile::from(&user))
}
