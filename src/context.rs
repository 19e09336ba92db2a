use std::sync::Arc;

use anyhow::Context as _;

use chrono::NaiveDateTime;

use chrono_tz::Tz;

use crate::client::Mailer;
use crate::clock::{Clock, SystemClock};
use crate::crypto::compute_password_hash;
use crate::domain::EmailAddress;
use crate::model::{NewUser, Role};
use crate::repo::{DestinationsRepo, JsonFile, JsonReminderStore, ReminderStore, UsersRepo};
use crate::settings::{AuthSettings, Settings};
use crate::telemetry::spawn_blocking_with_tracing;

/// Everything an operation needs: stores, the mail channel, the clock and the civil zone
#[derive(Clone)]
pub struct Context {
    pub reminders: Arc<dyn ReminderStore>,
    pub users: UsersRepo,
    pub destinations: DestinationsRepo,
    pub mailer: Arc<dyn Mailer>,
    pub clock: Arc<dyn Clock>,
    pub time_zone: Tz,
    pub fallback_address: Option<EmailAddress>,
}

impl Context {
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let replicator = settings.replication.replicator()?;
        let storage = &settings.storage;

        Ok(Self {
            reminders: Arc::new(JsonReminderStore::new(JsonFile::new(
                storage.reminders_path(),
                replicator.clone(),
            ))),
            users: UsersRepo::new(JsonFile::new(storage.users_path(), replicator.clone())),
            destinations: DestinationsRepo::new(JsonFile::new(
                storage.destinations_path(),
                replicator,
            )),
            mailer: Arc::new(settings.email.mailer()?),
            clock: Arc::new(SystemClock),
            time_zone: settings.app.time_zone(),
            fallback_address: settings.email.fallback_address(),
        })
    }

    /// The current civil date and time in the configured zone
    pub fn local_now(&self) -> NaiveDateTime {
        self.clock.local_now(self.time_zone)
    }

    /// Seed the first administrator when no account exists yet.
    ///
    /// The seeded account must change its password before doing anything else.
    #[tracing::instrument(name = "Bootstrap administrator", skip(self, settings))]
    pub async fn bootstrap_admin(&self, settings: &AuthSettings) -> anyhow::Result<()> {
        let (Some(username), Some(password)) = (
            &settings.bootstrap_admin_username,
            &settings.bootstrap_admin_password,
        ) else {
            return Ok(());
        };
        if !self.users.is_empty().await {
            return Ok(());
        }

        let password = password.clone();
        let password_hash = spawn_blocking_with_tracing(move || compute_password_hash(password))
            .await
            .context("Failed to spawn blocking task")??;

        let new_user = NewUser {
            username: username
                .parse()
                .context("Invalid bootstrap administrator username")?,
            password_hash,
            role: Role::Admin,
        };
        let user = self.users.insert(new_user, true).await?;

        tracing::info!("Created administrator {}", user.username);
        Ok(())
    }
}
