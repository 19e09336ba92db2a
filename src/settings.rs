use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;

use chrono_tz::Tz;

use config::{Config, Environment, File};

use secrecy::{ExposeSecret, Secret};

use serde::Deserialize;
use serde_aux::prelude::*;

use url::Url;

use crate::client::{SmtpMailer, SmtpSecurity};
use crate::domain::EmailAddress;
use crate::replication::{GitReplicator, NoReplication, Replicator};

/// Runtime environment, either `Dev` for local development, or `Prod` for release
#[derive(Debug)]
pub enum Runtime {
    Dev,
    Prod,
}

impl Runtime {
    pub fn as_str(&self) -> &str {
        match self {
            Runtime::Dev => "dev",
            Runtime::Prod => "prod",
        }
    }
}

impl TryFrom<String> for Runtime {
    type Error = anyhow::Error;

    fn try_from(s: String) -> anyhow::Result<Self> {
        match s.to_lowercase().as_str() {
            "dev" => Ok(Self::Dev),
            "prod" => Ok(Self::Prod),
            other => anyhow::bail!("{} is not a valid runtime environment", other),
        }
    }
}

/// Application settings wrapper
#[derive(Debug, Deserialize)]
pub struct Settings {
    pub app: ApplicationSettings,
    pub storage: StorageSettings,
    pub email: EmailSettings,
    pub replication: ReplicationSettings,
    #[serde(default)]
    pub auth: AuthSettings,
}

impl Settings {
    /// Load application settings from the settings directory
    pub fn load() -> anyhow::Result<Self> {
        // Get the path to the settings directory
        let path = env::current_dir()?.join("settings");
        // Get the current environment based on the `APP_ENV` environment variable, default to `Dev`
        let runtime: Runtime = env::var("APP_ENV")
            .unwrap_or_else(|_| "dev".into())
            .try_into()?;

        Self::load_from(runtime, &path)
    }
    /// Load application settings from a specified path and runtime
    pub fn load_from(runtime: Runtime, base_path: &Path) -> anyhow::Result<Self> {
        Config::builder()
            // Include the base settings
            .add_source(File::from(base_path.join("base")).required(true))
            // Include the runtime settings
            .add_source(File::from(base_path.join(runtime.as_str())).required(true))
            // Override/include any settings from environment variables
            // NOTE: Should be used for any prod secrets. Takes the form `APP_<settings category>__<setting name>`.
            .add_source(
                Environment::with_prefix("app")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()
            .context("Failed to load/deserialize settings")
    }
}

fn default_time_zone() -> Tz {
    chrono_tz::America::Sao_Paulo
}

#[derive(Debug, Deserialize)]
pub struct ApplicationSettings {
    host: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    port: u16,
    /// Civil zone every schedule is read in
    #[serde(default = "default_time_zone")]
    time_zone: Tz,
}

impl ApplicationSettings {
    /// The application address to bind to
    pub fn addr(&self) -> (&str, u16) {
        (&self.host, self.port)
    }
    pub fn time_zone(&self) -> Tz {
        self.time_zone
    }
}

#[derive(Debug, Deserialize)]
pub struct StorageSettings {
    data_dir: PathBuf,
    reminders_file: String,
    users_file: String,
    destinations_file: String,
}

impl StorageSettings {
    pub fn reminders_path(&self) -> PathBuf {
        self.data_dir.join(&self.reminders_file)
    }
    pub fn users_path(&self) -> PathBuf {
        self.data_dir.join(&self.users_file)
    }
    pub fn destinations_path(&self) -> PathBuf {
        self.data_dir.join(&self.destinations_file)
    }
}

#[derive(Debug, Deserialize)]
pub struct EmailSettings {
    smtp_host: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    smtp_port: u16,
    security: SmtpSecurity,
    /// Sender account, also used as the From address
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    password: Option<Secret<String>>,
    #[serde(default)]
    admin_address: Option<String>,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    timeout_milliseconds: u64,
}

impl EmailSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_milliseconds)
    }

    /// The sender account and its password, when both are set
    pub fn credentials(&self) -> Option<(String, Secret<String>)> {
        let username = self.username.as_deref().map(str::trim).filter(|u| !u.is_empty())?;
        let password = self
            .password
            .as_ref()
            .filter(|p| !p.expose_secret().is_empty())?;
        Some((username.to_string(), password.clone()))
    }

    /// Where notifications go when no destination is configured: the admin address,
    /// or else the sender account itself
    pub fn fallback_address(&self) -> Option<EmailAddress> {
        let candidate = self
            .admin_address
            .as_deref()
            .or(self.username.as_deref())
            .map(str::trim)
            .filter(|a| !a.is_empty())?;

        match candidate.parse() {
            Ok(address) => Some(address),
            Err(error) => {
                tracing::warn!(error.cause_chain = ?error, "Ignoring invalid fallback address");
                None
            }
        }
    }

    pub fn mailer(&self) -> anyhow::Result<SmtpMailer> {
        SmtpMailer::new(
            &self.smtp_host,
            self.smtp_port,
            self.security,
            self.credentials(),
            self.timeout(),
        )
        .context("Failed to configure SMTP mailer")
    }
}

#[derive(Debug, Deserialize)]
pub struct ReplicationSettings {
    #[serde(deserialize_with = "deserialize_bool_from_anything")]
    enabled: bool,
    work_dir: PathBuf,
    #[serde(default)]
    remote_url: Option<String>,
    branch: String,
    #[serde(default)]
    token: Option<Secret<String>>,
    author_name: String,
    author_email: String,
}

impl ReplicationSettings {
    /// The replicator stored files are handed to after every save
    pub fn replicator(&self) -> anyhow::Result<Arc<dyn Replicator>> {
        if !self.enabled {
            return Ok(Arc::new(NoReplication));
        }

        let remote_url = self
            .remote_url
            .as_deref()
            .context("Replication is enabled but no remote URL is set")?;
        let remote_url = Url::parse(remote_url).context("Failed to parse replication remote URL")?;
        let token = self
            .token
            .clone()
            .filter(|t| !t.expose_secret().is_empty());

        Ok(Arc::new(GitReplicator::new(
            self.work_dir.clone(),
            remote_url,
            self.branch.clone(),
            token,
            self.author_name.clone(),
            self.author_email.clone(),
        )))
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct AuthSettings {
    #[serde(default)]
    pub bootstrap_admin_username: Option<String>,
    #[serde(default)]
    pub bootstrap_admin_password: Option<Secret<String>>,
}
