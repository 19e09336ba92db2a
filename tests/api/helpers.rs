use std::net::TcpListener;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use chrono::{TimeZone, Utc};

use reqwest::{Client, Method, Response};

use secrecy::Secret;

use serde::Serialize;

use tempfile::TempDir;

use uuid::Uuid;

use reminders::app;
use reminders::client::{Email, Mailer, SendEmailError};
use reminders::clock::FixedClock;
use reminders::context::Context;
use reminders::crypto::compute_password_hash;
use reminders::model::{NewUser, Role};
use reminders::replication::NoReplication;
use reminders::repo::{DestinationsRepo, JsonFile, JsonReminderStore, UsersRepo};

pub const FALLBACK_ADDRESS: &str = "admin@example.com";

#[derive(Debug, Serialize)]
pub struct ReminderBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_at: Option<String>,
}

impl ReminderBody {
    pub fn new(title: &str, scheduled_at: &str) -> Self {
        Self {
            title: Some(title.into()),
            description: Some(format!("About {}", title)),
            scheduled_at: Some(scheduled_at.into()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Records every email instead of sending it, or fails every send when told to
#[derive(Debug, Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<Email>>,
    failing: AtomicBool,
}

impl RecordingMailer {
    pub fn sent(&self) -> Vec<Email> {
        self.sent.lock().unwrap().clone()
    }

    pub fn fail_sends(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: &Email) -> Result<(), SendEmailError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(SendEmailError::MissingCredentials);
        }
        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }
}

pub struct TestApp {
    addr: String,
    data_dir: TempDir,

    pub client: Client,
    pub context: Context,
    pub mailer: Arc<RecordingMailer>,
    pub admin: TestUser,
}

impl TestApp {
    /// Spawn the app over empty stores, with the clock at 2024-01-01 09:00 in Sao Paulo
    pub async fn spawn() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to listen on random port");
        let port = listener.local_addr().unwrap().port();

        let addr = format!("http://127.0.0.1:{}", port);

        let data_dir = tempfile::tempdir().expect("Failed to create data directory");
        let file = |name: &str| JsonFile::new(data_dir.path().join(name), Arc::new(NoReplication));

        let mailer = Arc::new(RecordingMailer::default());

        let context = Context {
            reminders: Arc::new(JsonReminderStore::new(file("lembretes.json"))),
            users: UsersRepo::new(file("users.json")),
            destinations: DestinationsRepo::new(file("config.json")),
            mailer: mailer.clone(),
            clock: Arc::new(FixedClock(
                Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap(),
            )),
            time_zone: chrono_tz::America::Sao_Paulo,
            fallback_address: Some(FALLBACK_ADDRESS.parse().unwrap()),
        };

        let admin = TestUser::register(&context, Role::Admin, false).await;

        let server = app::run(listener, context.clone()).expect("Failed to spawn app instance");
        let _ = tokio::spawn(server);

        let client = Client::new();

        Self {
            addr,
            data_dir,
            client,
            context,
            mailer,
            admin,
        }
    }

    pub fn data_file(&self, name: &str) -> std::path::PathBuf {
        self.data_dir.path().join(name)
    }

    pub fn request(&self, method: Method, url: &str) -> reqwest::RequestBuilder {
        let url = format!("{}/{}", &self.addr, url);
        self.client.request(method, url)
    }

    pub fn authorized_request(
        &self,
        method: Method,
        url: &str,
        credentials: Option<&Credentials>,
    ) -> reqwest::RequestBuilder {
        let req = self.request(method, url);
        if let Some(creds) = credentials {
            req.basic_auth(creds.username.clone(), Some(creds.password.clone()))
        } else {
            req
        }
    }

    pub async fn health_check(&self) -> reqwest::Result<Response> {
        self.request(Method::GET, "health_check").send().await
    }

    pub async fn reminders_list(&self, credentials: Option<&Credentials>) -> reqwest::Result<Response> {
        self.authorized_request(Method::GET, "reminders", credentials)
            .send()
            .await
    }

    pub async fn reminder_create(
        &self,
        credentials: Option<&Credentials>,
        body: &ReminderBody,
    ) -> reqwest::Result<Response> {
        self.authorized_request(Method::POST, "reminders", credentials)
            .json(body)
            .send()
            .await
    }

    pub async fn reminder_update(
        &self,
        credentials: Option<&Credentials>,
        id: &str,
        body: &ReminderBody,
    ) -> reqwest::Result<Response> {
        self.authorized_request(Method::PUT, &format!("reminders/{}", id), credentials)
            .json(body)
            .send()
            .await
    }

    pub async fn reminder_delete(
        &self,
        credentials: Option<&Credentials>,
        id: &str,
    ) -> reqwest::Result<Response> {
        self.authorized_request(Method::DELETE, &format!("reminders/{}", id), credentials)
            .send()
            .await
    }

    pub async fn reminders_check(&self, credentials: Option<&Credentials>) -> reqwest::Result<Response> {
        self.authorized_request(Method::POST, "reminders/check", credentials)
            .send()
            .await
    }

    /// Create a reminder and return its id
    pub async fn create_reminder(&self, credentials: &Credentials, body: &ReminderBody) -> String {
        let res = self
            .reminder_create(Some(credentials), body)
            .await
            .expect("Failed to execute request");
        assert_eq!(reqwest::StatusCode::CREATED, res.status());

        let reminder: serde_json::Value = res.json().await.expect("Failed to parse reminder");
        reminder["id"]
            .as_str()
            .expect("Reminder has no id")
            .to_string()
    }

    /// Stored reminders as raw JSON
    pub fn stored_reminders(&self) -> serde_json::Value {
        let contents =
            std::fs::read_to_string(self.data_file("lembretes.json")).unwrap_or_else(|_| "[]".into());
        serde_json::from_str(&contents).expect("Stored reminders are not JSON")
    }
}

#[derive(Debug, Clone)]
pub struct TestUser {
    pub id: Uuid,
    pub username: String,
    pub password: String,
}

impl TestUser {
    pub async fn register(context: &Context, role: Role, first_login_pending: bool) -> Self {
        use rand::{distributions::Alphanumeric, Rng};

        let username: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(10)
            .map(char::from)
            .collect();
        let password = format!("{}-password", username);

        let password_hash = compute_password_hash(Secret::new(password.clone()))
            .expect("Failed to hash user password");

        let new_user = NewUser {
            username: username.parse().expect("Failed to parse username"),
            password_hash,
            role,
        };

        let user = context
            .users
            .insert(new_user, first_login_pending)
            .await
            .expect("Failed to insert test user");

        Self {
            id: user.id,
            username,
            password,
        }
    }

    pub fn credentials(&self) -> Credentials {
        Credentials {
            username: self.username.clone(),
            password: self.password.clone(),
        }
    }
}
