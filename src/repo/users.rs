use secrecy::{ExposeSecret, Secret};

use serde::{Deserialize, Serialize};

use serde_json::Value;

use uuid::Uuid;

use crate::error::{Error, Result};
use crate::model::{NewUser, User};
use crate::repo::JsonFile;

/// One element of the users file. Elements that do not read as a `User` are carried
/// along untouched so that a rewrite of the file keeps them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum StoredUser {
    Parsed(User),
    Unreadable(Value),
}

impl StoredUser {
    fn user(&self) -> Option<&User> {
        match self {
            Self::Parsed(user) => Some(user),
            Self::Unreadable(_) => None,
        }
    }
}

/// Repository for the stored user accounts
#[derive(Clone)]
pub struct UsersRepo {
    file: JsonFile,
}

impl UsersRepo {
    pub fn new(file: JsonFile) -> Self {
        Self { file }
    }

    async fn load(&self) -> Vec<StoredUser> {
        let records: Vec<StoredUser> = self.file.load().await;
        let unreadable = records.iter().filter(|r| r.user().is_none()).count();
        if unreadable > 0 {
            tracing::warn!("Keeping {} unreadable user record(s) as found", unreadable);
        }
        records
    }

    pub async fn fetch_all(&self) -> Vec<User> {
        self.load()
            .await
            .into_iter()
            .filter_map(|record| match record {
                StoredUser::Parsed(user) => Some(user),
                StoredUser::Unreadable(_) => None,
            })
            .collect()
    }

    /// True only when the users file holds no records at all, readable or not
    pub async fn is_empty(&self) -> bool {
        self.load().await.is_empty()
    }

    pub async fn fetch_by_id(&self, id: Uuid) -> Option<User> {
        self.fetch_all().await.into_iter().find(|user| user.id == id)
    }

    pub async fn fetch_by_username(&self, username: &str) -> Option<User> {
        self.fetch_all()
            .await
            .into_iter()
            .find(|user| user.username.eq_ignore_ascii_case(username))
    }

    #[tracing::instrument("Insert a new user record", skip(self, new_user), fields(username = %new_user.username))]
    pub async fn insert(&self, new_user: NewUser, first_login_pending: bool) -> Result<User> {
        let mut records = self.load().await;
        if records
            .iter()
            .filter_map(StoredUser::user)
            .any(|user| user.username.eq_ignore_ascii_case(new_user.username.as_ref()))
        {
            return Err(Error::Conflict(format!(
                "Username {} is already taken",
                new_user.username
            )));
        }

        let user = User {
            id: Uuid::new_v4(),
            username: new_user.username.to_string(),
            password_hash: new_user.password_hash.expose_secret().clone(),
            role: new_user.role,
            first_login_pending,
        };
        records.push(StoredUser::Parsed(user.clone()));
        self.file.save(&records).await?;

        Ok(user)
    }

    /// Remove a user, returning the removed record
    #[tracing::instrument("Delete a user record", skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<User> {
        let mut records = self.load().await;
        let position = records
            .iter()
            .position(|record| record.user().map_or(false, |user| user.id == id))
            .ok_or_else(|| Error::NotFound(format!("User {}", id)))?;

        let removed = match records.remove(position) {
            StoredUser::Parsed(user) => user,
            StoredUser::Unreadable(_) => return Err(Error::NotFound(format!("User {}", id))),
        };
        self.file.save(&records).await?;

        Ok(removed)
    }

    /// Store a new password hash, which also completes a pending first login
    #[tracing::instrument("Update a user password", skip(self, password_hash))]
    pub async fn update_password(&self, id: Uuid, password_hash: Secret<String>) -> Result<()> {
        let mut records = self.load().await;
        let user = records
            .iter_mut()
            .find_map(|record| match record {
                StoredUser::Parsed(user) if user.id == id => Some(user),
                _ => None,
            })
            .ok_or_else(|| Error::NotFound(format!("User {}", id)))?;

        user.password_hash = password_hash.expose_secret().clone();
        user.first_login_pending = false;
        self.file.save(&records).await
    }
}
