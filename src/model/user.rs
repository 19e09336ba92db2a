use std::str::FromStr;

use secrecy::Secret;

use serde::{Deserialize, Serialize};

use uuid::Uuid;

use crate::domain::Username;
use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Normal,
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "normal" => Ok(Self::Normal),
            other => Err(Error::ParsingError(format!(
                "{} is not a valid role",
                other
            ))),
        }
    }
}

/// New User request, with the password already hashed
#[derive(Debug)]
pub struct NewUser {
    pub username: Username,
    pub password_hash: Secret<String>,
    pub role: Role,
}

/// Stored User record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    /// PHC string produced by argon2
    pub password_hash: String,
    pub role: Role,
    /// Set for accounts created with a temporary password
    #[serde(default)]
    pub first_login_pending: bool,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn password_hash(&self) -> Secret<String> {
        Secret::new(self.password_hash.clone())
    }
}

/// User record without credentials, safe to hand out
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub username: String,
    pub role: Role,
    pub first_login_pending: bool,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            role: user.role,
            first_login_pending: user.first_login_pending,
        }
    }
}
