use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use uuid::Uuid;

use crate::domain::EmailAddress;

/// Per-user slot of the destination book
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DestinationEntry {
    #[serde(rename = "email_destino", default)]
    pub address: Option<String>,
}

/// Where notifications go, as stored in the configuration file.
///
/// The top-level `email_destino` key is the single global slot; every other key is a
/// user id holding that user's own `{"email_destino": ...}` entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DestinationBook {
    #[serde(
        rename = "email_destino",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub global: Option<String>,
    #[serde(flatten)]
    pub per_user: BTreeMap<String, DestinationEntry>,
}

impl DestinationBook {
    /// The configured address of a user, if any
    pub fn address_for(&self, user_id: Uuid) -> Option<&str> {
        self.per_user
            .get(&user_id.to_string())
            .and_then(|entry| entry.address.as_deref())
    }

    pub fn set_address(&mut self, user_id: Uuid, address: &EmailAddress) {
        self.per_user.insert(
            user_id.to_string(),
            DestinationEntry {
                address: Some(address.to_string()),
            },
        );
    }

    pub fn remove(&mut self, user_id: Uuid) -> bool {
        self.per_user.remove(&user_id.to_string()).is_some()
    }
}
