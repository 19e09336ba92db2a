use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

const MIN_LEN: usize = 3;
const MAX_LEN: usize = 32;

/// Login name of an account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Username(String);

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for Username {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        let value = value.trim();

        if value.len() < MIN_LEN {
            return Err(Error::ParsingError("Username too short".into()));
        }
        if value.len() > MAX_LEN {
            return Err(Error::ParsingError("Username too long".into()));
        }
        if !value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        {
            return Err(Error::ParsingError(
                "Username contains invalid characters".into(),
            ));
        }
        Ok(Self(value.to_string()))
    }
}
