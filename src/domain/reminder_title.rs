use std::fmt;
use std::str::FromStr;

use unicode_segmentation::UnicodeSegmentation;

use crate::error::{Error, Result};

const MAX_LEN: usize = 100;

/// Title of a reminder, required at creation and on every edit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderTitle(String);

impl AsRef<str> for ReminderTitle {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<ReminderTitle> for String {
    fn from(value: ReminderTitle) -> String {
        value.0
    }
}

impl fmt::Display for ReminderTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for ReminderTitle {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        let value = value.trim();

        if value.is_empty() {
            return Err(Error::ParsingError("Title cannot be empty".into()));
        }
        if value.graphemes(true).count() > MAX_LEN {
            return Err(Error::ParsingError("Title too long".into()));
        }
        Ok(Self(value.to_string()))
    }
}
