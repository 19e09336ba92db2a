use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;

use crate::error::{Error, Result};

/// Stored layout of a reminder's date and time of day
pub const SCHEDULE_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Civil date and time-of-day a reminder is due at.
///
/// Carries no zone: it is read in the single zone the application is configured for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ScheduledAt(NaiveDateTime);

impl ScheduledAt {
    /// A reminder is due once the current civil time reaches its schedule
    pub fn is_due(&self, now: NaiveDateTime) -> bool {
        self.0 <= now
    }
}

impl From<NaiveDateTime> for ScheduledAt {
    fn from(value: NaiveDateTime) -> Self {
        Self(value)
    }
}

impl AsRef<NaiveDateTime> for ScheduledAt {
    fn as_ref(&self) -> &NaiveDateTime {
        &self.0
    }
}

impl FromStr for ScheduledAt {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        NaiveDateTime::parse_from_str(value.trim(), SCHEDULE_FORMAT)
            .map(Self)
            .map_err(|e| {
                Error::ParsingError(format!(
                    "Schedule \"{}\" is not of the form YYYY-MM-DD HH:MM: {}",
                    value, e
                ))
            })
    }
}

impl fmt::Display for ScheduledAt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.format(SCHEDULE_FORMAT).fmt(f)
    }
}
