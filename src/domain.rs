mod email_address;
mod reminder_title;
mod scheduled_at;
mod username;

pub use email_address::EmailAddress;
pub use reminder_title::ReminderTitle;
pub use scheduled_at::{ScheduledAt, SCHEDULE_FORMAT};
pub use username::Username;
