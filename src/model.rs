mod destination;
mod reminder;
mod user;

pub use destination::{DestinationBook, DestinationEntry};
pub use reminder::{NewReminder, Reminder, ReminderEdit, ReminderStatus};
pub use user::{NewUser, Role, User, UserProfile};
