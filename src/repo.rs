mod destinations;
mod json_file;
mod reminders;
mod users;

pub use destinations::DestinationsRepo;
pub use json_file::JsonFile;
pub use reminders::{InMemoryReminderStore, JsonReminderStore, ReminderStore};
pub use users::UsersRepo;
