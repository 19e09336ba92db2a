pub mod destination;
pub mod reminders;
pub mod users;
