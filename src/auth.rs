mod access;
mod credentials;
mod session;

pub use access::{delete_user, ReminderAccess};
pub use credentials::Credentials;
pub use session::{Administrator, Authenticated, Session};
