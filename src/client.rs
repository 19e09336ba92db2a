mod email_client;

pub use email_client::{Email, Mailer, SendEmailError, SmtpMailer, SmtpSecurity};
