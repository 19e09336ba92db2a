//! Due-reminder evaluation.
//!
//! A pass walks the whole collection in stored order. Every unsent reminder whose
//! schedule is at or before `now` gets one delivery attempt, and only a confirmed
//! delivery flips it to sent. Anything else leaves the record as it was so the next
//! pass picks it up again.

use chrono::NaiveDateTime;

use serde::Serialize;

use uuid::Uuid;

use crate::client::{Email, Mailer};
use crate::context::Context;
use crate::domain::{EmailAddress, ScheduledAt};
use crate::model::{DestinationBook, Reminder};

/// Picks the address a reminder's notification goes to
#[derive(Debug, Clone)]
pub struct DestinationResolver {
    book: DestinationBook,
    fallback: Option<EmailAddress>,
}

impl DestinationResolver {
    pub fn new(book: DestinationBook, fallback: Option<EmailAddress>) -> Self {
        Self { book, fallback }
    }

    /// The owner's configured address, or the fallback. Records without an owner use
    /// the global slot before the fallback.
    pub fn resolve(&self, owner: Option<Uuid>) -> Option<EmailAddress> {
        let configured = match owner {
            Some(user_id) => self.book.address_for(user_id),
            None => self.book.global.as_deref(),
        };

        configured
            .and_then(|address| match address.parse() {
                Ok(address) => Some(address),
                Err(error) => {
                    tracing::warn!(
                        error.cause_chain = ?error,
                        "Ignoring invalid destination address (owner: {:?})",
                        owner
                    );
                    None
                }
            })
            .or_else(|| self.fallback.clone())
    }
}

/// Outcome of one evaluation pass
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EvaluationReport {
    /// Delivered and marked sent
    pub sent: usize,
    /// Due, but the mailer reported a failure
    pub failed: usize,
    /// Due, but no destination address could be resolved
    pub undeliverable: usize,
    /// Skipped because the schedule does not parse
    pub malformed: usize,
    pub upcoming: usize,
    pub already_sent: usize,
    /// Whether the collection was written back
    pub saved: bool,
}

impl EvaluationReport {
    pub fn changed(&self) -> bool {
        self.sent > 0
    }
}

/// The notification for a due reminder
pub fn reminder_email(
    reminder: &Reminder,
    scheduled_at: &ScheduledAt,
    recipient: EmailAddress,
) -> Email {
    let when = scheduled_at.as_ref();
    let description = if reminder.description.trim().is_empty() {
        "-"
    } else {
        reminder.description.as_str()
    };

    Email {
        recipient,
        subject: format!("Reminder: {}", reminder.title),
        text_body: format!(
            "Title: {}\nDescription: {}\nDate: {}\nTime: {}\n",
            reminder.title,
            description,
            when.format("%Y-%m-%d"),
            when.format("%H:%M"),
        ),
    }
}

/// Attempt delivery of every due, unsent reminder, updating `sent` in place
#[tracing::instrument(name = "Evaluate reminders", skip(reminders, resolver, mailer), fields(count = reminders.len()))]
pub async fn evaluate(
    reminders: &mut [Reminder],
    now: NaiveDateTime,
    resolver: &DestinationResolver,
    mailer: &dyn Mailer,
) -> EvaluationReport {
    let mut report = EvaluationReport::default();

    for reminder in reminders.iter_mut() {
        if reminder.sent {
            report.already_sent += 1;
            continue;
        }

        let scheduled_at = match reminder.schedule() {
            Ok(scheduled_at) => scheduled_at,
            Err(error) => {
                tracing::warn!(
                    error.cause_chain = ?error,
                    "Skipping reminder with an invalid schedule (id: {}, scheduled_at: {:?})",
                    reminder.id,
                    reminder.scheduled_at
                );
                report.malformed += 1;
                continue;
            }
        };

        if !scheduled_at.is_due(now) {
            report.upcoming += 1;
            continue;
        }

        let Some(recipient) = resolver.resolve(reminder.owner) else {
            tracing::warn!(
                "No destination address for reminder (id: {}, owner: {:?})",
                reminder.id,
                reminder.owner
            );
            report.undeliverable += 1;
            continue;
        };

        let email = reminder_email(reminder, &scheduled_at, recipient);
        match mailer.send(&email).await {
            Ok(()) => {
                tracing::info!("Sent reminder {} to {}", reminder.id, email.recipient);
                reminder.sent = true;
                report.sent += 1;
            }
            Err(error) => {
                tracing::warn!(
                    error.cause_chain = ?error,
                    "Failed to send reminder (id: {})",
                    reminder.id
                );
                report.failed += 1;
            }
        }
    }

    report
}

/// One full pass: load the store, evaluate it, and save it back when a reminder was sent
#[tracing::instrument(name = "Run evaluation pass", skip(context))]
pub async fn run_pass(context: &Context) -> EvaluationReport {
    let mut reminders = context.reminders.load().await;
    let resolver = DestinationResolver::new(
        context.destinations.fetch().await,
        context.fallback_address.clone(),
    );

    let mut report = evaluate(
        &mut reminders,
        context.local_now(),
        &resolver,
        context.mailer.as_ref(),
    )
    .await;

    if report.changed() {
        match context.reminders.save(&reminders).await {
            Ok(()) => report.saved = true,
            Err(error) => {
                tracing::error!(error.cause_chain = ?error, "Failed to save evaluated reminders");
            }
        }
    }

    report
}
