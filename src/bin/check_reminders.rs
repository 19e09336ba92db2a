//! One evaluation pass over the stored reminders, meant to be run by an outside
//! scheduler such as cron.

use reminders::context::Context;
use reminders::evaluator;
use reminders::settings::Settings;
use reminders::telemetry::{create_subscriber, set_subscriber};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    set_subscriber(create_subscriber("info", std::io::stdout))?;

    let settings = Settings::load()?;
    let context = Context::from_settings(&settings)?;

    let report = evaluator::run_pass(&context).await;
    tracing::info!(
        sent = report.sent,
        failed = report.failed,
        undeliverable = report.undeliverable,
        malformed = report.malformed,
        upcoming = report.upcoming,
        already_sent = report.already_sent,
        saved = report.saved,
        "Evaluation pass finished"
    );

    Ok(())
}
