use std::net::TcpListener;

use anyhow::Context as _;

use reminders::app;
use reminders::context::Context;
use reminders::settings::Settings;
use reminders::telemetry::{create_subscriber, set_subscriber};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    set_subscriber(create_subscriber("info", std::io::stdout))?;

    let settings = Settings::load()?;
    let context = Context::from_settings(&settings)?;

    if let Err(error) = context.bootstrap_admin(&settings.auth).await {
        tracing::error!(error.cause_chain = ?error, "Failed to create the first administrator");
    }

    let listener = TcpListener::bind(settings.app.addr())?;
    tracing::info!("Listening on {}", listener.local_addr()?);

    app::run(listener, context)?.await.context("Failed to run app")
}
