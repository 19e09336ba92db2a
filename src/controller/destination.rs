use actix_web::dev::HttpServiceFactory;
use actix_web::{get, post, put, web, HttpResponse, Responder};

use serde::{Deserialize, Serialize};

use crate::auth::Session;
use crate::client::Email;
use crate::context::Context;
use crate::domain::EmailAddress;
use crate::error::{RestError, RestResult};
use crate::evaluator::DestinationResolver;

#[derive(Debug, Deserialize)]
pub struct DestinationBody {
    address: String,
}

#[derive(Debug, Deserialize)]
pub struct TestEmailBody {
    #[serde(default = "default_subject")]
    subject: String,
    #[serde(default = "default_body")]
    body: String,
}

fn default_subject() -> String {
    "Reminder test".into()
}

fn default_body() -> String {
    "This is a test email from your reminders.".into()
}

/// The caller's own setting and the address notifications actually go to
#[derive(Debug, Serialize)]
pub struct DestinationView {
    address: Option<String>,
    resolved: Option<EmailAddress>,
}

async fn view(session: &Session, context: &Context) -> DestinationView {
    let book = context.destinations.fetch().await;
    let address = book.address_for(session.user_id()).map(str::to_string);
    let resolved = DestinationResolver::new(book, context.fallback_address.clone())
        .resolve(Some(session.user_id()));

    DestinationView { address, resolved }
}

#[tracing::instrument(name = "Show destination", skip(session, context))]
#[get("")]
async fn show(session: Session, context: web::Data<Context>) -> RestResult<impl Responder> {
    Ok(HttpResponse::Ok().json(view(&session, &context).await))
}

#[tracing::instrument(name = "Set destination", skip(session, context))]
#[put("")]
async fn update(
    session: Session,
    context: web::Data<Context>,
    body: web::Json<DestinationBody>,
) -> RestResult<impl Responder> {
    let address: EmailAddress = body.address.parse()?;

    context
        .destinations
        .set_address(session.user_id(), &address)
        .await?;

    Ok(HttpResponse::Ok().json(view(&session, &context).await))
}

/// Send a test email to the caller's resolved destination
#[tracing::instrument(name = "Send test email", skip(session, context))]
#[post("/test")]
async fn send_test(
    session: Session,
    context: web::Data<Context>,
    body: web::Json<TestEmailBody>,
) -> RestResult<impl Responder> {
    let recipient = view(&session, &context)
        .await
        .resolved
        .ok_or_else(|| RestError::Conflict("No destination address configured".into()))?;
    let TestEmailBody { subject, body } = body.into_inner();

    let email = Email {
        recipient,
        subject,
        text_body: body,
    };
    context
        .mailer
        .send(&email)
        .await
        .map_err(RestError::FailedToSendEmail)?;

    Ok(HttpResponse::Ok().json(view(&session, &context).await))
}

/// Destination API endpoints
pub fn scope() -> impl HttpServiceFactory {
    web::scope("/destination")
        .service(show)
        .service(update)
        .service(send_test)
}
