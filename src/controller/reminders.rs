use actix_web::dev::HttpServiceFactory;
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};

use serde::{Deserialize, Serialize};

use uuid::Uuid;

use crate::auth::{ReminderAccess, Session};
use crate::context::Context;
use crate::error::{Error, RestResult};
use crate::evaluator;
use crate::model::{NewReminder, Reminder, ReminderEdit, ReminderStatus};

/// JSON body for creating or editing a reminder
#[derive(Debug, Deserialize)]
pub struct ReminderBody {
    title: String,
    #[serde(default)]
    description: String,
    /// `YYYY-MM-DD HH:MM` in the configured zone
    scheduled_at: String,
}

impl TryFrom<ReminderBody> for NewReminder {
    type Error = Error;

    fn try_from(body: ReminderBody) -> Result<Self, Self::Error> {
        Ok(Self {
            title: body.title.parse()?,
            description: body.description.trim().to_string(),
            scheduled_at: body.scheduled_at.parse()?,
        })
    }
}

impl TryFrom<ReminderBody> for ReminderEdit {
    type Error = Error;

    fn try_from(body: ReminderBody) -> Result<Self, Self::Error> {
        let NewReminder {
            title,
            description,
            scheduled_at,
        } = body.try_into()?;
        Ok(Self {
            title,
            description,
            scheduled_at,
        })
    }
}

/// A stored reminder with where it stands right now
#[derive(Debug, Serialize)]
pub struct ReminderView {
    id: String,
    owner: Option<Uuid>,
    title: String,
    description: String,
    scheduled_at: String,
    sent: bool,
    status: ReminderStatus,
}

impl ReminderView {
    fn new(reminder: Reminder, context: &Context) -> Self {
        let status = reminder.status(context.local_now());
        Self {
            id: reminder.id,
            owner: reminder.owner,
            title: reminder.title,
            description: reminder.description,
            scheduled_at: reminder.scheduled_at,
            sent: reminder.sent,
            status,
        }
    }
}

#[tracing::instrument(name = "List reminders", skip(session, context))]
#[get("")]
async fn list(session: Session, context: web::Data<Context>) -> RestResult<impl Responder> {
    let reminders = ReminderAccess::new(context.reminders.as_ref(), &session)
        .list()
        .await;

    let views: Vec<ReminderView> = reminders
        .into_iter()
        .map(|reminder| ReminderView::new(reminder, &context))
        .collect();

    Ok(HttpResponse::Ok().json(views))
}

#[tracing::instrument(name = "Create a reminder", skip(session, context))]
#[post("")]
async fn create(
    session: Session,
    context: web::Data<Context>,
    body: web::Json<ReminderBody>,
) -> RestResult<impl Responder> {
    let new_reminder: NewReminder = body.into_inner().try_into()?;

    let reminder = ReminderAccess::new(context.reminders.as_ref(), &session)
        .create(new_reminder)
        .await?;

    Ok(HttpResponse::Created().json(ReminderView::new(reminder, &context)))
}

#[tracing::instrument(name = "Edit a reminder", skip(session, context))]
#[put("/{id}")]
async fn update(
    session: Session,
    context: web::Data<Context>,
    path: web::Path<(String,)>,
    body: web::Json<ReminderBody>,
) -> RestResult<impl Responder> {
    let (id,) = path.into_inner();
    let edit: ReminderEdit = body.into_inner().try_into()?;

    let reminder = ReminderAccess::new(context.reminders.as_ref(), &session)
        .update(&id, edit)
        .await?;

    Ok(HttpResponse::Ok().json(ReminderView::new(reminder, &context)))
}

#[tracing::instrument(name = "Delete a reminder", skip(session, context))]
#[delete("/{id}")]
async fn remove(
    session: Session,
    context: web::Data<Context>,
    path: web::Path<(String,)>,
) -> RestResult<impl Responder> {
    let (id,) = path.into_inner();

    ReminderAccess::new(context.reminders.as_ref(), &session)
        .delete(&id)
        .await?;

    Ok(HttpResponse::NoContent().finish())
}

/// Run one evaluation pass over every stored reminder
#[tracing::instrument(name = "Check due reminders", skip(_session, context))]
#[post("/check")]
async fn check(_session: Session, context: web::Data<Context>) -> RestResult<impl Responder> {
    let report = evaluator::run_pass(&context).await;

    Ok(HttpResponse::Ok().json(report))
}

/// Reminders API endpoints
pub fn scope() -> impl HttpServiceFactory {
    web::scope("/reminders")
        .service(list)
        .service(create)
        .service(check)
        .service(update)
        .service(remove)
}
