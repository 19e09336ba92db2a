use actix_web::dev::HttpServiceFactory;
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};

use anyhow::Context as _;

use secrecy::Secret;

use serde::Deserialize;

use uuid::Uuid;

use crate::auth::{self, Administrator, Authenticated};
use crate::context::Context;
use crate::crypto::{compute_password_hash, validate_password};
use crate::error::RestResult;
use crate::model::{NewUser, Role, UserProfile};
use crate::telemetry::spawn_blocking_with_tracing;

fn default_role() -> Role {
    Role::Normal
}

#[derive(Debug, Deserialize)]
pub struct NewUserBody {
    username: String,
    /// Temporary password, replaced by the user on first login
    password: Secret<String>,
    #[serde(default = "default_role")]
    role: Role,
}

#[derive(Debug, Deserialize)]
pub struct PasswordBody {
    new_password: Secret<String>,
}

async fn hash_password(password: Secret<String>) -> RestResult<Secret<String>> {
    validate_password(&password)?;

    let password_hash = spawn_blocking_with_tracing(move || compute_password_hash(password))
        .await
        .context("Failed to spawn blocking task")??;
    Ok(password_hash)
}

#[tracing::instrument(name = "List users", skip(_admin, context))]
#[get("")]
async fn list(_admin: Administrator, context: web::Data<Context>) -> RestResult<impl Responder> {
    let users: Vec<UserProfile> = context
        .users
        .fetch_all()
        .await
        .iter()
        .map(UserProfile::from)
        .collect();

    Ok(HttpResponse::Ok().json(users))
}

#[tracing::instrument(name = "Create a user", skip(_admin, context))]
#[post("")]
async fn create(
    _admin: Administrator,
    context: web::Data<Context>,
    body: web::Json<NewUserBody>,
) -> RestResult<impl Responder> {
    let NewUserBody {
        username,
        password,
        role,
    } = body.into_inner();

    let new_user = NewUser {
        username: username.parse()?,
        password_hash: hash_password(password).await?,
        role,
    };
    let user = context.users.insert(new_user, true).await?;

    Ok(HttpResponse::Created().json(UserProfile::from(&user)))
}

/// Delete a user with everything they own
#[tracing::instrument(name = "Delete a user", skip(admin, context))]
#[delete("/{id}")]
async fn remove(
    admin: Administrator,
    context: web::Data<Context>,
    path: web::Path<(Uuid,)>,
) -> RestResult<impl Responder> {
    let (user_id,) = path.into_inner();

    let profile = auth::delete_user(&context, &admin, user_id).await?;

    Ok(HttpResponse::Ok().json(profile))
}

/// Replace the caller's own password. Open to accounts with a pending first login.
#[tracing::instrument(name = "Change own password", skip(authenticated, context))]
#[put("/me/password")]
async fn change_password(
    authenticated: Authenticated,
    context: web::Data<Context>,
    body: web::Json<PasswordBody>,
) -> RestResult<impl Responder> {
    let password_hash = hash_password(body.into_inner().new_password).await?;

    context
        .users
        .update_password(authenticated.user().id, password_hash)
        .await?;

    Ok(HttpResponse::NoContent().finish())
}

/// Users API endpoints
pub fn scope() -> impl HttpServiceFactory {
    web::scope("/users")
        .service(list)
        .service(create)
        .service(change_password)
        .service(remove)
}
