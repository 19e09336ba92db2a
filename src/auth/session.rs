use std::future::Future;
use std::pin::Pin;

use actix_web::{dev, web, FromRequest, HttpRequest};

use anyhow::Context as _;

use uuid::Uuid;

use crate::auth::Credentials;
use crate::context::Context;
use crate::crypto::verify_password_hash;
use crate::error::{RestError, RestResult};
use crate::model::{Role, User};
use crate::repo::UsersRepo;
use crate::telemetry::spawn_blocking_with_tracing;

type Extracted<T> = Pin<Box<dyn Future<Output = Result<T, RestError>>>>;

/// A request carrying valid credentials, including accounts that still have to
/// replace their temporary password
#[derive(Debug, Clone)]
pub struct Authenticated(User);

/// The identity every authorized operation acts as
#[derive(Debug, Clone)]
pub struct Session {
    user: User,
}

/// A session whose user holds the admin role
#[derive(Debug, Clone)]
pub struct Administrator(Session);

impl Authenticated {
    pub fn user(&self) -> &User {
        &self.0
    }
}

impl Session {
    /// Wrap a user that has already been authenticated
    pub fn new(user: User) -> Self {
        Self { user }
    }

    pub fn user_id(&self) -> Uuid {
        self.user.id
    }

    pub fn username(&self) -> &str {
        &self.user.username
    }

    pub fn role(&self) -> Role {
        self.user.role
    }

    pub fn is_admin(&self) -> bool {
        self.user.is_admin()
    }
}

impl Administrator {
    pub fn session(&self) -> &Session {
        &self.0
    }
}

impl TryFrom<Authenticated> for Session {
    type Error = RestError;

    fn try_from(authenticated: Authenticated) -> RestResult<Self> {
        if authenticated.0.first_login_pending {
            return Err(RestError::Forbidden(
                "Password change required before first use".into(),
            ));
        }
        Ok(Self::new(authenticated.0))
    }
}

impl TryFrom<Session> for Administrator {
    type Error = RestError;

    fn try_from(session: Session) -> RestResult<Self> {
        if !session.is_admin() {
            return Err(RestError::Forbidden("Administrator role required".into()));
        }
        Ok(Self(session))
    }
}

impl FromRequest for Authenticated {
    type Error = RestError;
    type Future = Extracted<Self>;

    fn from_request(req: &HttpRequest, _: &mut dev::Payload) -> Self::Future {
        let req = req.clone();
        Box::pin(async move {
            // NOTE: Must be registered with the application at startup
            let context = req
                .app_data::<web::Data<Context>>()
                .context("Context not registered for application")?;
            // Pull the credentials from the headers
            let creds = Credentials::from_headers(req.headers())
                .map_err(RestError::FailedToAuthenticate)?;
            // Get the user and verify the credentials
            let user = validate_credentials(&context.users, creds).await?;
            Ok(Self(user))
        })
    }
}

impl FromRequest for Session {
    type Error = RestError;
    type Future = Extracted<Self>;

    fn from_request(req: &HttpRequest, payload: &mut dev::Payload) -> Self::Future {
        let authenticated = Authenticated::from_request(req, payload);
        Box::pin(async move { authenticated.await?.try_into() })
    }
}

impl FromRequest for Administrator {
    type Error = RestError;
    type Future = Extracted<Self>;

    fn from_request(req: &HttpRequest, payload: &mut dev::Payload) -> Self::Future {
        let session = Session::from_request(req, payload);
        Box::pin(async move { session.await?.try_into() })
    }
}

#[tracing::instrument("Validate credentials", skip(users, credentials), fields(username = %credentials.username))]
async fn validate_credentials(users: &UsersRepo, credentials: Credentials) -> RestResult<User> {
    let user = users
        .fetch_by_username(&credentials.username)
        .await
        .context("Unknown username")
        .map_err(RestError::FailedToAuthenticate)?;

    let password = credentials.password;
    let password_hash = user.password_hash();
    spawn_blocking_with_tracing(move || verify_password_hash(password, password_hash))
        .await
        .context("Failed to spawn blocking task")?
        .map_err(RestError::FailedToAuthenticate)?;

    Ok(user)
}
