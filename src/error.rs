use actix_web::http::header::{self, HeaderValue};
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};

use thiserror::Error;

use crate::client::SendEmailError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    // Parsing errors
    #[error("{0}")]
    ParsingError(String),
    // Lookup and access errors
    #[error("{0} not found")]
    NotFound(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    Conflict(String),
    // Storage errors
    #[error("Failed to write {path}")]
    Storage {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to serialize stored records")]
    Serialization(#[from] serde_json::Error),
}

pub type RestResult<T> = std::result::Result<T, RestError>;

#[derive(Debug, Error)]
pub enum RestError {
    #[error("Parse Error: {0}")]
    ParseError(String),

    #[error("Failed to authenticate")]
    FailedToAuthenticate(#[source] anyhow::Error),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Failed to send email")]
    FailedToSendEmail(#[source] SendEmailError),

    #[error("Internal Server Error: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<Error> for RestError {
    fn from(e: Error) -> Self {
        match e {
            Error::ParsingError(msg) => Self::ParseError(msg),
            Error::NotFound(what) => Self::NotFound(what),
            Error::Forbidden(msg) => Self::Forbidden(msg),
            Error::Conflict(msg) => Self::Conflict(msg),
            e @ (Error::Storage { .. } | Error::Serialization(_)) => {
                tracing::error!(error.cause_chain = ?e, "Storage failure");
                Self::InternalError("Storage error".into())
            }
        }
    }
}

impl ResponseError for RestError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::ParseError(_) => StatusCode::BAD_REQUEST,
            Self::FailedToAuthenticate(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::FailedToSendEmail(_) => StatusCode::BAD_GATEWAY,
            Self::InternalError(_) | Self::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut res = HttpResponse::build(self.status_code());
        if let Self::FailedToAuthenticate(_) = self {
            res.insert_header((
                header::WWW_AUTHENTICATE,
                HeaderValue::from_static(r#"Basic realm="reminders""#),
            ));
        }
        res.body(self.to_string())
    }
}
