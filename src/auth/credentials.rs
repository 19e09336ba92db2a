use actix_web::http::header::{self, HeaderMap};

use anyhow::Context;

use secrecy::Secret;

const BASIC_AUTH_PREFIX: &str = "Basic ";

#[derive(Debug)]
pub struct Credentials {
    pub username: String,
    pub password: Secret<String>,
}

impl Credentials {
    /// Extract Basic credentials from the headers of a request
    pub fn from_headers(headers: &HeaderMap) -> anyhow::Result<Self> {
        let header_value = headers
            .get(header::AUTHORIZATION)
            .context("Missing authorization in header")?
            .to_str()?;

        if header_value.starts_with(BASIC_AUTH_PREFIX) {
            Self::from_basic(header_value)
        } else {
            anyhow::bail!("Missing or unknown Authorization scheme")
        }
    }

    /// Parse a value formatted as 'Basic <base64 username:password>'
    pub fn from_basic(header_value: &str) -> anyhow::Result<Self> {
        use base64::Engine;

        let encoded = header_value
            .strip_prefix(BASIC_AUTH_PREFIX)
            .context("Authorization scheme not basic")?;
        let decoded = base64::engine::general_purpose::STANDARD
            .decode(encoded.trim())
            .context("Failed to decode authorization header")?;
        let decoded = String::from_utf8(decoded).context("Authorization header is not UTF-8")?;

        // Passwords may contain colons, usernames may not
        let (username, password) = decoded
            .split_once(':')
            .context("Missing password in authorization")?;
        if username.is_empty() {
            anyhow::bail!("Missing username in authorization");
        }

        Ok(Self {
            username: username.into(),
            password: Secret::new(password.into()),
        })
    }
}
