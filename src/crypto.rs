use anyhow::Context;

use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};

use secrecy::{ExposeSecret, Secret};

use crate::error::{Error, Result};

const MIN_PASSWORD_LEN: usize = 8;
const MAX_PASSWORD_LEN: usize = 128;

/// Reject passwords that are too short or too long to accept
pub fn validate_password(password: &Secret<String>) -> Result<()> {
    let len = password.expose_secret().chars().count();
    if len < MIN_PASSWORD_LEN {
        return Err(Error::ParsingError(format!(
            "Password must have at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    if len > MAX_PASSWORD_LEN {
        return Err(Error::ParsingError(format!(
            "Password must have at most {} characters",
            MAX_PASSWORD_LEN
        )));
    }
    Ok(())
}

/// Hash a password into an argon2 PHC string. CPU heavy, run it off the async executor.
pub fn compute_password_hash(password: Secret<String>) -> anyhow::Result<Secret<String>> {
    let salt = SaltString::generate(&mut rand::thread_rng());

    let password_hash = Argon2::default()
        .hash_password(password.expose_secret().as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!(e))
        .context("Failed to hash password")?
        .to_string();

    Ok(Secret::new(password_hash))
}

/// Check a password against a stored PHC string. CPU heavy, run it off the async executor.
#[tracing::instrument("Verify password hash", skip(password, password_hash))]
pub fn verify_password_hash(
    password: Secret<String>,
    password_hash: Secret<String>,
) -> anyhow::Result<()> {
    let password_hash = PasswordHash::new(password_hash.expose_secret())
        .map_err(|e| anyhow::anyhow!(e))
        .context("Failed to parse stored password hash")?;

    Argon2::default()
        .verify_password(password.expose_secret().as_bytes(), &password_hash)
        .map_err(|e| anyhow::anyhow!(e))
        .context("Invalid password")
}
