use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Output};

use async_trait::async_trait;

use secrecy::{ExposeSecret, Secret};

use tokio::process::Command;

use url::Url;

const TOKEN_USERNAME: &str = "x-access-token";

#[derive(Debug, thiserror::Error)]
pub enum ReplicationError {
    #[error("Replication is missing its {0}")]
    NotConfigured(&'static str),
    #[error("I/O failure while replicating")]
    Io(#[from] std::io::Error),
    #[error("`git {command}` exited with {status}: {stderr}")]
    CommandFailed {
        command: &'static str,
        status: ExitStatus,
        stderr: String,
    },
}

/// Copies a freshly saved file somewhere outside this process.
///
/// Called after every local save. The local write has already happened, so callers
/// log a failure and carry on; local and remote copies are never reconciled.
#[async_trait]
pub trait Replicator: Send + Sync {
    async fn replicate(&self, path: &Path) -> Result<(), ReplicationError>;
}

/// Keeps files local only
#[derive(Debug, Default, Clone, Copy)]
pub struct NoReplication;

#[async_trait]
impl Replicator for NoReplication {
    async fn replicate(&self, _path: &Path) -> Result<(), ReplicationError> {
        Ok(())
    }
}

/// Commits a saved file to a git checkout and pushes it to the remote repository
#[derive(Debug)]
pub struct GitReplicator {
    work_dir: PathBuf,
    remote_url: Url,
    branch: String,
    token: Option<Secret<String>>,
    author_name: String,
    author_email: String,
}

impl GitReplicator {
    pub fn new(
        work_dir: PathBuf,
        remote_url: Url,
        branch: String,
        token: Option<Secret<String>>,
        author_name: String,
        author_email: String,
    ) -> Self {
        Self {
            work_dir,
            remote_url,
            branch,
            token,
            author_name,
            author_email,
        }
    }

    /// The remote URL with the access token filled in as credentials
    fn authenticated_remote(&self) -> Result<Url, ReplicationError> {
        let mut url = self.remote_url.clone();
        if let Some(token) = &self.token {
            url.set_username(TOKEN_USERNAME)
                .and_then(|_| url.set_password(Some(token.expose_secret().as_str())))
                .map_err(|_| ReplicationError::NotConfigured("remote URL with a host"))?;
        }
        Ok(url)
    }

    async fn git(&self, args: &[&str]) -> Result<Output, ReplicationError> {
        let output = Command::new("git")
            .current_dir(&self.work_dir)
            .args(args)
            .output()
            .await?;
        Ok(output)
    }

    async fn run(&self, command: &'static str, args: &[&str]) -> Result<(), ReplicationError> {
        let output = self.git(args).await?;
        if output.status.success() {
            return Ok(());
        }
        Err(ReplicationError::CommandFailed {
            command,
            status: output.status,
            stderr: self.redact(&String::from_utf8_lossy(&output.stderr)),
        })
    }

    /// Git echoes remote URLs in its errors; the token must not reach the logs
    fn redact(&self, text: &str) -> String {
        let text = text.trim();
        match &self.token {
            Some(token) if !token.expose_secret().is_empty() => {
                text.replace(token.expose_secret().as_str(), "***")
            }
            _ => text.to_string(),
        }
    }
}

#[async_trait]
impl Replicator for GitReplicator {
    #[tracing::instrument(name = "Replicate file to remote repository", skip(self))]
    async fn replicate(&self, path: &Path) -> Result<(), ReplicationError> {
        let path = tokio::fs::canonicalize(path).await?;
        let path_str = path.to_string_lossy().into_owned();
        let path_str = path_str.as_str();
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path_str.to_string());

        self.run("add", &["add", "--", path_str]).await?;

        // Exits successfully when nothing is staged for the file
        let diff = self
            .git(&["diff", "--cached", "--quiet", "--", path_str])
            .await?;
        if diff.status.success() {
            tracing::debug!("No changes to replicate");
            return Ok(());
        }

        let author_name = format!("user.name={}", self.author_name);
        let author_email = format!("user.email={}", self.author_email);
        let message = format!("Update {}", file_name);
        self.run(
            "commit",
            &[
                "-c",
                author_name.as_str(),
                "-c",
                author_email.as_str(),
                "commit",
                "-m",
                message.as_str(),
                "--",
                path_str,
            ],
        )
        .await?;

        let remote = self.authenticated_remote()?;
        let refspec = format!("HEAD:{}", self.branch);
        self.run("push", &["push", remote.as_str(), refspec.as_str()])
            .await?;

        tracing::info!("Replicated {} to {}", file_name, self.remote_url);
        Ok(())
    }
}
