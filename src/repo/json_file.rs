use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::replication::Replicator;

/// A JSON document that is always read and written as a whole.
///
/// Each successful write is handed to the replicator; a replication failure is
/// logged and never undoes or fails the local write.
#[derive(Clone)]
pub struct JsonFile {
    path: PathBuf,
    replicator: Arc<dyn Replicator>,
}

impl JsonFile {
    pub fn new(path: impl Into<PathBuf>, replicator: Arc<dyn Replicator>) -> Self {
        Self {
            path: path.into(),
            replicator,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the whole document. A missing, empty or malformed file yields the default value.
    /// Record types that must survive a bad element decode it leniently themselves.
    #[tracing::instrument(name = "Load JSON file", skip(self), fields(path = %self.path.display()))]
    pub async fn load<T>(&self) -> T
    where
        T: DeserializeOwned + Default,
    {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return T::default(),
            Err(e) => {
                tracing::warn!(error.cause_chain = ?e, "Failed to read file, using an empty document");
                return T::default();
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(error.cause_chain = ?e, "File is empty or corrupted, using an empty document");
                T::default()
            }
        }
    }

    /// Overwrite the whole document, pretty-printed, then replicate it
    #[tracing::instrument(name = "Save JSON file", skip(self, value), fields(path = %self.path.display()))]
    pub async fn save<T>(&self, value: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        let json = serde_json::to_string_pretty(value)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| self.storage_error(e))?;
        }
        // Readers must never observe a half-written file
        let temp_path = self.path.with_extension("json.tmp");
        tokio::fs::write(&temp_path, json)
            .await
            .map_err(|e| self.storage_error(e))?;
        tokio::fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| self.storage_error(e))?;

        if let Err(e) = self.replicator.replicate(&self.path).await {
            tracing::warn!(error.cause_chain = ?e, "Saved locally but failed to replicate");
        }
        Ok(())
    }

    fn storage_error(&self, source: std::io::Error) -> Error {
        Error::Storage {
            path: self.path.display().to_string(),
            source,
        }
    }
}
