use uuid::Uuid;

use crate::domain::EmailAddress;
use crate::error::Result;
use crate::model::DestinationBook;
use crate::repo::JsonFile;

/// Repository for the destination configuration file
#[derive(Clone)]
pub struct DestinationsRepo {
    file: JsonFile,
}

impl DestinationsRepo {
    pub fn new(file: JsonFile) -> Self {
        Self { file }
    }

    pub async fn fetch(&self) -> DestinationBook {
        self.file.load().await
    }

    #[tracing::instrument("Set destination address", skip(self))]
    pub async fn set_address(&self, user_id: Uuid, address: &EmailAddress) -> Result<()> {
        let mut book = self.fetch().await;
        book.set_address(user_id, address);
        self.file.save(&book).await
    }

    #[tracing::instrument("Remove destination address", skip(self))]
    pub async fn remove(&self, user_id: Uuid) -> Result<()> {
        let mut book = self.fetch().await;
        if book.remove(user_id) {
            self.file.save(&book).await?;
        }
        Ok(())
    }
}
