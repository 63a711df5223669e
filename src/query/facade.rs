//! Query façade over the repository.
//!
//! Reads go straight to the repository and never touch the apply controller,
//! so an in-flight reload does not block them.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::store::{codec, ConfigEntry, ConfigRepository, StoreError};

#[derive(Clone)]
pub struct ConfigQuery {
    repository: Arc<ConfigRepository>,
}

impl ConfigQuery {
    pub fn new(repository: Arc<ConfigRepository>) -> Self {
        Self { repository }
    }

    pub async fn list_entries(&self) -> Result<Vec<ConfigEntry>, StoreError> {
        self.repository.list().await
    }

    /// Encoded content of every requested name, keyed by name.
    ///
    /// Fails as a whole if any name is missing.
    pub async fn get_content(&self, names: &[String]) -> Result<BTreeMap<String, String>, StoreError> {
        let mut contents = BTreeMap::new();
        for name in names {
            if contents.contains_key(name) {
                continue;
            }
            let blob = self.repository.read(name).await?;
            contents.insert(name.clone(), codec::encode(blob.as_bytes()));
        }
        Ok(contents)
    }
}
