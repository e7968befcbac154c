use std::path::PathBuf;
use std::sync::Arc;

use serde::Deserialize;

use crate::application::ports::{AudioHost, AudioHostError};

use super::object_store_host::ObjectStoreAudioHost;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageProvider {
    #[default]
    Local,
    Memory,
}

pub struct AudioHostFactory;

impl AudioHostFactory {
    pub fn create(
        provider: StorageProvider,
        local_path: &str,
        public_base_url: Option<&str>,
    ) -> Result<Arc<dyn AudioHost>, AudioHostError> {
        let base_url = public_base_url
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| AudioHostError::UploadFailed("public_base_url required".into()))?;

        match provider {
            StorageProvider::Local => {
                let host = ObjectStoreAudioHost::local(PathBuf::from(local_path), base_url)?;
                Ok(Arc::new(host))
            }
            StorageProvider::Memory => Ok(Arc::new(ObjectStoreAudioHost::in_memory(base_url))),
        }
    }
}
