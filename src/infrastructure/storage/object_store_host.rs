use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use object_store::local::LocalFileSystem;
use object_store::memory::InMemory;
use object_store::path::Path as StorePath;
use object_store::{ObjectStore, PutPayload};
use uuid::Uuid;

use crate::application::ports::{AudioHost, AudioHostError, HostedAudio};
use crate::domain::CanonicalAudio;

pub const AUDIO_PREFIX: &str = "relay-audio";

/// Publishes canonical audio under a public base URL that serves the store.
pub struct ObjectStoreAudioHost {
    inner: Arc<dyn ObjectStore>,
    public_base_url: String,
}

impl ObjectStoreAudioHost {
    pub fn new(inner: Arc<dyn ObjectStore>, public_base_url: &str) -> Self {
        Self {
            inner,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn local(base_path: PathBuf, public_base_url: &str) -> Result<Self, AudioHostError> {
        std::fs::create_dir_all(&base_path)
            .map_err(|e| AudioHostError::UploadFailed(format!("create {:?}: {}", base_path, e)))?;
        let fs = LocalFileSystem::new_with_prefix(base_path)
            .map_err(|e| AudioHostError::UploadFailed(e.to_string()))?;
        Ok(Self::new(Arc::new(fs), public_base_url))
    }

    pub fn in_memory(public_base_url: &str) -> Self {
        Self::new(Arc::new(InMemory::new()), public_base_url)
    }

    pub fn store(&self) -> Arc<dyn ObjectStore> {
        Arc::clone(&self.inner)
    }
}

#[async_trait]
impl AudioHost for ObjectStoreAudioHost {
    async fn publish(&self, audio: &CanonicalAudio) -> Result<HostedAudio, AudioHostError> {
        let key = format!("{}/{}.wav", AUDIO_PREFIX, Uuid::new_v4());
        let payload = PutPayload::from(audio.as_bytes().to_vec());

        self.inner
            .put(&StorePath::from(key.as_str()), payload)
            .await
            .map_err(|e| AudioHostError::UploadFailed(e.to_string()))?;

        let url = format!("{}/{}", self.public_base_url, key);
        Ok(HostedAudio { key, url })
    }

    async fn remove(&self, hosted: &HostedAudio) -> Result<(), AudioHostError> {
        self.inner
            .delete(&StorePath::from(hosted.key.as_str()))
            .await
            .map_err(|e| AudioHostError::DeleteFailed(e.to_string()))
    }
}
