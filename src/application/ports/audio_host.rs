use async_trait::async_trait;

use crate::domain::CanonicalAudio;

/// Location of canonical audio published for the upstream to fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostedAudio {
    pub key: String,
    pub url: String,
}

#[async_trait]
pub trait AudioHost: Send + Sync {
    async fn publish(&self, audio: &CanonicalAudio) -> Result<HostedAudio, AudioHostError>;

    async fn remove(&self, hosted: &HostedAudio) -> Result<(), AudioHostError>;
}

#[derive(Debug, thiserror::Error)]
pub enum AudioHostError {
    #[error("upload failed: {0}")]
    UploadFailed(String),
    #[error("delete failed: {0}")]
    DeleteFailed(String),
}
