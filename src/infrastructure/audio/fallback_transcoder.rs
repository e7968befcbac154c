use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

use crate::application::ports::{AudioTranscoder, TranscoderError};
use crate::domain::{CanonicalAudio, ContainerHint};

/// Tries `primary` first and hands containers it cannot decode to `fallback`.
pub struct FallbackTranscoder {
    primary: Arc<dyn AudioTranscoder>,
    fallback: Arc<dyn AudioTranscoder>,
}

impl FallbackTranscoder {
    pub fn new(primary: Arc<dyn AudioTranscoder>, fallback: Arc<dyn AudioTranscoder>) -> Self {
        Self { primary, fallback }
    }
}

#[async_trait]
impl AudioTranscoder for FallbackTranscoder {
    async fn transcode(
        &self,
        data: Bytes,
        hint: Option<ContainerHint>,
    ) -> Result<CanonicalAudio, TranscoderError> {
        match self.primary.transcode(data.clone(), hint).await {
            Err(TranscoderError::UnsupportedFormat(reason)) => {
                tracing::debug!(%reason, "Primary transcoder cannot decode upload, falling back");
                self.fallback.transcode(data, hint).await
            }
            other => other,
        }
    }
}
