use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

use crate::domain::{CanonicalAudio, ContainerHint};

/// Converts an uploaded container into the canonical upstream format.
///
/// Implementations keep decoding off the async workers and bound it in time.
#[async_trait]
pub trait AudioTranscoder: Send + Sync {
    /// With `hint` set the declared container is trusted; without it the
    /// container is detected from the byte stream.
    async fn transcode(
        &self,
        data: Bytes,
        hint: Option<ContainerHint>,
    ) -> Result<CanonicalAudio, TranscoderError>;
}

#[derive(Debug, thiserror::Error)]
pub enum TranscoderError {
    #[error("empty audio input")]
    EmptyInput,
    #[error("unsupported audio format: {0}")]
    UnsupportedFormat(String),
    #[error("audio decoding failed: {0}")]
    DecodingFailed(String),
    #[error("audio encoding failed: {0}")]
    EncodingFailed(String),
    #[error("audio decoding timed out after {0:?}")]
    TimedOut(Duration),
}
