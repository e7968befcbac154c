use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

use crate::domain::UpstreamRequest;

/// Status and raw body of a response the upstream actually sent.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: u16,
    pub body: Bytes,
}

impl UpstreamResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// One attempt per call, no retries.
#[async_trait]
pub trait UpstreamSpeechClient: Send + Sync {
    async fn send(&self, request: &UpstreamRequest) -> Result<UpstreamResponse, SpeechClientError>;
}

#[derive(Debug, thiserror::Error)]
pub enum SpeechClientError {
    #[error("network error: {0}")]
    Network(String),
    #[error("upstream did not answer within {0:?}")]
    Timeout(Duration),
    #[error("request could not be built: {0}")]
    Request(String),
}
