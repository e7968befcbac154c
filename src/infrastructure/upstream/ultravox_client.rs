use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::AUTHORIZATION;

use crate::application::ports::{SpeechClientError, UpstreamResponse, UpstreamSpeechClient};
use crate::domain::UpstreamRequest;

use super::payload::{DEFAULT_MODEL, PayloadFormat, build_payload};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub struct UltravoxClient {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
    format: PayloadFormat,
    timeout: Duration,
}

impl UltravoxClient {
    pub fn new(endpoint: &str, api_key: &str, timeout: Duration) -> Result<Self, SpeechClientError> {
        if endpoint.trim().is_empty() || api_key.trim().is_empty() {
            return Err(SpeechClientError::Request(
                "endpoint and api key are required".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SpeechClientError::Request(format!("client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            api_key: api_key.to_string(),
            model: DEFAULT_MODEL.to_string(),
            format: PayloadFormat::default(),
            timeout,
        })
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_payload_format(mut self, format: PayloadFormat) -> Self {
        self.format = format;
        self
    }

    fn classify(&self, err: reqwest::Error) -> SpeechClientError {
        if err.is_timeout() {
            SpeechClientError::Timeout(self.timeout)
        } else if err.is_builder() {
            SpeechClientError::Request(err.to_string())
        } else {
            SpeechClientError::Network(err.to_string())
        }
    }
}

#[async_trait]
impl UpstreamSpeechClient for UltravoxClient {
    async fn send(&self, request: &UpstreamRequest) -> Result<UpstreamResponse, SpeechClientError> {
        let body = build_payload(self.format, &self.model, request)
            .map_err(|e| SpeechClientError::Request(format!("payload: {}", e)))?;

        tracing::debug!(
            endpoint = %self.endpoint,
            format = ?self.format,
            timeout_secs = self.timeout.as_secs(),
            "Sending audio to UltraVox"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .header(AUTHORIZATION, format!("Api-Key {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(|e| self.classify(e))?;

        tracing::info!(status, bytes = body.len(), "UltraVox responded");

        Ok(UpstreamResponse { status, body })
    }
}
