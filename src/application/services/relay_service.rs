use std::sync::Arc;

use base64::{Engine as _, engine::general_purpose};
use serde::Deserialize;

use crate::application::ports::{AudioHost, AudioTranscoder, HostedAudio, UpstreamSpeechClient};
use crate::domain::{AudioPayload, CanonicalAudio, ReplyAudio, UploadedAudio, UpstreamRequest};
use crate::infrastructure::observability::sanitize_prompt;

use super::relay_error::{ProtocolFault, RelayError};

/// Whether the transcoder is told which container the client declared.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerPolicy {
    #[default]
    AutoDetect,
    DeclaredType,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioDelivery {
    #[default]
    Inline,
    Hosted,
}

#[derive(Debug, Clone, Default)]
pub struct RelayOptions {
    pub prompt: Option<String>,
    pub container_policy: ContainerPolicy,
    pub delivery: AudioDelivery,
}

/// Request-scoped orchestration: upload in, upstream reply audio out.
pub struct RelayService {
    transcoder: Arc<dyn AudioTranscoder>,
    speech_client: Arc<dyn UpstreamSpeechClient>,
    audio_host: Option<Arc<dyn AudioHost>>,
    options: RelayOptions,
}

impl RelayService {
    pub fn new(
        transcoder: Arc<dyn AudioTranscoder>,
        speech_client: Arc<dyn UpstreamSpeechClient>,
        options: RelayOptions,
    ) -> Self {
        Self {
            transcoder,
            speech_client,
            audio_host: None,
            options,
        }
    }

    pub fn with_audio_host(mut self, audio_host: Arc<dyn AudioHost>) -> Self {
        self.audio_host = Some(audio_host);
        self
    }

    #[tracing::instrument(skip(self, upload), fields(bytes = upload.len()))]
    pub async fn handle(&self, upload: UploadedAudio) -> Result<ReplyAudio, RelayError> {
        if upload.is_empty() {
            return Err(RelayError::InvalidInput("uploaded file is empty".to_string()));
        }

        let hint = match self.options.container_policy {
            ContainerPolicy::AutoDetect => None,
            ContainerPolicy::DeclaredType => {
                Some(upload.declared_container().ok_or_else(|| {
                    RelayError::InvalidInput(format!(
                        "unsupported declared audio type: {}",
                        upload.content_type.as_deref().unwrap_or("none")
                    ))
                })?)
            }
        };

        let canonical = self
            .transcoder
            .transcode(upload.data, hint)
            .await
            .map_err(|e| RelayError::InvalidInput(e.to_string()))?;

        tracing::debug!(
            duration_secs = canonical.duration_secs(),
            wav_bytes = canonical.as_bytes().len(),
            "Upload transcoded to canonical audio"
        );

        let (audio, hosted) = self.deliver(canonical).await?;

        let request = UpstreamRequest::new(self.options.prompt.clone(), audio);
        if let Some(prompt) = &request.prompt {
            tracing::debug!(prompt = %sanitize_prompt(prompt), "Sending audio upstream");
        }

        let sent = self.speech_client.send(&request).await;

        if let Some(hosted) = hosted {
            self.release(&hosted).await;
        }

        let response = sent.map_err(|e| {
            tracing::error!(error = %e, "Upstream call failed");
            RelayError::from(e)
        })?;

        if !response.is_success() {
            tracing::warn!(status = response.status, "Upstream returned error status");
            return Err(RelayError::Upstream {
                status: response.status,
                body: response.body_text(),
            });
        }

        let reply = parse_reply(&response.body)?;

        tracing::info!(reply_bytes = reply.data.len(), "Upstream reply relayed");

        Ok(reply)
    }

    async fn deliver(
        &self,
        canonical: CanonicalAudio,
    ) -> Result<(AudioPayload, Option<HostedAudio>), RelayError> {
        match self.options.delivery {
            AudioDelivery::Inline => Ok((AudioPayload::Inline(canonical.to_base64()), None)),
            AudioDelivery::Hosted => {
                let host = self.audio_host.as_ref().ok_or_else(|| {
                    RelayError::Configuration(
                        "hosted audio delivery requires an audio host".to_string(),
                    )
                })?;
                let hosted = host.publish(&canonical).await?;
                tracing::debug!(url = %hosted.url, "Canonical audio published");
                Ok((AudioPayload::Hosted(hosted.url.clone()), Some(hosted)))
            }
        }
    }

    async fn release(&self, hosted: &HostedAudio) {
        if let Some(host) = &self.audio_host {
            if let Err(e) = host.remove(hosted).await {
                tracing::warn!(error = %e, key = %hosted.key, "Failed to remove hosted audio");
            }
        }
    }
}

/// Extracts the base64 `audio` field of an upstream JSON reply.
pub fn parse_reply(body: &[u8]) -> Result<ReplyAudio, ProtocolFault> {
    let value: serde_json::Value = serde_json::from_slice(body)
        .map_err(|e| ProtocolFault::MalformedBody(e.to_string()))?;

    let object = value
        .as_object()
        .ok_or_else(|| ProtocolFault::MalformedBody("expected a JSON object".to_string()))?;

    let encoded = match object.get("audio") {
        None | Some(serde_json::Value::Null) => return Err(ProtocolFault::MissingAudio),
        Some(serde_json::Value::String(s)) if s.is_empty() => {
            return Err(ProtocolFault::MissingAudio);
        }
        Some(serde_json::Value::String(s)) => s,
        Some(_) => {
            return Err(ProtocolFault::MalformedBody(
                "audio field is not a string".to_string(),
            ));
        }
    };

    let data = general_purpose::STANDARD
        .decode(encoded.trim())
        .map_err(|e| ProtocolFault::UndecodableAudio(e.to_string()))?;

    Ok(ReplyAudio::new(data))
}
