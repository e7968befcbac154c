/// How the canonical audio reaches the upstream API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioPayload {
    /// Standard base64 of the canonical WAV bytes.
    Inline(String),
    /// Public URL the upstream fetches itself.
    Hosted(String),
}

/// Outbound payload, built once per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamRequest {
    pub prompt: Option<String>,
    pub audio: AudioPayload,
}

impl UpstreamRequest {
    pub fn new(prompt: Option<String>, audio: AudioPayload) -> Self {
        Self { prompt, audio }
    }
}
