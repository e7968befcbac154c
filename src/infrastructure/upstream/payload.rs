use serde::{Deserialize, Serialize};

use crate::domain::{AudioPayload, UpstreamRequest};

pub const DEFAULT_MODEL: &str = "ultravox";

/// Request body shape the deployed upstream accepts. Only one is live per process.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayloadFormat {
    /// `{"model", "messages": [{"role": "user", "content": [...]}]}`
    #[default]
    Chat,
    /// `{"audio" | "audio_url", "text"}`
    Compact,
}

#[derive(Debug, Serialize)]
struct ChatPayload<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: Vec<ContentPart<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart<'a> {
    Text { text: &'a str },
    AudioBlob { audio_blob: &'a str },
    AudioUrl { audio_url: &'a str },
}

#[derive(Debug, Serialize)]
struct CompactPayload<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    audio: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    audio_url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
}

pub fn build_payload(
    format: PayloadFormat,
    model: &str,
    request: &UpstreamRequest,
) -> Result<serde_json::Value, serde_json::Error> {
    let prompt = request.prompt.as_deref().filter(|p| !p.trim().is_empty());

    match format {
        PayloadFormat::Chat => {
            let mut content = Vec::with_capacity(2);
            if let Some(text) = prompt {
                content.push(ContentPart::Text { text });
            }
            content.push(match &request.audio {
                AudioPayload::Inline(b64) => ContentPart::AudioBlob { audio_blob: b64 },
                AudioPayload::Hosted(url) => ContentPart::AudioUrl { audio_url: url },
            });
            serde_json::to_value(ChatPayload {
                model,
                messages: [ChatMessage {
                    role: "user",
                    content,
                }],
            })
        }
        PayloadFormat::Compact => {
            let (audio, audio_url) = match &request.audio {
                AudioPayload::Inline(b64) => (Some(b64.as_str()), None),
                AudioPayload::Hosted(url) => (None, Some(url.as_str())),
            };
            serde_json::to_value(CompactPayload {
                audio,
                audio_url,
                text: prompt,
            })
        }
    }
}
