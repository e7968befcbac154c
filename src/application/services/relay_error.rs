use crate::application::ports::{AudioHostError, SpeechClientError};

/// Ways a 200 reply from upstream can still be unusable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolFault {
    #[error("malformed response body: {0}")]
    MalformedBody(String),
    #[error("no audio in response")]
    MissingAudio,
    #[error("failed to decode audio: {0}")]
    UndecodableAudio(String),
}

#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("upstream returned status {status}")]
    Upstream { status: u16, body: String },
    #[error("upstream protocol error: {0}")]
    UpstreamProtocol(#[from] ProtocolFault),
    #[error("network error: {0}")]
    Network(String),
    #[error("audio hosting failed: {0}")]
    AudioHosting(#[from] AudioHostError),
}

impl From<SpeechClientError> for RelayError {
    fn from(err: SpeechClientError) -> Self {
        match err {
            SpeechClientError::Network(_) | SpeechClientError::Timeout(_) => {
                Self::Network(err.to_string())
            }
            // A request that cannot even be built points at bad credentials or URL.
            SpeechClientError::Request(msg) => Self::Configuration(msg),
        }
    }
}
