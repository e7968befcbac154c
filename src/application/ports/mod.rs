mod audio_host;
mod audio_transcoder;
mod speech_client;

pub use audio_host::{AudioHost, AudioHostError, HostedAudio};
pub use audio_transcoder::{AudioTranscoder, TranscoderError};
pub use speech_client::{SpeechClientError, UpstreamResponse, UpstreamSpeechClient};
