mod canonical_audio;
mod container_hint;
mod reply_audio;
mod uploaded_audio;
mod upstream_request;

pub use canonical_audio::{
    CANONICAL_BITS_PER_SAMPLE, CANONICAL_CHANNELS, CANONICAL_SAMPLE_RATE, CanonicalAudio,
    CanonicalAudioError, canonical_spec,
};
pub use container_hint::ContainerHint;
pub use reply_audio::ReplyAudio;
pub use uploaded_audio::UploadedAudio;
pub use upstream_request::{AudioPayload, UpstreamRequest};
