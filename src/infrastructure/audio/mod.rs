use std::time::Duration;

mod fallback_transcoder;
mod ffmpeg_transcoder;
mod symphonia_transcoder;
mod transcoder_factory;

pub use fallback_transcoder::FallbackTranscoder;
pub use ffmpeg_transcoder::{DEFAULT_FFMPEG_BINARY, FfmpegTranscoder, check_ffmpeg_binary};
pub use symphonia_transcoder::SymphoniaTranscoder;
pub use transcoder_factory::{TranscoderFactory, TranscoderProvider};

pub const DEFAULT_TRANSCODE_TIMEOUT: Duration = Duration::from_secs(60);
