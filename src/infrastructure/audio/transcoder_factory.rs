use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;

use crate::application::ports::{AudioTranscoder, TranscoderError};

use super::fallback_transcoder::FallbackTranscoder;
use super::ffmpeg_transcoder::{FfmpegTranscoder, check_ffmpeg_binary};
use super::symphonia_transcoder::SymphoniaTranscoder;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranscoderProvider {
    /// symphonia, with ffmpeg for codecs symphonia lacks when ffmpeg is installed.
    #[default]
    Auto,
    Symphonia,
    Ffmpeg,
}

pub struct TranscoderFactory;

impl TranscoderFactory {
    pub fn create(
        provider: TranscoderProvider,
        ffmpeg_binary: &str,
        timeout: Duration,
    ) -> Result<Arc<dyn AudioTranscoder>, TranscoderError> {
        let symphonia = || Arc::new(SymphoniaTranscoder::new(timeout));
        let ffmpeg = || Arc::new(FfmpegTranscoder::new(ffmpeg_binary).with_timeout(timeout));

        match provider {
            TranscoderProvider::Symphonia => Ok(symphonia()),
            TranscoderProvider::Ffmpeg => {
                check_ffmpeg_binary(ffmpeg_binary)?;
                Ok(ffmpeg())
            }
            TranscoderProvider::Auto => match check_ffmpeg_binary(ffmpeg_binary) {
                Ok(()) => Ok(Arc::new(FallbackTranscoder::new(symphonia(), ffmpeg()))),
                Err(e) => {
                    tracing::warn!(error = %e, "ffmpeg unavailable, WEBM/Opus uploads will be rejected");
                    Ok(symphonia())
                }
            },
        }
    }
}
