use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::application::ports::{AudioTranscoder, TranscoderError};
use crate::domain::{CANONICAL_SAMPLE_RATE, CanonicalAudio, ContainerHint};

use super::DEFAULT_TRANSCODE_TIMEOUT;

pub const DEFAULT_FFMPEG_BINARY: &str = "ffmpeg";

/// Pipes uploads through an external `ffmpeg`. Handles containers symphonia
/// cannot decode, WEBM/Opus in particular.
#[derive(Debug, Clone)]
pub struct FfmpegTranscoder {
    binary: PathBuf,
    timeout: Duration,
}

impl FfmpegTranscoder {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            timeout: DEFAULT_TRANSCODE_TIMEOUT,
        }
    }

    /// The child is killed when it outlives `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn run(&self, data: Bytes, hint: Option<ContainerHint>) -> Result<Vec<u8>, TranscoderError> {
        let mut command = Command::new(&self.binary);
        command.args(["-hide_banner", "-loglevel", "error"]);
        if let Some(hint) = hint {
            command.args(["-f", demuxer_name(hint)]);
        }
        command
            .args(["-i", "pipe:0", "-vn", "-ac", "1", "-ar"])
            .arg(CANONICAL_SAMPLE_RATE.to_string())
            .args(["-acodec", "pcm_s16le", "-f", "s16le", "pipe:1"])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = command
            .spawn()
            .map_err(|e| TranscoderError::DecodingFailed(format!("spawn ffmpeg: {}", e)))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| TranscoderError::DecodingFailed("ffmpeg stdin unavailable".into()))?;
        // ffmpeg may stop reading early on bad input; the exit status reports that.
        let writer = tokio::spawn(async move {
            let _ = stdin.write_all(&data).await;
        });

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| TranscoderError::DecodingFailed(format!("ffmpeg: {}", e)))?;
        let _ = writer.await;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(TranscoderError::DecodingFailed(format!(
                "ffmpeg exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        Ok(output.stdout)
    }
}

impl Default for FfmpegTranscoder {
    fn default() -> Self {
        Self::new(DEFAULT_FFMPEG_BINARY)
    }
}

/// Startup probe; runs once before the server accepts requests.
pub fn check_ffmpeg_binary(binary: &str) -> Result<(), TranscoderError> {
    let output = std::process::Command::new(binary)
        .arg("-version")
        .output()
        .map_err(|e| TranscoderError::UnsupportedFormat(format!("{} not runnable: {}", binary, e)))?;

    if !output.status.success() {
        return Err(TranscoderError::UnsupportedFormat(format!(
            "{} -version exited with {}",
            binary, output.status
        )));
    }

    Ok(())
}

fn demuxer_name(hint: ContainerHint) -> &'static str {
    match hint {
        ContainerHint::Wav => "wav",
        ContainerHint::Webm => "matroska",
        ContainerHint::Ogg => "ogg",
        ContainerHint::Mp3 => "mp3",
        ContainerHint::Mp4 => "mov",
        ContainerHint::Flac => "flac",
        ContainerHint::Aac => "aac",
    }
}

#[async_trait]
impl AudioTranscoder for FfmpegTranscoder {
    async fn transcode(
        &self,
        data: Bytes,
        hint: Option<ContainerHint>,
    ) -> Result<CanonicalAudio, TranscoderError> {
        if data.is_empty() {
            return Err(TranscoderError::EmptyInput);
        }

        let raw = tokio::time::timeout(self.timeout, self.run(data, hint))
            .await
            .map_err(|_| TranscoderError::TimedOut(self.timeout))??;

        let pcm: Vec<i16> = raw
            .chunks_exact(2)
            .map(|b| i16::from_le_bytes([b[0], b[1]]))
            .collect();

        if pcm.is_empty() {
            return Err(TranscoderError::DecodingFailed(
                "no audio samples decoded".to_string(),
            ));
        }

        tracing::debug!(samples = pcm.len(), "Audio transcoded via ffmpeg");

        CanonicalAudio::from_pcm(&pcm).map_err(|e| TranscoderError::EncodingFailed(e.to_string()))
    }
}
