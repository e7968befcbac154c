use std::io::Cursor;

use base64::{Engine as _, engine::general_purpose};
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

pub const CANONICAL_SAMPLE_RATE: u32 = 16_000;
pub const CANONICAL_CHANNELS: u16 = 1;
pub const CANONICAL_BITS_PER_SAMPLE: u16 = 16;

pub fn canonical_spec() -> WavSpec {
    WavSpec {
        channels: CANONICAL_CHANNELS,
        sample_rate: CANONICAL_SAMPLE_RATE,
        bits_per_sample: CANONICAL_BITS_PER_SAMPLE,
        sample_format: SampleFormat::Int,
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CanonicalAudioError {
    #[error("wav: {0}")]
    Wav(#[from] hound::Error),
    #[error("expected mono 16 kHz 16-bit PCM, got {channels} ch {sample_rate} Hz {bits}-bit")]
    NotCanonical {
        channels: u16,
        sample_rate: u32,
        bits: u16,
    },
}

/// WAV payload that is always mono, 16 kHz, 16-bit PCM.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalAudio {
    bytes: Vec<u8>,
    frames: u32,
}

impl CanonicalAudio {
    pub fn from_pcm(samples: &[i16]) -> Result<Self, CanonicalAudioError> {
        let mut cursor = Cursor::new(Vec::with_capacity(44 + samples.len() * 2));
        {
            let mut writer = WavWriter::new(&mut cursor, canonical_spec())?;
            let mut i16_writer = writer.get_i16_writer(samples.len() as u32);
            for &sample in samples {
                i16_writer.write_sample(sample);
            }
            i16_writer.flush()?;
            writer.finalize()?;
        }

        Ok(Self {
            bytes: cursor.into_inner(),
            frames: samples.len() as u32,
        })
    }

    /// Accepts an existing WAV only when it already meets the canonical format.
    pub fn from_wav(bytes: Vec<u8>) -> Result<Self, CanonicalAudioError> {
        let (spec, frames) = {
            let reader = WavReader::new(Cursor::new(bytes.as_slice()))?;
            (reader.spec(), reader.duration())
        };
        if spec.channels != CANONICAL_CHANNELS
            || spec.sample_rate != CANONICAL_SAMPLE_RATE
            || spec.bits_per_sample != CANONICAL_BITS_PER_SAMPLE
            || spec.sample_format != SampleFormat::Int
        {
            return Err(CanonicalAudioError::NotCanonical {
                channels: spec.channels,
                sample_rate: spec.sample_rate,
                bits: spec.bits_per_sample,
            });
        }

        Ok(Self { bytes, frames })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn frames(&self) -> u32 {
        self.frames
    }

    pub fn duration_secs(&self) -> f32 {
        self.frames as f32 / CANONICAL_SAMPLE_RATE as f32
    }

    pub fn to_base64(&self) -> String {
        general_purpose::STANDARD.encode(&self.bytes)
    }
}
