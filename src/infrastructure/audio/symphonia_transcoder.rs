use std::io::Cursor;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{Decoder, DecoderOptions};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::application::ports::{AudioTranscoder, TranscoderError};
use crate::domain::{CANONICAL_SAMPLE_RATE, CanonicalAudio, ContainerHint};

use super::DEFAULT_TRANSCODE_TIMEOUT;

const RESAMPLE_CHUNK: usize = 1024;

/// Pure-Rust transcoder: symphonia decode, rubato resample, hound encode.
///
/// Decoding runs on the blocking pool so slow uploads never hold an async worker.
#[derive(Debug, Clone, Copy)]
pub struct SymphoniaTranscoder {
    timeout: Duration,
}

impl SymphoniaTranscoder {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for SymphoniaTranscoder {
    fn default() -> Self {
        Self::new(DEFAULT_TRANSCODE_TIMEOUT)
    }
}

#[async_trait]
impl AudioTranscoder for SymphoniaTranscoder {
    async fn transcode(
        &self,
        data: Bytes,
        hint: Option<ContainerHint>,
    ) -> Result<CanonicalAudio, TranscoderError> {
        if data.is_empty() {
            return Err(TranscoderError::EmptyInput);
        }

        tokio::time::timeout(
            self.timeout,
            tokio::task::spawn_blocking(move || transcode_blocking(data, hint)),
        )
        .await
        .map_err(|_| TranscoderError::TimedOut(self.timeout))?
        .map_err(|e| TranscoderError::DecodingFailed(format!("transcode task: {}", e)))?
    }
}

fn transcode_blocking(
    data: Bytes,
    hint: Option<ContainerHint>,
) -> Result<CanonicalAudio, TranscoderError> {
    let source = DecodedSource::open(data, hint)?.read_mono()?;

    let mono = if source.rate == CANONICAL_SAMPLE_RATE {
        source.samples
    } else {
        resample(&source.samples, source.rate, CANONICAL_SAMPLE_RATE)?
    };

    let pcm: Vec<i16> = mono.into_iter().map(quantize).collect();

    tracing::debug!(
        source_rate = source.rate,
        samples = pcm.len(),
        "Audio transcoded to 16kHz mono PCM"
    );

    CanonicalAudio::from_pcm(&pcm).map_err(|e| TranscoderError::EncodingFailed(e.to_string()))
}

struct MonoSignal {
    samples: Vec<f32>,
    rate: u32,
}

/// The selected track of a probed container together with its decoder.
struct DecodedSource {
    reader: Box<dyn FormatReader>,
    decoder: Box<dyn Decoder>,
    track_id: u32,
    rate: u32,
}

impl DecodedSource {
    fn open(data: Bytes, container: Option<ContainerHint>) -> Result<Self, TranscoderError> {
        let stream = MediaSourceStream::new(Box::new(Cursor::new(data)), Default::default());

        let mut hint = Hint::new();
        if let Some(container) = container {
            hint.with_extension(container.extension())
                .mime_type(container.as_mime());
        }

        let reader = symphonia::default::get_probe()
            .format(
                &hint,
                stream,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| TranscoderError::DecodingFailed(format!("probe: {}", e)))?
            .format;

        let track = reader
            .default_track()
            .ok_or_else(|| TranscoderError::DecodingFailed("no audio track found".to_string()))?;
        let rate = track
            .codec_params
            .sample_rate
            .ok_or_else(|| TranscoderError::DecodingFailed("unknown sample rate".to_string()))?;
        let track_id = track.id;

        let decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .map_err(|e| match e {
                SymphoniaError::Unsupported(what) => {
                    TranscoderError::UnsupportedFormat(format!("codec: {}", what))
                }
                other => TranscoderError::DecodingFailed(format!("codec: {}", other)),
            })?;

        Ok(Self {
            reader,
            decoder,
            track_id,
            rate,
        })
    }

    fn read_mono(mut self) -> Result<MonoSignal, TranscoderError> {
        let mut samples = Vec::new();

        loop {
            let packet = match self.reader.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                    break;
                }
                // A chained stream; only the first segment is relayed.
                Err(SymphoniaError::ResetRequired) => break,
                Err(e) => return Err(TranscoderError::DecodingFailed(format!("packet: {}", e))),
            };
            if packet.track_id() != self.track_id {
                continue;
            }

            let decoded = match self.decoder.decode(&packet) {
                Ok(decoded) => decoded,
                Err(SymphoniaError::DecodeError(e)) => {
                    tracing::warn!(error = %e, "Skipping corrupt audio frame");
                    continue;
                }
                Err(e) => return Err(TranscoderError::DecodingFailed(format!("decode: {}", e))),
            };
            if decoded.frames() == 0 {
                continue;
            }

            let channels = decoded.spec().channels.count().max(1);
            let mut buffer = SampleBuffer::<f32>::new(decoded.capacity() as u64, *decoded.spec());
            buffer.copy_interleaved_ref(decoded);
            downmix_into(buffer.samples(), channels, &mut samples);
        }

        if samples.is_empty() {
            return Err(TranscoderError::DecodingFailed(
                "no audio samples decoded".to_string(),
            ));
        }

        Ok(MonoSignal {
            samples,
            rate: self.rate,
        })
    }
}

/// Averages interleaved frames down to one channel.
fn downmix_into(interleaved: &[f32], channels: usize, out: &mut Vec<f32>) {
    if channels == 1 {
        out.extend_from_slice(interleaved);
        return;
    }
    let scale = 1.0 / channels as f32;
    out.extend(
        interleaved
            .chunks_exact(channels)
            .map(|frame| frame.iter().sum::<f32>() * scale),
    );
}

/// Sinc resampling with the filter delay removed, so output sample `n`
/// lines up with input time `n / to_rate`.
fn resample(samples: &[f32], from_rate: u32, to_rate: u32) -> Result<Vec<f32>, TranscoderError> {
    let ratio = to_rate as f64 / from_rate as f64;
    let params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };

    let mut resampler = SincFixedIn::<f32>::new(ratio, 1.0, params, RESAMPLE_CHUNK, 1)
        .map_err(|e| TranscoderError::DecodingFailed(format!("resampler init: {}", e)))?;
    let resample_err = |e: rubato::ResampleError| {
        TranscoderError::DecodingFailed(format!("resample: {}", e))
    };

    let delay = resampler.output_delay();
    let expected = (samples.len() as f64 * ratio).round() as usize;
    let mut output = Vec::with_capacity(delay + expected + RESAMPLE_CHUNK);

    let mut chunks = samples.chunks_exact(RESAMPLE_CHUNK);
    for chunk in chunks.by_ref() {
        let frames = resampler.process(&[chunk], None).map_err(resample_err)?;
        output.extend_from_slice(&frames[0]);
    }

    let remainder = chunks.remainder();
    if !remainder.is_empty() {
        let tail: [&[f32]; 1] = [remainder];
        let frames = resampler
            .process_partial(Some(&tail[..]), None)
            .map_err(resample_err)?;
        output.extend_from_slice(&frames[0]);
    }

    // Flush the filter tail until the delayed signal is fully out.
    while output.len() < delay + expected {
        let frames = resampler
            .process_partial(None::<&[&[f32]]>, None)
            .map_err(resample_err)?;
        if frames[0].is_empty() {
            break;
        }
        output.extend_from_slice(&frames[0]);
    }

    output.drain(..delay.min(output.len()));
    output.truncate(expected);

    Ok(output)
}

fn quantize(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16
}
