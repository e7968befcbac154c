use bytes::Bytes;
use ultravox_relay::application::ports::{AudioTranscoder, TranscoderError};
use ultravox_relay::domain::ContainerHint;
use ultravox_relay::infrastructure::audio::SymphoniaTranscoder;

use crate::helpers::{build_wav, tone};

fn assert_canonical(bytes: &[u8], expected_secs: f32) {
    let reader = hound::WavReader::new(std::io::Cursor::new(bytes)).unwrap();
    let spec = reader.spec();
    assert_eq!(spec.channels, 1);
    assert_eq!(spec.sample_rate, 16_000);
    assert_eq!(spec.bits_per_sample, 16);
    assert_eq!(spec.sample_format, hound::SampleFormat::Int);
    let secs = reader.duration() as f32 / 16_000.0;
    assert!(
        (secs - expected_secs).abs() < 0.01,
        "duration {} vs {}",
        secs,
        expected_secs
    );
}

#[tokio::test]
async fn given_canonical_wav_when_transcoding_then_samples_are_preserved() {
    let samples = tone(1_600, 1);
    let wav = build_wav(16_000, 1, &samples);

    let audio = SymphoniaTranscoder::default()
        .transcode(wav.into(), None)
        .await
        .unwrap();

    let decoded: Vec<i16> = hound::WavReader::new(std::io::Cursor::new(audio.as_bytes()))
        .unwrap()
        .into_samples::<i16>()
        .map(Result::unwrap)
        .collect();
    assert_eq!(decoded.len(), samples.len());
    for (out, original) in decoded.iter().zip(&samples) {
        assert!((*out as i32 - *original as i32).abs() <= 1);
    }
}

#[tokio::test]
async fn given_stereo_44khz_wav_when_transcoding_then_output_is_mono_16khz() {
    let wav = build_wav(44_100, 2, &tone(22_050, 2));

    let audio = SymphoniaTranscoder::default()
        .transcode(wav.into(), None)
        .await
        .unwrap();

    assert_canonical(audio.as_bytes(), 0.5);
}

#[tokio::test]
async fn given_8khz_mono_wav_when_transcoding_then_upsamples_to_16khz() {
    let wav = build_wav(8_000, 1, &tone(4_000, 1));

    let audio = SymphoniaTranscoder::default()
        .transcode(wav.into(), Some(ContainerHint::Wav))
        .await
        .unwrap();

    assert_canonical(audio.as_bytes(), 0.5);
}

#[tokio::test]
async fn given_empty_bytes_when_transcoding_then_returns_empty_input() {
    let result = SymphoniaTranscoder::default()
        .transcode(Bytes::new(), None)
        .await;

    assert!(matches!(result, Err(TranscoderError::EmptyInput)));
}

#[tokio::test]
async fn given_corrupted_bytes_when_transcoding_then_returns_decoding_error() {
    let garbage = vec![0xFFu8; 128];

    let result = SymphoniaTranscoder::default()
        .transcode(garbage.into(), None)
        .await;

    assert!(matches!(result, Err(TranscoderError::DecodingFailed(_))));
}
