use base64::{Engine as _, engine::general_purpose};

use ultravox_relay::domain::{CanonicalAudio, CanonicalAudioError};

use crate::helpers::{build_wav, canonical_wav, tone};

#[test]
fn given_pcm_samples_when_building_canonical_audio_then_header_is_mono_16khz_16bit() {
    let audio = CanonicalAudio::from_pcm(&tone(1_600, 1)).unwrap();

    let reader = hound::WavReader::new(std::io::Cursor::new(audio.as_bytes())).unwrap();
    let spec = reader.spec();
    assert_eq!(spec.channels, 1);
    assert_eq!(spec.sample_rate, 16_000);
    assert_eq!(spec.bits_per_sample, 16);
    assert_eq!(audio.frames(), 1_600);
    assert!((audio.duration_secs() - 0.1).abs() < f32::EPSILON);
}

#[test]
fn given_canonical_wav_when_base64_round_tripping_then_bytes_are_identical() {
    let audio = CanonicalAudio::from_wav(canonical_wav(3_200)).unwrap();

    let decoded = general_purpose::STANDARD
        .decode(audio.to_base64())
        .unwrap();

    assert_eq!(decoded, audio.as_bytes());
}

#[test]
fn given_stereo_wav_when_accepting_as_canonical_then_rejects() {
    let wav = build_wav(16_000, 2, &tone(160, 2));

    let result = CanonicalAudio::from_wav(wav);

    assert!(matches!(
        result,
        Err(CanonicalAudioError::NotCanonical { channels: 2, .. })
    ));
}

#[test]
fn given_44khz_wav_when_accepting_as_canonical_then_rejects() {
    let wav = build_wav(44_100, 1, &tone(441, 1));

    let result = CanonicalAudio::from_wav(wav);

    assert!(matches!(
        result,
        Err(CanonicalAudioError::NotCanonical {
            sample_rate: 44_100,
            ..
        })
    ));
}

#[test]
fn given_garbage_when_accepting_as_canonical_then_returns_wav_error() {
    let result = CanonicalAudio::from_wav(b"definitely not riff".to_vec());

    assert!(matches!(result, Err(CanonicalAudioError::Wav(_))));
}
