use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Request};
use axum::response::IntoResponse;
use axum::routing::post;
use bytes::Bytes;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use ultravox_relay::application::ports::{
    AudioTranscoder, SpeechClientError, TranscoderError, UpstreamResponse, UpstreamSpeechClient,
};
use ultravox_relay::domain::{CanonicalAudio, ContainerHint, UpstreamRequest};
use ultravox_relay::infrastructure::audio::SymphoniaTranscoder;

pub const MULTIPART_BOUNDARY: &str = "relay-test-boundary";

pub fn build_wav(sample_rate: u32, channels: u16, samples: &[i16]) -> Vec<u8> {
    let data_size = (samples.len() * 2) as u32;
    let block_align = channels * 2;
    let byte_rate = sample_rate * block_align as u32;

    let mut wav = Vec::with_capacity(44 + data_size as usize);
    wav.extend_from_slice(b"RIFF");
    wav.extend_from_slice(&(36 + data_size).to_le_bytes());
    wav.extend_from_slice(b"WAVE");
    wav.extend_from_slice(b"fmt ");
    wav.extend_from_slice(&16u32.to_le_bytes());
    wav.extend_from_slice(&1u16.to_le_bytes()); // PCM
    wav.extend_from_slice(&channels.to_le_bytes());
    wav.extend_from_slice(&sample_rate.to_le_bytes());
    wav.extend_from_slice(&byte_rate.to_le_bytes());
    wav.extend_from_slice(&block_align.to_le_bytes());
    wav.extend_from_slice(&16u16.to_le_bytes());
    wav.extend_from_slice(b"data");
    wav.extend_from_slice(&data_size.to_le_bytes());
    for &s in samples {
        wav.extend_from_slice(&s.to_le_bytes());
    }
    wav
}

/// Interleaved tone, `frames` per channel.
pub fn tone(frames: usize, channels: u16) -> Vec<i16> {
    (0..frames)
        .flat_map(|i| {
            let v = ((i as f32 * 0.05).sin() * 8_000.0) as i16;
            std::iter::repeat_n(v, channels as usize)
        })
        .collect()
}

pub fn canonical_wav(frames: usize) -> Vec<u8> {
    build_wav(16_000, 1, &tone(frames, 1))
}

pub fn multipart_body(field: &str, filename: &str, content_type: &str, data: &[u8]) -> Vec<u8> {
    let mut body = Vec::with_capacity(data.len() + 256);
    body.extend_from_slice(
        format!(
            "--{MULTIPART_BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{MULTIPART_BOUNDARY}--\r\n").as_bytes());
    body
}

pub fn upload_request(body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/transcribe_and_reply/")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={MULTIPART_BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

#[derive(Clone)]
pub enum StubOutcome {
    Reply { status: u16, body: Bytes },
    Timeout,
    Network,
}

/// Upstream stand-in that records every call.
pub struct StubSpeechClient {
    outcome: StubOutcome,
    calls: AtomicUsize,
    last_request: Mutex<Option<UpstreamRequest>>,
}

impl StubSpeechClient {
    pub fn replying(status: u16, body: impl Into<Bytes>) -> Arc<Self> {
        Arc::new(Self::with_outcome(StubOutcome::Reply {
            status,
            body: body.into(),
        }))
    }

    pub fn with_outcome(outcome: StubOutcome) -> Self {
        Self {
            outcome,
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<UpstreamRequest> {
        self.last_request.lock().unwrap().clone()
    }
}

#[async_trait]
impl UpstreamSpeechClient for StubSpeechClient {
    async fn send(&self, request: &UpstreamRequest) -> Result<UpstreamResponse, SpeechClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request.clone());
        match &self.outcome {
            StubOutcome::Reply { status, body } => Ok(UpstreamResponse {
                status: *status,
                body: body.clone(),
            }),
            StubOutcome::Timeout => Err(SpeechClientError::Timeout(Duration::from_secs(30))),
            StubOutcome::Network => Err(SpeechClientError::Network("connection refused".into())),
        }
    }
}

/// Real symphonia transcoder with a call counter and the hints it received.
#[derive(Default)]
pub struct CountingTranscoder {
    inner: SymphoniaTranscoder,
    calls: AtomicUsize,
    hints: Mutex<Vec<Option<ContainerHint>>>,
}

impl CountingTranscoder {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn hints(&self) -> Vec<Option<ContainerHint>> {
        self.hints.lock().unwrap().clone()
    }
}

#[async_trait]
impl AudioTranscoder for CountingTranscoder {
    async fn transcode(
        &self,
        data: Bytes,
        hint: Option<ContainerHint>,
    ) -> Result<CanonicalAudio, TranscoderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.hints.lock().unwrap().push(hint);
        self.inner.transcode(data, hint).await
    }
}

/// Transcoder that always reports the given error.
pub struct FailingTranscoder {
    make_error: fn() -> TranscoderError,
    calls: AtomicUsize,
}

impl FailingTranscoder {
    pub fn new(make_error: fn() -> TranscoderError) -> Self {
        Self {
            make_error,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AudioTranscoder for FailingTranscoder {
    async fn transcode(
        &self,
        _data: Bytes,
        _hint: Option<ContainerHint>,
    ) -> Result<CanonicalAudio, TranscoderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err((self.make_error)())
    }
}

/// Writes an executable shell script standing in for `ffmpeg`.
/// It answers `-version`, drains stdin, sleeps `delay_secs`, then emits
/// `frames` samples of silence as raw s16le.
#[cfg(unix)]
pub fn fake_ffmpeg(dir: &std::path::Path, delay_secs: u32, frames: usize) -> std::path::PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("ffmpeg");
    let script = format!(
        "#!/bin/sh\n\
         if [ \"$1\" = \"-version\" ]; then echo fake-ffmpeg; exit 0; fi\n\
         cat > /dev/null\n\
         sleep {delay_secs}\n\
         head -c {bytes} /dev/zero\n",
        bytes = frames * 2
    );
    std::fs::write(&path, script).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub authorization: Option<String>,
    pub body: serde_json::Value,
}

pub type Captured = Arc<Mutex<Option<CapturedRequest>>>;

pub async fn start_mock_upstream(
    response_status: u16,
    response_body: &'static str,
    delay: Duration,
) -> (String, Captured, oneshot::Sender<()>) {
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let captured: Captured = Arc::new(Mutex::new(None));
    let sink = Arc::clone(&captured);

    let app = Router::new().route(
        "/api/ultravox",
        post(move |headers: HeaderMap, body: Bytes| {
            let sink = Arc::clone(&sink);
            async move {
                *sink.lock().unwrap() = Some(CapturedRequest {
                    authorization: headers
                        .get("authorization")
                        .and_then(|v| v.to_str().ok())
                        .map(String::from),
                    body: serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null),
                });
                tokio::time::sleep(delay).await;
                let status = axum::http::StatusCode::from_u16(response_status).unwrap();
                (status, response_body).into_response()
            }
        }),
    );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let url = format!("http://{}/api/ultravox", addr);

    tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                shutdown_rx.await.ok();
            })
            .await
            .ok();
    });

    (url, captured, shutdown_tx)
}
