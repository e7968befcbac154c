use std::time::Duration;

use ultravox_relay::application::ports::{SpeechClientError, UpstreamSpeechClient};
use ultravox_relay::domain::{AudioPayload, UpstreamRequest};
use ultravox_relay::infrastructure::upstream::{PayloadFormat, UltravoxClient};

use crate::helpers::start_mock_upstream;

fn inline_request() -> UpstreamRequest {
    UpstreamRequest::new(
        Some("For like Michigan,".to_string()),
        AudioPayload::Inline("UklGRg==".to_string()),
    )
}

#[tokio::test]
async fn given_reachable_upstream_when_sending_then_uses_api_key_header_and_chat_body() {
    let (url, captured, shutdown_tx) =
        start_mock_upstream(200, r#"{"audio": "UklGRg=="}"#, Duration::ZERO).await;
    let client = UltravoxClient::new(&url, "secret-key", Duration::from_secs(5)).unwrap();

    let response = client.send(&inline_request()).await.unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(response.body.as_ref(), br#"{"audio": "UklGRg=="}"#);
    let captured = captured.lock().unwrap().clone().unwrap();
    assert_eq!(captured.authorization.as_deref(), Some("Api-Key secret-key"));
    assert_eq!(captured.body["model"], "ultravox");
    assert_eq!(
        captured.body["messages"][0]["content"][0]["text"],
        "For like Michigan,"
    );
    assert_eq!(
        captured.body["messages"][0]["content"][1]["audio_blob"],
        "UklGRg=="
    );
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_compact_format_when_sending_then_body_is_flat() {
    let (url, captured, shutdown_tx) = start_mock_upstream(200, "{}", Duration::ZERO).await;
    let client = UltravoxClient::new(&url, "k", Duration::from_secs(5))
        .unwrap()
        .with_payload_format(PayloadFormat::Compact);

    client.send(&inline_request()).await.unwrap();

    let captured = captured.lock().unwrap().clone().unwrap();
    assert_eq!(
        captured.body,
        serde_json::json!({"audio": "UklGRg==", "text": "For like Michigan,"})
    );
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_upstream_error_status_when_sending_then_returns_response_not_error() {
    let (url, _captured, shutdown_tx) =
        start_mock_upstream(503, "maintenance", Duration::ZERO).await;
    let client = UltravoxClient::new(&url, "k", Duration::from_secs(5)).unwrap();

    let response = client.send(&inline_request()).await.unwrap();

    assert_eq!(response.status, 503);
    assert!(!response.is_success());
    assert_eq!(response.body_text(), "maintenance");
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_slow_upstream_when_sending_then_returns_timeout() {
    let (url, _captured, shutdown_tx) =
        start_mock_upstream(200, "{}", Duration::from_secs(3)).await;
    let client = UltravoxClient::new(&url, "k", Duration::from_millis(200)).unwrap();

    let result = client.send(&inline_request()).await;

    assert!(matches!(result, Err(SpeechClientError::Timeout(_))));
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_nothing_listening_when_sending_then_returns_network_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let client =
        UltravoxClient::new(&format!("http://{}/api", addr), "k", Duration::from_secs(2)).unwrap();

    let result = client.send(&inline_request()).await;

    assert!(matches!(result, Err(SpeechClientError::Network(_))));
}

#[test]
fn given_blank_credentials_when_building_client_then_fails() {
    assert!(UltravoxClient::new("", "k", Duration::from_secs(1)).is_err());
    assert!(UltravoxClient::new("http://localhost", " ", Duration::from_secs(1)).is_err());
}
