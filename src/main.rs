use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;

use ultravox_relay::application::services::{AudioDelivery, RelayService};
use ultravox_relay::infrastructure::audio::TranscoderFactory;
use ultravox_relay::infrastructure::observability::init_tracing;
use ultravox_relay::infrastructure::storage::AudioHostFactory;
use ultravox_relay::infrastructure::upstream::UltravoxClient;
use ultravox_relay::presentation::{AppState, Settings, create_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Missing upstream URL or key stops the process here.
    let settings = Settings::load()?;

    init_tracing(&settings.tracing_config());

    let transcoder = TranscoderFactory::create(
        settings.audio.transcoder,
        &settings.audio.ffmpeg_binary,
        settings.audio.transcode_timeout(),
    )?;

    let upstream = &settings.upstream;
    let speech_client = UltravoxClient::new(&upstream.url, &upstream.api_key, upstream.timeout())?
        .with_model(upstream.model.clone())
        .with_payload_format(upstream.payload_format);

    let mut relay_service = RelayService::new(
        transcoder,
        Arc::new(speech_client),
        settings.relay_options(),
    );

    if upstream.audio_delivery == AudioDelivery::Hosted {
        let audio_host = AudioHostFactory::create(
            settings.storage.provider,
            &settings.storage.local_path,
            settings.storage.public_base_url.as_deref(),
        )?;
        relay_service = relay_service.with_audio_host(audio_host);
    }

    tracing::info!(
        transcoder = ?settings.audio.transcoder,
        container_policy = ?settings.audio.container_policy,
        payload_format = ?upstream.payload_format,
        audio_delivery = ?upstream.audio_delivery,
        timeout_secs = upstream.timeout_secs,
        "Relay configured"
    );

    let state = AppState::new(Arc::new(relay_service), &settings.server.service_name);
    let router = create_router(state, &settings.server);

    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
