use std::collections::HashMap;
use std::time::Duration;

use config::{Config, File};
use serde::Deserialize;

use crate::application::services::{AudioDelivery, ContainerPolicy, RelayOptions};
use crate::infrastructure::audio::{
    DEFAULT_FFMPEG_BINARY, DEFAULT_TRANSCODE_TIMEOUT, TranscoderProvider,
};
use crate::infrastructure::observability::TracingConfig;
use crate::infrastructure::storage::StorageProvider;
use crate::infrastructure::upstream::{DEFAULT_MODEL, DEFAULT_TIMEOUT, PayloadFormat};

use super::environment::Environment;

pub const DEFAULT_SERVICE_NAME: &str = "UltraVox Audio Service";

/// Unprefixed variable names the relay has always been deployed with.
const LEGACY_OVERRIDES: [(&str, &str); 4] = [
    ("ULTRAVOX_URL", "upstream.url"),
    ("ULTRAVOX_API_KEY", "upstream.api_key"),
    ("ULTRAVOX_PROMPT", "upstream.prompt"),
    ("PORT", "server.port"),
];

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("{0}")]
    Environment(String),
    #[error("configuration: {0}")]
    Source(#[from] config::ConfigError),
    #[error("upstream.url (ULTRAVOX_URL) is not configured")]
    MissingUpstreamUrl,
    #[error("upstream.api_key (ULTRAVOX_API_KEY) is not configured")]
    MissingApiKey,
    #[error("upstream.url must be an http(s) URL, got {0}")]
    InvalidUpstreamUrl(String),
    #[error("upstream.timeout_secs must be greater than zero")]
    ZeroTimeout,
    #[error("audio.transcode_timeout_secs must be greater than zero")]
    ZeroTranscodeTimeout,
    #[error("hosted audio delivery requires storage.public_base_url")]
    MissingPublicBaseUrl,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(skip)]
    pub environment: Environment,
    pub server: ServerSettings,
    pub upstream: UpstreamSettings,
    pub audio: AudioSettings,
    pub storage: StorageSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub service_name: String,
    pub max_upload_mb: usize,
    pub allowed_origins: Vec<String>,
}

impl ServerSettings {
    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb * 1024 * 1024
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            service_name: DEFAULT_SERVICE_NAME.to_string(),
            max_upload_mb: 25,
            allowed_origins: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamSettings {
    pub url: String,
    pub api_key: String,
    pub prompt: Option<String>,
    pub model: String,
    pub timeout_secs: u64,
    pub payload_format: PayloadFormat,
    pub audio_delivery: AudioDelivery,
}

impl UpstreamSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn prompt(&self) -> Option<String> {
        self.prompt
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AudioSettings {
    pub transcoder: TranscoderProvider,
    pub container_policy: ContainerPolicy,
    pub ffmpeg_binary: String,
    pub transcode_timeout_secs: u64,
}

impl AudioSettings {
    pub fn transcode_timeout(&self) -> Duration {
        Duration::from_secs(self.transcode_timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    pub provider: StorageProvider,
    pub local_path: String,
    pub public_base_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    pub level: String,
    pub json: bool,
}

impl Settings {
    /// Reads `.env`, the process environment and the per-environment settings file.
    pub fn load() -> Result<Self, SettingsError> {
        dotenvy::dotenv().ok();
        Self::from_vars(std::env::vars().collect())
    }

    pub fn from_vars(vars: HashMap<String, String>) -> Result<Self, SettingsError> {
        let environment: Environment = vars
            .get("APP_ENVIRONMENT")
            .map(String::as_str)
            .unwrap_or_default()
            .parse()
            .map_err(SettingsError::Environment)?;

        let mut builder = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8000)?
            .set_default("server.service_name", DEFAULT_SERVICE_NAME)?
            .set_default("server.max_upload_mb", 25)?
            .set_default("server.allowed_origins", Vec::<String>::new())?
            .set_default("upstream.url", "")?
            .set_default("upstream.api_key", "")?
            .set_default("upstream.model", DEFAULT_MODEL)?
            .set_default("upstream.timeout_secs", DEFAULT_TIMEOUT.as_secs())?
            .set_default("upstream.payload_format", "chat")?
            .set_default("upstream.audio_delivery", "inline")?
            .set_default("audio.transcoder", "auto")?
            .set_default("audio.container_policy", "auto_detect")?
            .set_default("audio.ffmpeg_binary", DEFAULT_FFMPEG_BINARY)?
            .set_default(
                "audio.transcode_timeout_secs",
                DEFAULT_TRANSCODE_TIMEOUT.as_secs(),
            )?
            .set_default("storage.provider", "local")?
            .set_default("storage.local_path", "./hosted-audio")?
            .set_default("logging.level", "info")?
            .set_default("logging.json", false)?
            .add_source(File::with_name(&environment.settings_file()).required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("server.allowed_origins")
                    .source(Some(vars.clone())),
            );

        for (var, key) in LEGACY_OVERRIDES {
            builder = builder.set_override_option(key, vars.get(var).cloned())?;
        }
        builder = builder.set_override_option(
            "logging.json",
            vars.get("LOG_FORMAT")
                .map(|format| format.trim().eq_ignore_ascii_case("json")),
        )?;

        let mut settings: Settings = builder.build()?.try_deserialize()?;
        settings.environment = environment;
        settings.validate()?;

        Ok(settings)
    }

    /// Startup check: a relay without an upstream must not start serving.
    pub fn validate(&self) -> Result<(), SettingsError> {
        let url = self.upstream.url.trim();
        if url.is_empty() {
            return Err(SettingsError::MissingUpstreamUrl);
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(SettingsError::InvalidUpstreamUrl(url.to_string()));
        }
        if self.upstream.api_key.trim().is_empty() {
            return Err(SettingsError::MissingApiKey);
        }
        if self.upstream.timeout_secs == 0 {
            return Err(SettingsError::ZeroTimeout);
        }
        if self.audio.transcode_timeout_secs == 0 {
            return Err(SettingsError::ZeroTranscodeTimeout);
        }
        if self.upstream.audio_delivery == AudioDelivery::Hosted
            && self
                .storage
                .public_base_url
                .as_deref()
                .is_none_or(|u| u.trim().is_empty())
        {
            return Err(SettingsError::MissingPublicBaseUrl);
        }
        Ok(())
    }

    pub fn relay_options(&self) -> RelayOptions {
        RelayOptions {
            prompt: self.upstream.prompt(),
            container_policy: self.audio.container_policy,
            delivery: self.upstream.audio_delivery,
        }
    }

    pub fn tracing_config(&self) -> TracingConfig {
        TracingConfig::new(
            self.environment.as_str(),
            self.logging.level.clone(),
            self.logging.json,
        )
    }
}
