mod environment;
mod settings;

pub use environment::Environment;
pub use settings::{
    AudioSettings, DEFAULT_SERVICE_NAME, LoggingSettings, ServerSettings, Settings, SettingsError,
    StorageSettings, UpstreamSettings,
};
