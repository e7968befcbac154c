/// Configuration for tracing initialization.
#[derive(Debug, Clone)]
pub struct TracingConfig {
    pub environment: String,
    pub level: String,
    pub json_format: bool,
}

impl TracingConfig {
    pub fn new(environment: impl Into<String>, level: impl Into<String>, json_format: bool) -> Self {
        Self {
            environment: environment.into(),
            level: level.into(),
            json_format,
        }
    }

    /// Filter used when `RUST_LOG` is not set.
    pub fn default_directives(&self) -> String {
        format!(
            "{},ultravox_relay={},tower_http=debug",
            self.level, self.level
        )
    }
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            environment: std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "local".to_string()),
            level: "info".to_string(),
            json_format: std::env::var("LOG_FORMAT")
                .map(|v| v.eq_ignore_ascii_case("json"))
                .unwrap_or(false),
        }
    }
}
