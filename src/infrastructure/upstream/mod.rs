mod payload;
mod ultravox_client;

pub use payload::{DEFAULT_MODEL, PayloadFormat, build_payload};
pub use ultravox_client::{DEFAULT_TIMEOUT, UltravoxClient};
