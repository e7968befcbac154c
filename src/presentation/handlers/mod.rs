mod api_error;
mod health;
mod transcribe_and_reply;

pub use api_error::{ApiError, ErrorResponse};
pub use health::{HealthResponse, health_handler};
pub use transcribe_and_reply::transcribe_and_reply_handler;
