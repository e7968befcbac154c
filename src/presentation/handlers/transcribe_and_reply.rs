use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::response::{IntoResponse, Response};

use crate::application::services::RelayError;
use crate::domain::{ReplyAudio, UploadedAudio};
use crate::presentation::state::AppState;

use super::api_error::ApiError;

const FILE_FIELD: &str = "file";

#[tracing::instrument(skip(state, multipart))]
pub async fn transcribe_and_reply_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    let upload = read_upload(&mut multipart).await?;

    tracing::debug!(
        bytes = upload.len(),
        filename = upload.filename.as_deref().unwrap_or("unknown"),
        content_type = upload.content_type.as_deref().unwrap_or("unknown"),
        "Audio upload received"
    );

    let reply = state.relay_service.handle(upload).await?;

    Ok((
        StatusCode::OK,
        [
            (CONTENT_TYPE, ReplyAudio::MEDIA_TYPE),
            (CONTENT_DISPOSITION, ReplyAudio::CONTENT_DISPOSITION),
        ],
        reply.data,
    )
        .into_response())
}

/// Takes the `file` field, or the first field that carries a filename.
async fn read_upload(multipart: &mut Multipart) -> Result<UploadedAudio, ApiError> {
    loop {
        let field = multipart
            .next_field()
            .await
            .map_err(|e| multipart_error("Failed to read multipart", e))?
            .ok_or_else(|| RelayError::InvalidInput("No file uploaded".to_string()))?;

        if field.name() != Some(FILE_FIELD) && field.file_name().is_none() {
            continue;
        }

        let filename = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);

        let data = field
            .bytes()
            .await
            .map_err(|e| multipart_error("Failed to read file", e))?;

        let mut upload = UploadedAudio::new(data);
        if let Some(filename) = filename {
            upload = upload.with_filename(filename);
        }
        if let Some(content_type) = content_type {
            upload = upload.with_content_type(content_type);
        }
        return Ok(upload);
    }
}

/// Body-limit rejections keep their 413; anything else is a malformed upload.
fn multipart_error(context: &str, err: MultipartError) -> ApiError {
    let details = format!("{}: {}", context, err.body_text());
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::new(StatusCode::PAYLOAD_TOO_LARGE, "Upload too large", details)
    } else {
        RelayError::InvalidInput(details).into()
    }
}
