use bytes::Bytes;

/// Decoded upstream audio handed back to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyAudio {
    pub data: Bytes,
}

impl ReplyAudio {
    pub const MEDIA_TYPE: &'static str = "audio/wav";
    pub const FILENAME: &'static str = "response.wav";
    pub const CONTENT_DISPOSITION: &'static str = "attachment; filename=response.wav";

    pub fn new(data: impl Into<Bytes>) -> Self {
        Self { data: data.into() }
    }
}
