use bytes::Bytes;

use super::container_hint::ContainerHint;

/// Raw bytes submitted by a caller. The declared content type is untrusted.
#[derive(Debug, Clone)]
pub struct UploadedAudio {
    pub data: Bytes,
    pub filename: Option<String>,
    pub content_type: Option<String>,
}

impl UploadedAudio {
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self {
            data: data.into(),
            filename: None,
            content_type: None,
        }
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Container the client claims to have sent, from the content type first
    /// and the filename extension second.
    pub fn declared_container(&self) -> Option<ContainerHint> {
        self.content_type
            .as_deref()
            .and_then(ContainerHint::from_mime)
            .or_else(|| {
                self.filename
                    .as_deref()
                    .and_then(ContainerHint::from_filename)
            })
    }
}
