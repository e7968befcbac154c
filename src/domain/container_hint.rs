/// Audio container declared by the client for an upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerHint {
    Wav,
    Webm,
    Ogg,
    Mp3,
    Mp4,
    Flac,
    Aac,
}

impl ContainerHint {
    pub fn from_mime(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or_default().trim();
        match essence.to_ascii_lowercase().as_str() {
            "audio/wav" | "audio/wave" | "audio/x-wav" | "audio/vnd.wave" => Some(Self::Wav),
            "audio/webm" | "video/webm" => Some(Self::Webm),
            "audio/ogg" | "audio/opus" | "application/ogg" => Some(Self::Ogg),
            "audio/mpeg" | "audio/mp3" => Some(Self::Mp3),
            "audio/mp4" | "audio/m4a" | "audio/x-m4a" | "video/mp4" => Some(Self::Mp4),
            "audio/flac" | "audio/x-flac" => Some(Self::Flac),
            "audio/aac" | "audio/x-aac" => Some(Self::Aac),
            _ => None,
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "wav" | "wave" => Some(Self::Wav),
            "webm" => Some(Self::Webm),
            "ogg" | "oga" | "opus" => Some(Self::Ogg),
            "mp3" => Some(Self::Mp3),
            "mp4" | "m4a" => Some(Self::Mp4),
            "flac" => Some(Self::Flac),
            "aac" => Some(Self::Aac),
            _ => None,
        }
    }

    pub fn from_filename(filename: &str) -> Option<Self> {
        let (_, ext) = filename.rsplit_once('.')?;
        Self::from_extension(ext)
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Wav => "wav",
            Self::Webm => "webm",
            Self::Ogg => "ogg",
            Self::Mp3 => "mp3",
            Self::Mp4 => "mp4",
            Self::Flac => "flac",
            Self::Aac => "aac",
        }
    }

    pub fn as_mime(&self) -> &'static str {
        match self {
            Self::Wav => "audio/wav",
            Self::Webm => "audio/webm",
            Self::Ogg => "audio/ogg",
            Self::Mp3 => "audio/mpeg",
            Self::Mp4 => "audio/mp4",
            Self::Flac => "audio/flac",
            Self::Aac => "audio/aac",
        }
    }
}
