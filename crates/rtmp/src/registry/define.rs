use std::fmt;

/// Identifies a stream by the `app` given to `connect` and the stream key
/// given to `publish`/`play`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StreamKey {
    pub app: String,
    pub name: String,
}

impl StreamKey {
    pub fn new(app: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            app: app.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for StreamKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.app, self.name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishError {
    AlreadyPublishing,
}

impl fmt::Display for PublishError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyPublishing => write!(f, "stream already has a publisher"),
        }
    }
}

impl std::error::Error for PublishError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayError {
    StreamNotFound,
}

impl fmt::Display for PlayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StreamNotFound => write!(f, "no publisher for this stream"),
        }
    }
}

impl std::error::Error for PlayError {}

/// Detects video sequence headers (H.264 AVCPacketType 0) by sniffing the
/// first two payload bytes, the same check nginx-rtmp/SRS-derived servers
/// use rather than parsing the full codec payload.
pub fn is_video_sequence_header(payload: &[u8]) -> bool {
    payload.len() >= 2 && payload[0] == 0x17 && payload[1] == 0x00
}

/// Detects audio sequence headers (AAC AudioSpecificConfig) the same way.
pub fn is_audio_sequence_header(payload: &[u8]) -> bool {
    payload.len() >= 2 && payload[0] == 0xAF && payload[1] == 0x00
}

/// Names a video codec from the low nibble of an FLV video tag's first
/// byte. Parsing stops at this one-byte identifier; Enhanced RTMP's wider
/// FourCC scheme would extend this mapping, not the fan-out path.
pub fn video_codec_name(payload: &[u8]) -> Option<&'static str> {
    match payload.first()? & 0x0F {
        2 => Some("h263"),
        3 => Some("screen"),
        4 => Some("vp6"),
        5 => Some("vp6-alpha"),
        6 => Some("screen2"),
        7 => Some("avc"),
        12 => Some("hevc"),
        _ => None,
    }
}

/// Names an audio codec from the high nibble (SoundFormat) of an FLV audio
/// tag's first byte.
pub fn audio_codec_name(payload: &[u8]) -> Option<&'static str> {
    match payload.first()? >> 4 {
        0 => Some("pcm"),
        1 => Some("adpcm"),
        2 => Some("mp3"),
        10 => Some("aac"),
        11 => Some("speex"),
        _ => None,
    }
}
