use super::define::Amf0Marker;

#[derive(Debug, thiserror::Error)]
pub enum Amf0ReadError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("unknown marker: {0}")]
    UnknownMarker(u8),
    #[error("unexpected type: expected {expected:?}, got {got:?}")]
    WrongType { expected: Amf0Marker, got: Amf0Marker },
    #[error("string is not valid utf8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),
    #[error("unsupported value marker: {0:?}")]
    Unsupported(Amf0Marker),
}

#[derive(Debug, thiserror::Error)]
pub enum Amf0WriteError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("string longer than a u16 can address: {0}")]
    StringTooLong(usize),
}
