#[derive(Debug, thiserror::Error)]
pub enum FlvMuxError {
    #[error("tag body of {0} bytes exceeds the 24-bit FLV size field")]
    BodyTooLarge(usize),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
