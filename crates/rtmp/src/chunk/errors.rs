use std::fmt;
use std::io;

use crate::macros::from_error;

#[derive(Debug)]
pub enum ChunkDecodeError {
    Io(io::Error),
    InvalidChunkType(u8),
    InvalidMessageTypeId(u8),
    MissingPreviousChunkHeader(u32),
    TooManyPartialChunks,
    TooManyPreviousChunkHeaders,
    PartialChunkTooLarge(usize),
}

impl fmt::Display for ChunkDecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "io error: {err}"),
            Self::InvalidChunkType(t) => write!(f, "invalid chunk type: {t}"),
            Self::InvalidMessageTypeId(t) => write!(f, "invalid message type id: {t}"),
            Self::MissingPreviousChunkHeader(csid) => {
                write!(f, "chunk stream {csid} referenced a previous header that doesn't exist")
            }
            Self::TooManyPartialChunks => write!(f, "too many chunk streams with partially received messages"),
            Self::TooManyPreviousChunkHeaders => write!(f, "too many distinct chunk stream ids seen"),
            Self::PartialChunkTooLarge(size) => write!(f, "partial message grew past the allowed size: {size} bytes"),
        }
    }
}

impl std::error::Error for ChunkDecodeError {}

from_error!(ChunkDecodeError, Self::Io, io::Error);

#[derive(Debug)]
pub enum ChunkEncodeError {
    Io(io::Error),
}

impl fmt::Display for ChunkEncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "io error: {err}"),
        }
    }
}

impl std::error::Error for ChunkEncodeError {}

from_error!(ChunkEncodeError, Self::Io, io::Error);
