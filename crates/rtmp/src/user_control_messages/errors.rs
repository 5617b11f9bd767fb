use std::fmt;

use crate::chunk::ChunkEncodeError;
use crate::macros::from_error;

#[derive(Debug)]
pub enum EventMessagesError {
    ChunkEncode(ChunkEncodeError),
    Io(std::io::Error),
}

impl fmt::Display for EventMessagesError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ChunkEncode(err) => write!(f, "chunk encode error: {err}"),
            Self::Io(err) => write!(f, "io error: {err}"),
        }
    }
}

impl std::error::Error for EventMessagesError {}

from_error!(EventMessagesError, Self::ChunkEncode, ChunkEncodeError);
from_error!(EventMessagesError, Self::Io, std::io::Error);
