use std::fmt;

use crate::chunk::ChunkEncodeError;
use crate::macros::from_error;

#[derive(Debug)]
pub enum ProtocolControlMessageError {
    ChunkEncode(ChunkEncodeError),
    Io(std::io::Error),
}

impl fmt::Display for ProtocolControlMessageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ChunkEncode(err) => write!(f, "chunk encode error: {err}"),
            Self::Io(err) => write!(f, "io error: {err}"),
        }
    }
}

impl std::error::Error for ProtocolControlMessageError {}

from_error!(ProtocolControlMessageError, Self::ChunkEncode, ChunkEncodeError);
from_error!(ProtocolControlMessageError, Self::Io, std::io::Error);
