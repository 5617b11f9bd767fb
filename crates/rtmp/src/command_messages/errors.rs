use std::fmt;

use rtmpd_amf0::{Amf0ReadError, Amf0WriteError};

use crate::chunk::ChunkEncodeError;
use crate::macros::from_error;

#[derive(Debug)]
pub enum CommandError {
    Amf0Read(Amf0ReadError),
    Amf0Write(Amf0WriteError),
    ChunkEncode(ChunkEncodeError),
    Io(std::io::Error),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Amf0Read(err) => write!(f, "amf0 read error: {err}"),
            Self::Amf0Write(err) => write!(f, "amf0 write error: {err}"),
            Self::ChunkEncode(err) => write!(f, "chunk encode error: {err}"),
            Self::Io(err) => write!(f, "io error: {err}"),
        }
    }
}

impl std::error::Error for CommandError {}

from_error!(CommandError, Self::Amf0Read, Amf0ReadError);
from_error!(CommandError, Self::Amf0Write, Amf0WriteError);
from_error!(CommandError, Self::ChunkEncode, ChunkEncodeError);
from_error!(CommandError, Self::Io, std::io::Error);
