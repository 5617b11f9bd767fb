use std::fmt;

use rtmpd_amf0::Amf0ReadError;

use crate::macros::from_error;

#[derive(Debug)]
pub enum MessageError {
    Amf0Read(Amf0ReadError),
    Io(std::io::Error),
    MissingCommandName,
}

impl fmt::Display for MessageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Amf0Read(err) => write!(f, "amf0 read error: {err}"),
            Self::Io(err) => write!(f, "io error: {err}"),
            Self::MissingCommandName => write!(f, "command message is missing its command name"),
        }
    }
}

impl std::error::Error for MessageError {}

from_error!(MessageError, Self::Amf0Read, Amf0ReadError);
from_error!(MessageError, Self::Io, std::io::Error);
