use std::fmt;

use crate::macros::from_error;

#[derive(Debug)]
pub enum HandshakeError {
    Io(std::io::Error),
    WrongState,
}

impl fmt::Display for HandshakeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "io error: {err}"),
            Self::WrongState => write!(f, "handshake step called out of order"),
        }
    }
}

impl std::error::Error for HandshakeError {}

from_error!(HandshakeError, Self::Io, std::io::Error);
