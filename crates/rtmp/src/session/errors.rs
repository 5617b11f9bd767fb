use std::fmt;

use rtmpd_amf0::Amf0WriteError;

use crate::chunk::{ChunkDecodeError, ChunkEncodeError};
use crate::command_messages::CommandError;
use crate::handshake::HandshakeError;
use crate::macros::from_error;
use crate::messages::MessageError;
use crate::protocol_control_messages::ProtocolControlMessageError;
use crate::user_control_messages::EventMessagesError;

#[derive(Debug)]
pub enum SessionError {
    Handshake(HandshakeError),
    ChunkDecode(ChunkDecodeError),
    ChunkEncode(ChunkEncodeError),
    Message(MessageError),
    Command(CommandError),
    ProtocolControlMessage(ProtocolControlMessageError),
    EventMessage(EventMessagesError),
    Amf0Write(Amf0WriteError),
    Io(std::io::Error),
    /// A peer sent `connect` with no `app` in its command object.
    MissingApp,
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Handshake(err) => write!(f, "handshake error: {err}"),
            Self::ChunkDecode(err) => write!(f, "chunk decode error: {err}"),
            Self::ChunkEncode(err) => write!(f, "chunk encode error: {err}"),
            Self::Message(err) => write!(f, "message error: {err}"),
            Self::Command(err) => write!(f, "command error: {err}"),
            Self::ProtocolControlMessage(err) => write!(f, "protocol control message error: {err}"),
            Self::EventMessage(err) => write!(f, "event message error: {err}"),
            Self::Amf0Write(err) => write!(f, "amf0 write error: {err}"),
            Self::Io(err) => write!(f, "io error: {err}"),
            Self::MissingApp => write!(f, "connect command had no app name"),
        }
    }
}

impl std::error::Error for SessionError {}

from_error!(SessionError, Self::Handshake, HandshakeError);
from_error!(SessionError, Self::ChunkDecode, ChunkDecodeError);
from_error!(SessionError, Self::ChunkEncode, ChunkEncodeError);
from_error!(SessionError, Self::Message, MessageError);
from_error!(SessionError, Self::Command, CommandError);
from_error!(SessionError, Self::ProtocolControlMessage, ProtocolControlMessageError);
from_error!(SessionError, Self::EventMessage, EventMessagesError);
from_error!(SessionError, Self::Amf0Write, Amf0WriteError);
from_error!(SessionError, Self::Io, std::io::Error);
