use bytes::Bytes;
use num_derive::FromPrimitive;

use crate::messages::define::MessageTypeID;

/// The chunk stream id RTMP conventionally reserves for AMF0/AMF3 commands
/// and protocol control messages. Not part of the wire protocol itself, just
/// a convention followed by every client and server.
pub const COMMAND_CHUNK_STREAM_ID: u32 = 3;
pub const AUDIO_CHUNK_STREAM_ID: u32 = 4;
pub const VIDEO_CHUNK_STREAM_ID: u32 = 5;

pub const INIT_CHUNK_SIZE: usize = 128;
pub const CHUNK_SIZE: usize = 4096;
pub const MAX_CHUNK_SIZE: usize = CHUNK_SIZE * 16;

/// The basic header's `fmt` field, selecting how much of the message header
/// is present versus inherited from the previous chunk on this stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive)]
#[repr(u8)]
pub enum ChunkType {
    Type0 = 0,
    Type1 = 1,
    Type2 = 2,
    Type3 = 3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkBasicHeader {
    pub format: ChunkType,
    pub chunk_stream_id: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChunkMessageHeader {
    pub timestamp: u32,
    pub msg_length: u32,
    pub msg_type_id: MessageTypeID,
    pub msg_stream_id: u32,
    /// Whether this header was written with an extended timestamp field.
    /// Needed because a `Type3` continuation chunk must re-read the
    /// extended timestamp if (and only if) the header it inherits from had
    /// one, even though it inherits every other field.
    pub was_extended_timestamp: bool,
}

impl ChunkMessageHeader {
    pub fn is_extended_timestamp(&self) -> bool {
        self.timestamp >= 0x00FF_FFFF
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    pub basic_header: ChunkBasicHeader,
    pub message_header: ChunkMessageHeader,
    pub payload: Bytes,
}

impl Chunk {
    pub fn new(chunk_stream_id: u32, timestamp: u32, msg_type_id: MessageTypeID, msg_stream_id: u32, payload: Bytes) -> Self {
        Self {
            basic_header: ChunkBasicHeader {
                format: ChunkType::Type0,
                chunk_stream_id,
            },
            message_header: ChunkMessageHeader {
                timestamp,
                msg_length: payload.len() as u32,
                msg_type_id,
                msg_stream_id,
                was_extended_timestamp: false,
            },
            payload,
        }
    }
}
