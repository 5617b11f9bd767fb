use std::io::Write;

use byteorder::{BigEndian, WriteBytesExt};
use bytes::BufMut;
use bytes::BytesMut;

use super::define::EventType;
use super::errors::EventMessagesError;
use crate::chunk::{Chunk, ChunkEncoder};
use crate::messages::MessageTypeID;

/// User Control Messages always ride chunk stream id 2.
const USER_CONTROL_CHUNK_STREAM_ID: u32 = 2;

fn write_event(
    encoder: &ChunkEncoder,
    writer: &mut impl Write,
    event_type: EventType,
    body: impl FnOnce(&mut Vec<u8>),
) -> Result<(), EventMessagesError> {
    let mut payload = BytesMut::new();
    {
        let mut cursor = (&mut payload).writer();
        cursor.write_u16::<BigEndian>(event_type as u16)?;
    }

    let mut tail = Vec::new();
    body(&mut tail);
    payload.extend_from_slice(&tail);

    let chunk = Chunk::new(USER_CONTROL_CHUNK_STREAM_ID, 0, MessageTypeID::UserControlEvent, 0, payload.freeze());
    encoder.write_chunk(writer, chunk)?;
    Ok(())
}

pub struct EventMessageStreamBegin {
    pub stream_id: u32,
}

impl EventMessageStreamBegin {
    pub fn write(&self, encoder: &ChunkEncoder, writer: &mut impl Write) -> Result<(), EventMessagesError> {
        let stream_id = self.stream_id;
        write_event(encoder, writer, EventType::StreamBegin, |buf| {
            buf.extend_from_slice(&stream_id.to_be_bytes());
        })
    }
}

pub struct EventMessageStreamEof {
    pub stream_id: u32,
}

impl EventMessageStreamEof {
    pub fn write(&self, encoder: &ChunkEncoder, writer: &mut impl Write) -> Result<(), EventMessagesError> {
        let stream_id = self.stream_id;
        write_event(encoder, writer, EventType::StreamEOF, |buf| {
            buf.extend_from_slice(&stream_id.to_be_bytes());
        })
    }
}

pub struct EventMessageStreamIsRecorded {
    pub stream_id: u32,
}

impl EventMessageStreamIsRecorded {
    pub fn write(&self, encoder: &ChunkEncoder, writer: &mut impl Write) -> Result<(), EventMessagesError> {
        let stream_id = self.stream_id;
        write_event(encoder, writer, EventType::StreamIsRecorded, |buf| {
            buf.extend_from_slice(&stream_id.to_be_bytes());
        })
    }
}

pub struct EventMessageSetBufferLength {
    pub stream_id: u32,
    pub buffer_length_ms: u32,
}

impl EventMessageSetBufferLength {
    pub fn write(&self, encoder: &ChunkEncoder, writer: &mut impl Write) -> Result<(), EventMessagesError> {
        let stream_id = self.stream_id;
        let buffer_length_ms = self.buffer_length_ms;
        write_event(encoder, writer, EventType::SetBufferLength, |buf| {
            buf.extend_from_slice(&stream_id.to_be_bytes());
            buf.extend_from_slice(&buffer_length_ms.to_be_bytes());
        })
    }
}

pub struct EventMessagePingRequest {
    pub timestamp: u32,
}

impl EventMessagePingRequest {
    pub fn write(&self, encoder: &ChunkEncoder, writer: &mut impl Write) -> Result<(), EventMessagesError> {
        let timestamp = self.timestamp;
        write_event(encoder, writer, EventType::PingRequest, |buf| {
            buf.extend_from_slice(&timestamp.to_be_bytes());
        })
    }
}

pub struct EventMessagePingResponse {
    pub timestamp: u32,
}

impl EventMessagePingResponse {
    pub fn write(&self, encoder: &ChunkEncoder, writer: &mut impl Write) -> Result<(), EventMessagesError> {
        let timestamp = self.timestamp;
        write_event(encoder, writer, EventType::PingResponse, |buf| {
            buf.extend_from_slice(&timestamp.to_be_bytes());
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::ChunkDecoder;

    #[test]
    fn stream_begin_writes_event_type_and_stream_id() {
        let encoder = ChunkEncoder::default();
        let mut buf = BytesMut::new();
        {
            let mut writer = (&mut buf).writer();
            EventMessageStreamBegin { stream_id: 7 }.write(&encoder, &mut writer).unwrap();
        }

        let mut decoder = ChunkDecoder::default();
        let chunk = decoder.read_chunk(&mut buf).unwrap().unwrap();
        assert_eq!(&chunk.payload[0..2], &0u16.to_be_bytes());
        assert_eq!(&chunk.payload[2..6], &7u32.to_be_bytes());
    }
}
