use std::io::Write;

use byteorder::{BigEndian, LittleEndian, WriteBytesExt};

use super::define::{Chunk, ChunkMessageHeader, ChunkType, INIT_CHUNK_SIZE};
use super::errors::ChunkEncodeError;

/// Serializes whole messages into chunk stream bytes.
///
/// Always emits a `Type0` header for the first chunk of a message and
/// `Type3` continuation headers for the rest; it never attempts the
/// `Type1`/`Type2` header-compression the format allows, trading a handful
/// of header bytes for a much simpler encoder.
#[derive(Clone)]
pub struct ChunkEncoder {
    chunk_size: usize,
}

impl Default for ChunkEncoder {
    fn default() -> Self {
        Self { chunk_size: INIT_CHUNK_SIZE }
    }
}

impl ChunkEncoder {
    pub fn set_chunk_size(&mut self, chunk_size: usize) {
        self.chunk_size = chunk_size;
    }

    fn write_basic_header(writer: &mut impl Write, fmt: ChunkType, csid: u32) -> Result<(), ChunkEncodeError> {
        let fmt = fmt as u8;

        if csid >= 64 + 256 {
            writer.write_u8(fmt << 6 | 1)?;
            let csid = csid - 64;
            writer.write_u8((csid % 256) as u8)?;
            writer.write_u8((csid / 256) as u8)?;
        } else if csid >= 64 {
            writer.write_u8(fmt << 6)?;
            writer.write_u8((csid - 64) as u8)?;
        } else {
            writer.write_u8(fmt << 6 | csid as u8)?;
        }

        Ok(())
    }

    fn write_message_header(writer: &mut impl Write, message_header: &ChunkMessageHeader) -> Result<(), ChunkEncodeError> {
        let timestamp = if message_header.timestamp >= 0x00FF_FFFF {
            0x00FF_FFFF
        } else {
            message_header.timestamp
        };

        writer.write_u24::<BigEndian>(timestamp)?;
        writer.write_u24::<BigEndian>(message_header.msg_length)?;
        writer.write_u8(message_header.msg_type_id as u8)?;
        writer.write_u32::<LittleEndian>(message_header.msg_stream_id)?;

        if message_header.is_extended_timestamp() {
            Self::write_extended_timestamp(writer, message_header.timestamp)?;
        }

        Ok(())
    }

    fn write_extended_timestamp(writer: &mut impl Write, timestamp: u32) -> Result<(), ChunkEncodeError> {
        writer.write_u32::<BigEndian>(timestamp)?;
        Ok(())
    }

    pub fn write_chunk(&self, writer: &mut impl Write, mut chunk: Chunk) -> Result<(), ChunkEncodeError> {
        Self::write_basic_header(writer, ChunkType::Type0, chunk.basic_header.chunk_stream_id)?;
        Self::write_message_header(writer, &chunk.message_header)?;

        loop {
            let take = chunk.payload.len().min(self.chunk_size);
            let piece = chunk.payload.split_to(take);
            writer.write_all(&piece)?;

            if chunk.payload.is_empty() {
                break;
            }

            Self::write_basic_header(writer, ChunkType::Type3, chunk.basic_header.chunk_stream_id)?;
            if chunk.message_header.is_extended_timestamp() {
                Self::write_extended_timestamp(writer, chunk.message_header.timestamp)?;
            }
        }

        Ok(())
    }
}
