use std::collections::HashMap;
use std::io::{self, Cursor, Read};

use byteorder::{BigEndian, LittleEndian, ReadBytesExt};
use bytes::{Buf, Bytes, BytesMut};
use num_traits::FromPrimitive;

use super::define::{Chunk, ChunkBasicHeader, ChunkMessageHeader, ChunkType, INIT_CHUNK_SIZE, MAX_CHUNK_SIZE};
use super::errors::ChunkDecodeError;
use crate::messages::define::MessageTypeID;

/// Bounds below are defensive limits against malicious/broken peers; they are
/// not part of the RTMP wire format.
const MAX_PARTIAL_CHUNK_SIZE: usize = 10 * 1024 * 1024;
const MAX_PREVIOUS_CHUNK_HEADERS: usize = 100;
const MAX_PARTIAL_CHUNK_COUNT: usize = 4;

#[derive(Debug, Clone)]
struct PreviousHeader {
    header: ChunkMessageHeader,
    /// Timestamp delta last seen on this chunk stream id, reapplied when a
    /// `Type3` chunk starts a brand new message instead of continuing one.
    delta: u32,
}

/// Turns a stream of chunk bytes back into whole RTMP messages.
///
/// Owns no I/O; callers feed it bytes via [`ChunkDecoder::read_chunk`] and
/// keep appending to the buffer until it returns `Ok(None)`, meaning more
/// bytes are needed.
pub struct ChunkDecoder {
    previous_chunk_headers: HashMap<u32, PreviousHeader>,
    partial_chunks: HashMap<(u32, u32), BytesMut>,
    max_chunk_size: usize,
}

impl Default for ChunkDecoder {
    fn default() -> Self {
        Self {
            previous_chunk_headers: HashMap::new(),
            partial_chunks: HashMap::new(),
            max_chunk_size: INIT_CHUNK_SIZE,
        }
    }
}

impl ChunkDecoder {
    /// Applies a peer's `Set Chunk Size` request. Returns `false` if the
    /// requested size is out of the allowed range and should be rejected.
    pub fn update_max_chunk_size(&mut self, chunk_size: usize) -> bool {
        if (INIT_CHUNK_SIZE..=MAX_CHUNK_SIZE).contains(&chunk_size) {
            self.max_chunk_size = chunk_size;
            true
        } else {
            false
        }
    }

    /// Attempts to read one complete chunk stream message out of `buf`.
    ///
    /// Returns `Ok(None)` when `buf` doesn't yet hold a full chunk; the
    /// caller should read more bytes from the socket and call again. `buf`
    /// is only advanced past data that was actually consumed.
    pub fn read_chunk(&mut self, buf: &mut BytesMut) -> Result<Option<Chunk>, ChunkDecodeError> {
        let mut cursor = Cursor::new(&buf[..]);

        let Some((basic_header, consumed_basic)) = read_basic_header(&mut cursor)? else {
            return Ok(None);
        };

        let Some(message_header) = self.peek_message_header(&mut cursor, &basic_header)? else {
            return Ok(None);
        };

        let partial_key = (basic_header.chunk_stream_id, message_header.msg_stream_id);
        let already_read = self.partial_chunks.get(&partial_key).map(BytesMut::len).unwrap_or(0);
        let remaining = message_header.msg_length as usize - already_read;
        let payload_len = remaining.min(self.max_chunk_size);

        let header_len = cursor.position() as usize;
        if buf.len() < header_len + payload_len {
            return Ok(None);
        }

        let payload = Bytes::copy_from_slice(&buf[header_len..header_len + payload_len]);
        buf.advance(header_len + payload_len);
        let _ = consumed_basic;

        self.remember_header(basic_header.chunk_stream_id, &message_header);

        if already_read + payload_len == message_header.msg_length as usize {
            self.partial_chunks.remove(&partial_key);
            Ok(Some(Chunk {
                basic_header,
                message_header,
                payload,
            }))
        } else {
            let entry = self.partial_chunks.entry(partial_key).or_insert_with(|| {
                BytesMut::with_capacity(message_header.msg_length as usize)
            });
            if entry.len() + payload.len() > MAX_PARTIAL_CHUNK_SIZE {
                return Err(ChunkDecodeError::PartialChunkTooLarge(entry.len() + payload.len()));
            }
            entry.extend_from_slice(&payload);

            if self.partial_chunks.len() > MAX_PARTIAL_CHUNK_COUNT {
                return Err(ChunkDecodeError::TooManyPartialChunks);
            }

            Ok(None)
        }
    }

    fn remember_header(&mut self, csid: u32, header: &ChunkMessageHeader) {
        let delta = self
            .previous_chunk_headers
            .get(&csid)
            .map(|prev| header.timestamp.wrapping_sub(prev.header.timestamp))
            .unwrap_or(0);

        if !self.previous_chunk_headers.contains_key(&csid) && self.previous_chunk_headers.len() >= MAX_PREVIOUS_CHUNK_HEADERS {
            // Drop silently rather than erroring: an attacker fanning out chunk
            // stream ids shouldn't be able to wedge the connection via this path,
            // it just loses compression opportunities.
            return;
        }

        self.previous_chunk_headers.insert(
            csid,
            PreviousHeader {
                header: header.clone(),
                delta,
            },
        );
    }

    fn peek_message_header(
        &self,
        cursor: &mut Cursor<&[u8]>,
        basic_header: &ChunkBasicHeader,
    ) -> Result<Option<ChunkMessageHeader>, ChunkDecodeError> {
        let start = cursor.position();
        match self.try_read_message_header(cursor, basic_header) {
            Ok(header) => Ok(Some(header)),
            Err(ChunkDecodeError::Io(err)) if err.kind() == io::ErrorKind::UnexpectedEof => {
                cursor.set_position(start);
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    fn try_read_message_header(
        &self,
        cursor: &mut Cursor<&[u8]>,
        basic_header: &ChunkBasicHeader,
    ) -> Result<ChunkMessageHeader, ChunkDecodeError> {
        match basic_header.format {
            ChunkType::Type0 => {
                let timestamp_field = cursor.read_u24::<BigEndian>()?;
                let msg_length = cursor.read_u24::<BigEndian>()?;
                let msg_type_byte = cursor.read_u8()?;
                let msg_type_id =
                    MessageTypeID::from_u8(msg_type_byte).ok_or(ChunkDecodeError::InvalidMessageTypeId(msg_type_byte))?;
                let msg_stream_id = cursor.read_u32::<LittleEndian>()?;

                let (timestamp, was_extended_timestamp) = read_possibly_extended(cursor, timestamp_field)?;

                Ok(ChunkMessageHeader {
                    timestamp,
                    msg_length,
                    msg_type_id,
                    msg_stream_id,
                    was_extended_timestamp,
                })
            }
            ChunkType::Type1 => {
                let prev = self
                    .previous_chunk_headers
                    .get(&basic_header.chunk_stream_id)
                    .ok_or(ChunkDecodeError::MissingPreviousChunkHeader(basic_header.chunk_stream_id))?;

                let delta_field = cursor.read_u24::<BigEndian>()?;
                let msg_length = cursor.read_u24::<BigEndian>()?;
                let msg_type_byte = cursor.read_u8()?;
                let msg_type_id =
                    MessageTypeID::from_u8(msg_type_byte).ok_or(ChunkDecodeError::InvalidMessageTypeId(msg_type_byte))?;

                let (delta, was_extended_timestamp) = read_possibly_extended(cursor, delta_field)?;

                Ok(ChunkMessageHeader {
                    timestamp: prev.header.timestamp.wrapping_add(delta),
                    msg_length,
                    msg_type_id,
                    msg_stream_id: prev.header.msg_stream_id,
                    was_extended_timestamp,
                })
            }
            ChunkType::Type2 => {
                let prev = self
                    .previous_chunk_headers
                    .get(&basic_header.chunk_stream_id)
                    .ok_or(ChunkDecodeError::MissingPreviousChunkHeader(basic_header.chunk_stream_id))?;

                let delta_field = cursor.read_u24::<BigEndian>()?;
                let (delta, was_extended_timestamp) = read_possibly_extended(cursor, delta_field)?;

                Ok(ChunkMessageHeader {
                    timestamp: prev.header.timestamp.wrapping_add(delta),
                    msg_length: prev.header.msg_length,
                    msg_type_id: prev.header.msg_type_id,
                    msg_stream_id: prev.header.msg_stream_id,
                    was_extended_timestamp,
                })
            }
            ChunkType::Type3 => {
                let prev = self
                    .previous_chunk_headers
                    .get(&basic_header.chunk_stream_id)
                    .ok_or(ChunkDecodeError::MissingPreviousChunkHeader(basic_header.chunk_stream_id))?;

                // Truly stupid but required by the spec: a Type3 chunk re-reads
                // the extended timestamp field if and only if the header it
                // continues had one, discarding the (repeated) value.
                if prev.header.is_extended_timestamp() {
                    cursor.read_u32::<BigEndian>()?;
                }

                let continuing_partial = self
                    .partial_chunks
                    .contains_key(&(basic_header.chunk_stream_id, prev.header.msg_stream_id));

                if continuing_partial {
                    Ok(prev.header.clone())
                } else {
                    Ok(ChunkMessageHeader {
                        timestamp: prev.header.timestamp.wrapping_add(prev.delta),
                        ..prev.header.clone()
                    })
                }
            }
        }
    }
}

fn read_possibly_extended(cursor: &mut Cursor<&[u8]>, field: u32) -> Result<(u32, bool), ChunkDecodeError> {
    if field == 0x00FF_FFFF {
        Ok((cursor.read_u32::<BigEndian>()?, true))
    } else {
        Ok((field, false))
    }
}

/// Reads the basic header (1-3 bytes). Returns `None` if `cursor` doesn't
/// have enough bytes yet.
fn read_basic_header(cursor: &mut Cursor<&[u8]>) -> Result<Option<(ChunkBasicHeader, usize)>, ChunkDecodeError> {
    let start = cursor.position();
    let mut first = [0u8; 1];
    if cursor.read_exact(&mut first).is_err() {
        return Ok(None);
    }

    let fmt_bits = first[0] >> 6;
    let format = ChunkType::from_u8(fmt_bits).ok_or(ChunkDecodeError::InvalidChunkType(fmt_bits))?;
    let csid_low = first[0] & 0x3F;

    let chunk_stream_id = match csid_low {
        0 => {
            let mut byte = [0u8; 1];
            if cursor.read_exact(&mut byte).is_err() {
                cursor.set_position(start);
                return Ok(None);
            }
            64 + byte[0] as u32
        }
        1 => {
            let mut bytes = [0u8; 2];
            if cursor.read_exact(&mut bytes).is_err() {
                cursor.set_position(start);
                return Ok(None);
            }
            64 + bytes[0] as u32 + bytes[1] as u32 * 256
        }
        other => other as u32,
    };

    let consumed = (cursor.position() - start) as usize;
    Ok(Some((ChunkBasicHeader { format, chunk_stream_id }, consumed)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::encoder::ChunkEncoder;

    fn roundtrip(chunks: Vec<Chunk>, chunk_size: usize) -> Vec<Chunk> {
        let mut encoder = ChunkEncoder::default();
        encoder.set_chunk_size(chunk_size);
        let mut buf = BytesMut::new();
        for chunk in chunks {
            let mut writer = (&mut buf).writer();
            encoder.write_chunk(&mut writer, chunk).unwrap();
        }

        let mut decoder = ChunkDecoder::default();
        decoder.update_max_chunk_size(chunk_size);
        let mut out = Vec::new();
        while let Some(chunk) = decoder.read_chunk(&mut buf).unwrap() {
            out.push(chunk);
        }
        out
    }

    use bytes::BufMut;

    #[test]
    fn roundtrips_single_chunk_message() {
        let chunk = Chunk::new(3, 0, MessageTypeID::SetChunkSize, 0, Bytes::from_static(b"hello"));
        let decoded = roundtrip(vec![chunk], 128);
        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded[0].payload, Bytes::from_static(b"hello"));
    }

    #[test]
    fn roundtrips_message_split_across_chunks() {
        let payload = Bytes::from(vec![7u8; 300]);
        let chunk = Chunk::new(4, 0, MessageTypeID::Video, 1, payload.clone());
        let decoded = roundtrip(vec![chunk], 128);
        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded[0].payload, payload);
    }

    #[test]
    fn returns_none_on_partial_buffer() {
        let mut decoder = ChunkDecoder::default();
        let mut buf = BytesMut::from(&[0x03][..]);
        assert!(decoder.read_chunk(&mut buf).unwrap().is_none());
        assert_eq!(buf.len(), 1, "partial header bytes must not be consumed");
    }

    #[test]
    fn type3_without_previous_header_errors() {
        let mut decoder = ChunkDecoder::default();
        let mut buf = BytesMut::from(&[0xC3][..]); // fmt=3, csid=3
        let err = decoder.read_chunk(&mut buf).unwrap_err();
        assert!(matches!(err, ChunkDecodeError::MissingPreviousChunkHeader(3)));
    }
}
