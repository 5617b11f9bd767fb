use byteorder::{BigEndian, ReadBytesExt};
use num_traits::FromPrimitive;
use rtmpd_amf0::{Amf0Decoder, Amf0Value};
use std::io::Cursor;

use super::define::{MessageTypeID, RtmpMessageData};
use super::errors::MessageError;
use crate::chunk::Chunk;

/// Turns a reassembled [`Chunk`] into a [`RtmpMessageData`], or `None` for a
/// message type this server has no use for (e.g. `Aggregate`).
pub fn parse(chunk: &Chunk) -> Result<Option<RtmpMessageData<'_>>, MessageError> {
    match chunk.message_header.msg_type_id {
        MessageTypeID::SetChunkSize => {
            let chunk_size = Cursor::new(&chunk.payload[..]).read_u32::<BigEndian>()?;
            Ok(Some(RtmpMessageData::SetChunkSize { chunk_size }))
        }
        MessageTypeID::WindowAcknowledgementSize => {
            let size = Cursor::new(&chunk.payload[..]).read_u32::<BigEndian>()?;
            Ok(Some(RtmpMessageData::WindowAcknowledgementSize { size }))
        }
        MessageTypeID::SetPeerBandwidth => {
            let mut cursor = Cursor::new(&chunk.payload[..]);
            let size = cursor.read_u32::<BigEndian>()?;
            let limit_type = cursor.read_u8()?;
            Ok(Some(RtmpMessageData::SetPeerBandwidth { size, limit_type }))
        }
        MessageTypeID::Acknowledgement => {
            let sequence_number = Cursor::new(&chunk.payload[..]).read_u32::<BigEndian>()?;
            Ok(Some(RtmpMessageData::Acknowledgement { sequence_number }))
        }
        MessageTypeID::CommandAMF0 => {
            let mut decoder = Amf0Decoder::new(&chunk.payload);
            let values = decoder.decode_all()?;
            let mut iter = values.into_iter();

            let command_name = match iter.next() {
                Some(Amf0Value::String(name)) => name.into_owned(),
                _ => return Err(MessageError::MissingCommandName),
            };
            let transaction_id = iter.next().and_then(|v| v.as_number()).unwrap_or(0.0);
            let command_object = iter.next().unwrap_or(Amf0Value::Null);
            let others: Vec<_> = iter.collect();

            Ok(Some(RtmpMessageData::Amf0Command {
                command_name,
                transaction_id,
                command_object,
                others,
            }))
        }
        MessageTypeID::DataAMF0 => Ok(Some(RtmpMessageData::Amf0Data { data: chunk.payload.clone() })),
        MessageTypeID::Audio => Ok(Some(RtmpMessageData::AudioData { data: chunk.payload.clone() })),
        MessageTypeID::Video => Ok(Some(RtmpMessageData::VideoData { data: chunk.payload.clone() })),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use rtmpd_amf0::Amf0Encoder;

    use super::*;
    use crate::chunk::{Chunk, ChunkBasicHeader, ChunkMessageHeader, ChunkType};

    fn chunk_with(msg_type_id: MessageTypeID, payload: Vec<u8>) -> Chunk {
        Chunk {
            basic_header: ChunkBasicHeader {
                format: ChunkType::Type0,
                chunk_stream_id: 3,
            },
            message_header: ChunkMessageHeader {
                timestamp: 0,
                msg_length: payload.len() as u32,
                msg_type_id,
                msg_stream_id: 0,
                was_extended_timestamp: false,
            },
            payload: Bytes::from(payload),
        }
    }

    #[test]
    fn parses_connect_command() {
        let mut payload = Vec::new();
        Amf0Encoder::write_string(&mut payload, "connect").unwrap();
        Amf0Encoder::write_number(&mut payload, 1.0).unwrap();
        Amf0Encoder::write_object(&mut payload, &[(std::borrow::Cow::Borrowed("app"), Amf0Value::string("live"))]).unwrap();

        let chunk = chunk_with(MessageTypeID::CommandAMF0, payload);
        let parsed = parse(&chunk).unwrap().unwrap();
        match parsed {
            RtmpMessageData::Amf0Command {
                command_name,
                transaction_id,
                command_object,
                ..
            } => {
                assert_eq!(command_name, "connect");
                assert_eq!(transaction_id, 1.0);
                assert_eq!(command_object.get("app").and_then(|v| v.as_str()), Some("live"));
            }
            _ => panic!("expected command"),
        }
    }

    #[test]
    fn parses_set_chunk_size() {
        let chunk = chunk_with(MessageTypeID::SetChunkSize, 8192u32.to_be_bytes().to_vec());
        let parsed = parse(&chunk).unwrap().unwrap();
        assert!(matches!(parsed, RtmpMessageData::SetChunkSize { chunk_size: 8192 }));
    }

    #[test]
    fn passes_through_video_payload() {
        let chunk = chunk_with(MessageTypeID::Video, vec![0x17, 0x00, 0x00, 0x00, 0x00]);
        let parsed = parse(&chunk).unwrap().unwrap();
        assert!(matches!(parsed, RtmpMessageData::VideoData { .. }));
    }

    #[test]
    fn unsupported_type_yields_none() {
        let chunk = chunk_with(MessageTypeID::Aggregate, vec![0; 4]);
        assert!(parse(&chunk).unwrap().is_none());
    }
}
