use std::io::Write;

use byteorder::{BigEndian, WriteBytesExt};
use bytes::{BufMut, BytesMut};

use super::define::PeerBandwidthLimitType;
use super::errors::ProtocolControlMessageError;
use crate::chunk::{Chunk, ChunkEncoder, COMMAND_CHUNK_STREAM_ID};
use crate::messages::MessageTypeID;

pub struct ProtocolControlMessageSetChunkSize {
    pub chunk_size: u32,
}

impl ProtocolControlMessageSetChunkSize {
    pub fn write(&self, encoder: &ChunkEncoder, writer: &mut impl Write) -> Result<(), ProtocolControlMessageError> {
        let mut payload = BytesMut::new();
        (&mut payload).writer().write_u32::<BigEndian>(self.chunk_size)?;

        let chunk = Chunk::new(COMMAND_CHUNK_STREAM_ID, 0, MessageTypeID::SetChunkSize, 0, payload.freeze());
        encoder.write_chunk(writer, chunk)?;
        Ok(())
    }
}

pub struct ProtocolControlMessageWindowAcknowledgementSize {
    pub acknowledgement_window_size: u32,
}

impl ProtocolControlMessageWindowAcknowledgementSize {
    pub fn write(&self, encoder: &ChunkEncoder, writer: &mut impl Write) -> Result<(), ProtocolControlMessageError> {
        let mut payload = BytesMut::new();
        (&mut payload)
            .writer()
            .write_u32::<BigEndian>(self.acknowledgement_window_size)?;

        let chunk = Chunk::new(
            COMMAND_CHUNK_STREAM_ID,
            0,
            MessageTypeID::WindowAcknowledgementSize,
            0,
            payload.freeze(),
        );
        encoder.write_chunk(writer, chunk)?;
        Ok(())
    }
}

pub struct ProtocolControlMessageSetPeerBandwidth {
    pub window_size: u32,
    pub limit_type: PeerBandwidthLimitType,
}

impl ProtocolControlMessageSetPeerBandwidth {
    pub fn write(&self, encoder: &ChunkEncoder, writer: &mut impl Write) -> Result<(), ProtocolControlMessageError> {
        let mut payload = BytesMut::new();
        {
            let mut body = (&mut payload).writer();
            body.write_u32::<BigEndian>(self.window_size)?;
            body.write_u8(self.limit_type as u8)?;
        }

        let chunk = Chunk::new(COMMAND_CHUNK_STREAM_ID, 0, MessageTypeID::SetPeerBandwidth, 0, payload.freeze());
        encoder.write_chunk(writer, chunk)?;
        Ok(())
    }
}

pub struct ProtocolControlMessageAcknowledgement {
    pub sequence_number: u32,
}

impl ProtocolControlMessageAcknowledgement {
    pub fn write(&self, encoder: &ChunkEncoder, writer: &mut impl Write) -> Result<(), ProtocolControlMessageError> {
        let mut payload = BytesMut::new();
        (&mut payload).writer().write_u32::<BigEndian>(self.sequence_number)?;

        let chunk = Chunk::new(COMMAND_CHUNK_STREAM_ID, 0, MessageTypeID::Acknowledgement, 0, payload.freeze());
        encoder.write_chunk(writer, chunk)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use bytes::{Buf, BufMut};

    use super::*;
    use crate::chunk::ChunkDecoder;
    use crate::messages;

    #[test]
    fn set_chunk_size_round_trips() {
        let encoder = ChunkEncoder::default();
        let mut buf = BytesMut::new();
        {
            let mut writer = (&mut buf).writer();
            ProtocolControlMessageSetChunkSize { chunk_size: 8192 }.write(&encoder, &mut writer).unwrap();
        }

        let mut decoder = ChunkDecoder::default();
        let chunk = decoder.read_chunk(&mut buf).unwrap().unwrap();
        let parsed = messages::parse(&chunk).unwrap().unwrap();
        assert!(matches!(parsed, messages::RtmpMessageData::SetChunkSize { chunk_size: 8192 }));
    }

    #[test]
    fn set_peer_bandwidth_round_trips() {
        let encoder = ChunkEncoder::default();
        let mut buf = BytesMut::new();
        {
            let mut writer = (&mut buf).writer();
            ProtocolControlMessageSetPeerBandwidth {
                window_size: 2_500_000,
                limit_type: PeerBandwidthLimitType::Dynamic,
            }
            .write(&encoder, &mut writer)
            .unwrap();
        }

        let mut decoder = ChunkDecoder::default();
        let chunk = decoder.read_chunk(&mut buf).unwrap().unwrap();
        let parsed = messages::parse(&chunk).unwrap().unwrap();
        match parsed {
            messages::RtmpMessageData::SetPeerBandwidth { size, limit_type } => {
                assert_eq!(size, 2_500_000);
                assert_eq!(limit_type, 2);
            }
            _ => panic!("expected set peer bandwidth"),
        }
        let _ = buf.remaining();
    }
}
