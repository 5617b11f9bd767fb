use std::io::Write;

use bytes::{BufMut, BytesMut};
use rtmpd_amf0::Amf0Encoder;

use super::define::Command;
use super::errors::CommandError;
use crate::chunk::{Chunk, ChunkEncoder, COMMAND_CHUNK_STREAM_ID};
use crate::messages::MessageTypeID;

// We only ever emit AMF0-encoded command messages, never AMF3. OBS, ffmpeg,
// and every server in the nginx-rtmp/SRS lineage do the same: AMF3 only
// shows up in ActionScript 3 clients talking to Flash Media Server, which
// none of our targets are.
impl<'a> Command<'a> {
    fn write_amf0_chunk(&self) -> Result<Chunk, CommandError> {
        let mut payload = BytesMut::new().writer();
        Amf0Encoder::write_string(&mut payload, &self.command_name)?;
        Amf0Encoder::write_number(&mut payload, self.transaction_id)?;
        for value in &self.values {
            Amf0Encoder::encode(&mut payload, value)?;
        }

        Ok(Chunk::new(
            COMMAND_CHUNK_STREAM_ID,
            0,
            MessageTypeID::CommandAMF0,
            0,
            payload.into_inner().freeze(),
        ))
    }

    pub fn write(self, writer: &mut impl Write, encoder: &ChunkEncoder) -> Result<(), CommandError> {
        let chunk = self.write_amf0_chunk()?;
        encoder.write_chunk(writer, chunk)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rtmpd_amf0::Amf0Value;

    use super::*;
    use crate::messages::{self, RtmpMessageData};

    #[test]
    fn writes_and_decodes_a_command() {
        let command = Command::new("onStatus", 0.0, vec![Amf0Value::Null, Amf0Value::string("ok")]);
        let encoder = ChunkEncoder::default();
        let mut buf = BytesMut::new();
        {
            let mut writer = (&mut buf).writer();
            command.write(&mut writer, &encoder).unwrap();
        }

        let mut decoder = crate::chunk::ChunkDecoder::default();
        let chunk = decoder.read_chunk(&mut buf).unwrap().unwrap();
        let parsed = messages::parse(&chunk).unwrap().unwrap();
        match parsed {
            RtmpMessageData::Amf0Command { command_name, .. } => assert_eq!(command_name, "onStatus"),
            _ => panic!("expected command"),
        }
    }
}
