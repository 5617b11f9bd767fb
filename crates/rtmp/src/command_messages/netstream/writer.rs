use std::borrow::Cow;
use std::io::Write;

use rtmpd_amf0::Amf0Value;

use super::super::define::Command;
use super::super::errors::CommandError;
use crate::chunk::ChunkEncoder;

pub struct NetStreamWriter;

impl NetStreamWriter {
    pub fn write_on_status(
        writer: &mut impl Write,
        encoder: &ChunkEncoder,
        transaction_id: f64,
        level: &str,
        code: &str,
        description: &str,
    ) -> Result<(), CommandError> {
        let info = Amf0Value::object(vec![
            (Cow::Borrowed("level"), Amf0Value::string(level.to_string())),
            (Cow::Borrowed("code"), Amf0Value::string(code.to_string())),
            (Cow::Borrowed("description"), Amf0Value::string(description.to_string())),
        ]);

        Command::new("onStatus", transaction_id, vec![Amf0Value::Null, info]).write(writer, encoder)
    }

    pub fn write_result_number(
        writer: &mut impl Write,
        encoder: &ChunkEncoder,
        transaction_id: f64,
        value: f64,
    ) -> Result<(), CommandError> {
        Command::new("_result", transaction_id, vec![Amf0Value::Null, Amf0Value::Number(value)]).write(writer, encoder)
    }
}

#[cfg(test)]
mod tests {
    use bytes::{BufMut, BytesMut};

    use super::*;
    use crate::chunk::ChunkDecoder;
    use crate::messages::{self, RtmpMessageData};

    #[test]
    fn on_status_round_trips() {
        let encoder = ChunkEncoder::default();
        let mut buf = BytesMut::new();
        {
            let mut writer = (&mut buf).writer();
            NetStreamWriter::write_on_status(&mut writer, &encoder, 0.0, "status", "NetStream.Publish.Start", "Publishing mystream")
                .unwrap();
        }

        let mut decoder = ChunkDecoder::default();
        let chunk = decoder.read_chunk(&mut buf).unwrap().unwrap();
        let parsed = messages::parse(&chunk).unwrap().unwrap();
        match parsed {
            RtmpMessageData::Amf0Command { command_name, others, .. } => {
                assert_eq!(command_name, "onStatus");
                assert_eq!(others[1].get("code").and_then(|v| v.as_str()), Some("NetStream.Publish.Start"));
            }
            _ => panic!("expected command"),
        }
    }
}
