use std::borrow::Cow;
use std::io::Write;

use rtmpd_amf0::Amf0Value;

use super::super::define::Command;
use super::super::errors::CommandError;
use crate::chunk::ChunkEncoder;

/// Writes replies to NetConnection commands (`connect`, `createStream`).
pub struct NetConnection;

impl NetConnection {
    #[allow(clippy::too_many_arguments)]
    pub fn write_connect_success(
        writer: &mut impl Write,
        encoder: &ChunkEncoder,
        transaction_id: f64,
        fms_version: &str,
        capabilities: f64,
        code: &str,
        description: &str,
    ) -> Result<(), CommandError> {
        let properties = Amf0Value::object(vec![
            (Cow::Borrowed("fmsVer"), Amf0Value::string(fms_version.to_string())),
            (Cow::Borrowed("capabilities"), Amf0Value::Number(capabilities)),
        ]);
        let information = Amf0Value::object(vec![
            (Cow::Borrowed("level"), Amf0Value::string("status")),
            (Cow::Borrowed("code"), Amf0Value::string(code.to_string())),
            (Cow::Borrowed("description"), Amf0Value::string(description.to_string())),
            (Cow::Borrowed("objectEncoding"), Amf0Value::Number(0.0)),
        ]);

        Command::new("_result", transaction_id, vec![properties, information]).write(writer, encoder)
    }

    pub fn write_connect_error(
        writer: &mut impl Write,
        encoder: &ChunkEncoder,
        transaction_id: f64,
        code: &str,
        description: &str,
    ) -> Result<(), CommandError> {
        let information = Amf0Value::object(vec![
            (Cow::Borrowed("level"), Amf0Value::string("error")),
            (Cow::Borrowed("code"), Amf0Value::string(code.to_string())),
            (Cow::Borrowed("description"), Amf0Value::string(description.to_string())),
        ]);

        Command::new("_error", transaction_id, vec![Amf0Value::Null, information]).write(writer, encoder)
    }

    pub fn write_create_stream_response(
        writer: &mut impl Write,
        encoder: &ChunkEncoder,
        transaction_id: f64,
        stream_id: f64,
    ) -> Result<(), CommandError> {
        Command::new("_result", transaction_id, vec![Amf0Value::Null, Amf0Value::Number(stream_id)]).write(writer, encoder)
    }
}

#[cfg(test)]
mod tests {
    use bytes::{BufMut, BytesMut};

    use super::*;
    use crate::chunk::ChunkDecoder;
    use crate::messages::{self, RtmpMessageData};

    #[test]
    fn connect_success_preserves_object_key_order() {
        let encoder = ChunkEncoder::default();
        let mut buf = BytesMut::new();
        {
            let mut writer = (&mut buf).writer();
            NetConnection::write_connect_success(&mut writer, &encoder, 1.0, "FMS/3,0,1,123", 31.0, "NetConnection.Connect.Success", "ok")
                .unwrap();
        }

        let mut decoder = ChunkDecoder::default();
        let chunk = decoder.read_chunk(&mut buf).unwrap().unwrap();
        let parsed = messages::parse(&chunk).unwrap().unwrap();
        match parsed {
            RtmpMessageData::Amf0Command { others, .. } => {
                let information = &others[1];
                assert_eq!(information.get("level").and_then(|v| v.as_str()), Some("status"));
                if let Amf0Value::Object(entries) = information {
                    assert_eq!(entries[0].0, "level");
                    assert_eq!(entries[1].0, "code");
                } else {
                    panic!("expected object");
                }
            }
            _ => panic!("expected command"),
        }
    }
}
