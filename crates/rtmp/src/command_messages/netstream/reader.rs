use rtmpd_amf0::Amf0Value;

use super::super::define::RtmpCommand;

#[derive(Debug, Clone)]
pub enum NetStreamCommand {
    Publish { stream_name: String },
    Play { stream_name: String },
    DeleteStream { stream_id: u32 },
    CloseStream,
    /// `releaseStream`, `FCPublish`, `FCUnpublish`, `getStreamLength`: legacy
    /// FMLE/OBS housekeeping calls that don't affect server state. We parse
    /// them only so the transaction id can be echoed back with `_result`.
    Nop,
}

impl NetStreamCommand {
    pub fn read(command: &RtmpCommand, others: &[Amf0Value<'_>]) -> Option<Self> {
        match command {
            RtmpCommand::Publish => {
                let stream_name = others.first().and_then(|v| v.as_str())?.to_string();
                Some(Self::Publish { stream_name })
            }
            RtmpCommand::Play | RtmpCommand::Play2 => {
                let stream_name = others.first().and_then(|v| v.as_str())?.to_string();
                Some(Self::Play { stream_name })
            }
            RtmpCommand::DeleteStream => {
                let stream_id = others.first().and_then(|v| v.as_number())? as u32;
                Some(Self::DeleteStream { stream_id })
            }
            RtmpCommand::CloseStream => Some(Self::CloseStream),
            RtmpCommand::ReleaseStream | RtmpCommand::FcPublish | RtmpCommand::FcUnpublish | RtmpCommand::GetStreamLength => {
                Some(Self::Nop)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_publish_stream_name() {
        let others = vec![Amf0Value::string("mystream"), Amf0Value::string("live")];
        let parsed = NetStreamCommand::read(&RtmpCommand::Publish, &others).unwrap();
        assert!(matches!(parsed, NetStreamCommand::Publish { stream_name } if stream_name == "mystream"));
    }

    #[test]
    fn reads_play_stream_name() {
        let others = vec![Amf0Value::string("mystream")];
        let parsed = NetStreamCommand::read(&RtmpCommand::Play, &others).unwrap();
        assert!(matches!(parsed, NetStreamCommand::Play { stream_name } if stream_name == "mystream"));
    }

    #[test]
    fn publish_without_name_is_none() {
        assert!(NetStreamCommand::read(&RtmpCommand::Publish, &[]).is_none());
    }
}
