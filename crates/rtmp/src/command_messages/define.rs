use rtmpd_amf0::Amf0Value;

/// One NetConnection/NetStream command: a name, a transaction id, and zero or
/// more AMF0 arguments that follow it (usually a command object plus a
/// handful of positional values).
#[derive(Debug, Clone)]
pub struct Command<'a> {
    pub command_name: String,
    pub transaction_id: f64,
    pub values: Vec<Amf0Value<'a>>,
}

impl<'a> Command<'a> {
    pub fn new(command_name: impl Into<String>, transaction_id: f64, values: Vec<Amf0Value<'a>>) -> Self {
        Self {
            command_name: command_name.into(),
            transaction_id,
            values,
        }
    }
}

/// Which NetConnection/NetStream command a client sent, decoded from the
/// command name string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RtmpCommand {
    Connect,
    Call,
    Close,
    CreateStream,
    Play,
    Play2,
    DeleteStream,
    CloseStream,
    ReceiveAudio,
    ReceiveVideo,
    Publish,
    Seek,
    Pause,
    ReleaseStream,
    FcPublish,
    FcUnpublish,
    GetStreamLength,
    Unknown(String),
}

impl From<&str> for RtmpCommand {
    fn from(command: &str) -> Self {
        match command {
            "connect" => Self::Connect,
            "call" => Self::Call,
            "close" => Self::Close,
            "createStream" => Self::CreateStream,
            "play" => Self::Play,
            "play2" => Self::Play2,
            "deleteStream" => Self::DeleteStream,
            "closeStream" => Self::CloseStream,
            "receiveAudio" => Self::ReceiveAudio,
            "receiveVideo" => Self::ReceiveVideo,
            "publish" => Self::Publish,
            "seek" => Self::Seek,
            "pause" => Self::Pause,
            "releaseStream" => Self::ReleaseStream,
            "FCPublish" => Self::FcPublish,
            "FCUnpublish" => Self::FcUnpublish,
            "getStreamLength" => Self::GetStreamLength,
            other => Self::Unknown(other.to_string()),
        }
    }
}
