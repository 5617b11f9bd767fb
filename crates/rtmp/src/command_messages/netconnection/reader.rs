use rtmpd_amf0::Amf0Value;

use super::super::define::RtmpCommand;
use super::super::errors::CommandError;

#[derive(Debug, Clone)]
pub struct ConnectCommand {
    pub app: String,
}

#[derive(Debug, Clone)]
pub enum NetConnectionCommand {
    Connect(ConnectCommand),
    Call,
    Close,
    CreateStream,
}

impl NetConnectionCommand {
    /// Returns `None` for commands this module doesn't recognize; the caller
    /// should fall back to NetStream command parsing.
    pub fn read(command: &RtmpCommand, command_object: &Amf0Value<'_>) -> Result<Option<Self>, CommandError> {
        match command {
            RtmpCommand::Connect => {
                let app = command_object.get("app").and_then(|v| v.as_str()).unwrap_or_default().to_string();
                Ok(Some(Self::Connect(ConnectCommand { app })))
            }
            RtmpCommand::Call => Ok(Some(Self::Call)),
            RtmpCommand::Close => Ok(Some(Self::Close)),
            RtmpCommand::CreateStream => Ok(Some(Self::CreateStream)),
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::borrow::Cow;

    use super::*;

    #[test]
    fn extracts_app_from_connect_object() {
        let object = Amf0Value::object(vec![(Cow::Borrowed("app"), Amf0Value::string("live/stream1"))]);
        let parsed = NetConnectionCommand::read(&RtmpCommand::Connect, &object).unwrap().unwrap();
        match parsed {
            NetConnectionCommand::Connect(connect) => assert_eq!(connect.app, "live/stream1"),
            _ => panic!("expected connect"),
        }
    }

    #[test]
    fn non_netconnection_command_is_none() {
        let result = NetConnectionCommand::read(&RtmpCommand::Publish, &Amf0Value::Null).unwrap();
        assert!(result.is_none());
    }
}
