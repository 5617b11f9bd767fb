mod define;
mod errors;
mod writer;

pub use define::EventType;
pub use errors::EventMessagesError;
pub use writer::{
    EventMessagePingRequest, EventMessagePingResponse, EventMessageSetBufferLength, EventMessageStreamBegin,
    EventMessageStreamEof, EventMessageStreamIsRecorded,
};
