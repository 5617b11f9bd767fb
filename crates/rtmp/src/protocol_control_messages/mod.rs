mod define;
mod errors;
mod writer;

pub use define::PeerBandwidthLimitType;
pub use errors::ProtocolControlMessageError;
pub use writer::{
    ProtocolControlMessageAcknowledgement, ProtocolControlMessageSetChunkSize, ProtocolControlMessageSetPeerBandwidth,
    ProtocolControlMessageWindowAcknowledgementSize,
};
