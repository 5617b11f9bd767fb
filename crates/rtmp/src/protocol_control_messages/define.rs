use num_derive::FromPrimitive;

/// The `limit type` byte of a `Set Peer Bandwidth` message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive)]
#[repr(u8)]
pub enum PeerBandwidthLimitType {
    Hard = 0,
    Soft = 1,
    Dynamic = 2,
}
