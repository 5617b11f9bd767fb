/// Window acknowledgement size advertised to every client right after
/// `connect`, matching the value most RTMP servers default to.
pub const DEFAULT_WINDOW_ACK_SIZE: u32 = 2_500_000;

/// Chunk size the server asks the peer to switch to after `connect`.
pub const SERVER_CHUNK_SIZE: usize = 4096;

/// What a connection is currently doing with its one active stream.
///
/// A real RTMP connection can multiplex several `NetStream`s, but no client
/// in practice publishes and plays more than one at a time over the same
/// connection, so a single slot is enough.
#[derive(Debug, Clone)]
pub enum Role {
    Idle,
    Publishing(crate::registry::StreamKey),
    Playing(crate::registry::StreamKey),
}
