pub const RTMP_HANDSHAKE_SIZE: usize = 1536;

/// Only version 3 (the unencrypted handshake) is supported; everything else
/// is still accepted from the client but treated as version 3 on our side,
/// matching how real clients and servers behave in practice.
pub const RTMP_VERSION: u8 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerHandshakeState {
    ReadC0C1,
    WriteS0S1S2,
    ReadC2,
    Finish,
}
