mod define;
mod errors;
mod server;

pub use define::{RTMP_HANDSHAKE_SIZE, ServerHandshakeState};
pub use errors::HandshakeError;
pub use server::HandshakeServer;
