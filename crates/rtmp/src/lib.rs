//! A pure Rust RTMP server core.
//!
//! This crate implements the wire protocol and connection state machine;
//! it owns no listener and no `main` — see the `rtmpd-server` binary for
//! that. The pieces compose roughly bottom-up:
//!
//! - [`chunk`] turns bytes on the wire into whole [`messages::RtmpMessageData`]
//!   and back.
//! - [`command_messages`] decodes/encodes the NetConnection/NetStream AMF0
//!   commands that ride inside those messages.
//! - [`handshake`] runs the plaintext RTMP handshake before any chunk is
//!   read.
//! - [`registry`] holds the process-wide table of live streams and fans
//!   published media out to subscribers.
//! - [`session`] ties all of the above into one connection's state machine.

pub(crate) mod macros;

pub mod channels;
pub mod chunk;
pub mod command_messages;
pub mod handshake;
pub mod messages;
pub mod protocol_control_messages;
pub mod recorder;
pub mod registry;
pub mod session;
pub mod user_control_messages;

pub use session::{RecordingsDir, Session, SessionError};
