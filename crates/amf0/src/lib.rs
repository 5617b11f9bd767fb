//! A pure Rust encoder and decoder for AMF0, the object serialization format
//! used by RTMP command messages.

mod decoder;
mod define;
mod encoder;
mod errors;

pub use decoder::Amf0Decoder;
pub use define::{Amf0Marker, Amf0Value};
pub use encoder::Amf0Encoder;
pub use errors::{Amf0ReadError, Amf0WriteError};
