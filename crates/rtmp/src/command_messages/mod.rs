pub mod define;
mod errors;
pub mod netconnection;
pub mod netstream;
mod writer;

pub use define::{Command, RtmpCommand};
pub use errors::CommandError;
