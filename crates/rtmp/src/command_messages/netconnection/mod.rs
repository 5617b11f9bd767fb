mod reader;
mod writer;

pub use reader::{ConnectCommand, NetConnectionCommand};
pub use writer::NetConnection;
