mod reader;
mod writer;

pub use reader::NetStreamCommand;
pub use writer::NetStreamWriter;
