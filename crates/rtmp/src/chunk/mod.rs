mod decoder;
mod define;
mod encoder;
mod errors;

pub use decoder::ChunkDecoder;
pub use define::{
    AUDIO_CHUNK_STREAM_ID, COMMAND_CHUNK_STREAM_ID, CHUNK_SIZE, Chunk, ChunkBasicHeader, ChunkMessageHeader, ChunkType,
    INIT_CHUNK_SIZE, MAX_CHUNK_SIZE, VIDEO_CHUNK_STREAM_ID,
};
pub use encoder::ChunkEncoder;
pub use errors::{ChunkDecodeError, ChunkEncodeError};
