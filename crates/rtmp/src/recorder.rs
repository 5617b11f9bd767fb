use std::fmt;
use std::path::PathBuf;

use rtmpd_flv::{FlvMuxError, FlvTagType, encode_header, encode_previous_tag_size, encode_tag};
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, warn};

use crate::channels::{ChannelData, DataConsumer};
use crate::macros::from_error;

#[derive(Debug)]
pub enum RecorderError {
    Io(std::io::Error),
    Mux(FlvMuxError),
}

impl fmt::Display for RecorderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "io error: {err}"),
            Self::Mux(err) => write!(f, "flv mux error: {err}"),
        }
    }
}

impl std::error::Error for RecorderError {}

from_error!(RecorderError, Self::Io, std::io::Error);
from_error!(RecorderError, Self::Mux, FlvMuxError);

/// Drains a stream's [`DataConsumer`] into an FLV file on disk.
///
/// The recorder registers itself as an ordinary subscriber (see
/// [`crate::registry::Stream::set_recorder`]), so it sees exactly the frames
/// a viewer would: cached sequence headers first, then whatever the
/// publisher sends afterwards.
pub struct Recorder {
    writer: BufWriter<File>,
}

impl Recorder {
    pub async fn create(path: impl Into<PathBuf>) -> Result<Self, RecorderError> {
        let file = File::create(path.into()).await?;
        let mut writer = BufWriter::new(file);
        writer.write_all(&encode_header(true, true)).await?;
        Ok(Self { writer })
    }

    async fn write_tag(&mut self, tag_type: FlvTagType, timestamp: u32, body: &[u8]) -> Result<(), RecorderError> {
        let tag = encode_tag(tag_type, timestamp, body)?;
        let tag_len = tag.len() as u32;
        self.writer.write_all(&tag).await?;
        self.writer.write_all(&encode_previous_tag_size(tag_len)).await?;
        Ok(())
    }

    async fn write(&mut self, data: &ChannelData) -> Result<(), RecorderError> {
        match data {
            ChannelData::Video { timestamp, data } => self.write_tag(FlvTagType::Video, *timestamp, data).await,
            ChannelData::Audio { timestamp, data } => self.write_tag(FlvTagType::Audio, *timestamp, data).await,
            ChannelData::Metadata { timestamp, data } => self.write_tag(FlvTagType::ScriptData, *timestamp, data).await,
        }
    }

    /// Runs until `consumer` closes (the stream is unpublished or the
    /// recorder sender is dropped), then flushes the buffered writer so the
    /// file is complete on disk.
    pub async fn run(mut self, mut consumer: DataConsumer) {
        while let Some(data) = consumer.recv().await {
            if let Err(err) = self.write(&data).await {
                warn!(error = %err, "recorder write failed, stopping recording");
                return;
            }
        }

        if let Err(err) = self.writer.flush().await {
            warn!(error = %err, "recorder final flush failed");
        } else {
            debug!("recording finished");
        }
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;
    use crate::channels::subscriber_channel;

    #[tokio::test]
    async fn records_frames_to_a_valid_flv_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.flv");

        let recorder = Recorder::create(&path).await.unwrap();
        let (tx, rx) = subscriber_channel();

        let handle = tokio::spawn(recorder.run(rx));

        tx.send(ChannelData::Video {
            timestamp: 0,
            data: bytes::Bytes::from_static(&[0x17, 0x00, 0, 0, 0]),
        })
        .await
        .unwrap();
        drop(tx);
        handle.await.unwrap();

        let bytes = tokio::fs::read(&path).await.unwrap();
        assert_eq!(&bytes[0..3], b"FLV");
        assert!(bytes.len() > 13);
    }
}
