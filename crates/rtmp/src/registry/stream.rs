use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Duration;

use tracing::debug;

use super::define::{audio_codec_name, is_audio_sequence_header, is_video_sequence_header, video_codec_name};
use crate::channels::{ChannelData, DataProducer, UniqueId};

/// The most recently seen sequence headers and metadata for a stream, so a
/// subscriber that joins after the publisher's first keyframe still gets a
/// decodable stream instead of garbage until the next keyframe.
#[derive(Debug, Default, Clone)]
struct SequenceHeaderCache {
    video: Option<ChannelData>,
    audio: Option<ChannelData>,
    metadata: Option<ChannelData>,
}

impl SequenceHeaderCache {
    fn observe(&mut self, data: &ChannelData) {
        match data {
            ChannelData::Video { data: payload, .. } if is_video_sequence_header(payload) => {
                self.video = Some(data.with_zero_timestamp());
            }
            ChannelData::Audio { data: payload, .. } if is_audio_sequence_header(payload) => {
                self.audio = Some(data.with_zero_timestamp());
            }
            ChannelData::Metadata { .. } => {
                self.metadata = Some(data.with_zero_timestamp());
            }
            _ => {}
        }
    }

    /// Metadata first, then audio before video, matching the order a late
    /// joiner must see them in.
    fn replay_into(&self, out: &mut Vec<ChannelData>) {
        out.extend(self.metadata.clone());
        out.extend(self.audio.clone());
        out.extend(self.video.clone());
    }
}

/// One live stream: a single publisher fanning out to any number of
/// subscribers, plus whatever sequence headers are needed to bring a late
/// joiner up to speed.
pub struct Stream {
    publisher: RwLock<Option<UniqueId>>,
    subscribers: RwLock<HashMap<UniqueId, DataProducer>>,
    recorder: RwLock<Option<DataProducer>>,
    sequence_headers: RwLock<SequenceHeaderCache>,
    video_codec: RwLock<Option<&'static str>>,
    audio_codec: RwLock<Option<&'static str>>,
}

impl Default for Stream {
    fn default() -> Self {
        Self {
            publisher: RwLock::new(None),
            subscribers: RwLock::new(HashMap::new()),
            recorder: RwLock::new(None),
            sequence_headers: RwLock::new(SequenceHeaderCache::default()),
            video_codec: RwLock::new(None),
            audio_codec: RwLock::new(None),
        }
    }
}

impl Stream {
    pub fn has_publisher(&self) -> bool {
        self.publisher.read().unwrap().is_some()
    }

    pub fn set_publisher(&self, id: UniqueId) {
        *self.publisher.write().unwrap() = Some(id);
    }

    /// Clears the publisher slot and every cached sequence header, but
    /// leaves subscribers connected: `Non-goal` is dropping viewers on
    /// republish, they just see a gap until the next keyframe.
    pub fn clear_publisher(&self, id: UniqueId) {
        let mut publisher = self.publisher.write().unwrap();
        if *publisher == Some(id) {
            *publisher = None;
        }
        drop(publisher);
        *self.sequence_headers.write().unwrap() = SequenceHeaderCache::default();
        *self.video_codec.write().unwrap() = None;
        *self.audio_codec.write().unwrap() = None;
    }

    /// Registers `sender` as a subscriber and immediately enqueues any
    /// cached sequence headers onto it, so the caller only has to drain the
    /// channel to get a decodable stream from the first frame. Returns the
    /// same headers for callers (tests, mainly) that want to assert on them
    /// without also owning the receiving end.
    pub fn add_subscriber(&self, id: UniqueId, sender: DataProducer) -> Vec<ChannelData> {
        let cache = self.sequence_headers.read().unwrap().clone();
        let mut replay = Vec::new();
        cache.replay_into(&mut replay);

        for data in &replay {
            if let Err(err) = sender.try_send(data.clone()) {
                debug!(subscriber = %id, error = %err, "failed to deliver cached sequence header to new subscriber");
            }
        }

        self.subscribers.write().unwrap().insert(id, sender);
        replay
    }

    pub fn remove_subscriber(&self, id: &UniqueId) {
        self.subscribers.write().unwrap().remove(id);
    }

    pub fn set_recorder(&self, sender: Option<DataProducer>) {
        *self.recorder.write().unwrap() = sender;
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().unwrap().len()
    }

    /// Read-only introspection: the codec name detected from the most
    /// recent video frame's leading byte, if any video has arrived yet.
    pub fn video_codec(&self) -> Option<&'static str> {
        *self.video_codec.read().unwrap()
    }

    /// Read-only introspection: the codec name detected from the most
    /// recent audio frame's leading byte, if any audio has arrived yet.
    pub fn audio_codec(&self) -> Option<&'static str> {
        *self.audio_codec.read().unwrap()
    }

    /// Fans `data` out to every subscriber and the recorder, if any.
    ///
    /// Takes the subscriber-list lock only long enough to clone the sender
    /// handles and update the sequence header cache; every send happens
    /// after the lock is released, so a slow subscriber's `try_send` can
    /// never block the publisher or its siblings.
    pub fn publish_data(&self, data: ChannelData) {
        self.detect_codec(&data);
        self.sequence_headers.write().unwrap().observe(&data);

        let subscribers: Vec<_> = self.subscribers.read().unwrap().iter().map(|(id, tx)| (*id, tx.clone())).collect();
        let recorder = self.recorder.read().unwrap().clone();

        for (id, tx) in subscribers {
            if let Err(err) = tx.try_send(data.clone()) {
                debug!(subscriber = %id, error = %err, "dropping frame for slow subscriber");
            }
        }

        if let Some(tx) = recorder {
            if let Err(err) = tx.try_send(data) {
                debug!(error = %err, "dropping frame for recorder");
            }
        }
    }

    /// Sniffs the leading codec-id byte of an audio/video frame and updates
    /// the stream's detected codec name. Metadata carries no codec id and is
    /// ignored.
    fn detect_codec(&self, data: &ChannelData) {
        match data {
            ChannelData::Video { data: payload, .. } => {
                if let Some(name) = video_codec_name(payload) {
                    *self.video_codec.write().unwrap() = Some(name);
                }
            }
            ChannelData::Audio { data: payload, .. } => {
                if let Some(name) = audio_codec_name(payload) {
                    *self.audio_codec.write().unwrap() = Some(name);
                }
            }
            ChannelData::Metadata { .. } => {}
        }
    }

    /// Cached sequence headers plus metadata to hand to a subscriber that
    /// joined mid-stream, used by [`Stream::add_subscriber`] internally and
    /// exposed here for callers that want to resend without re-subscribing.
    pub fn cached_sequence_headers(&self) -> Vec<ChannelData> {
        let cache = self.sequence_headers.read().unwrap().clone();
        let mut replay = Vec::new();
        cache.replay_into(&mut replay);
        replay
    }
}

/// How long `publish_data` is willing to let a `try_send` retry before
/// giving up, used by callers that want backpressure instead of an instant
/// drop. `Stream::publish_data` itself never blocks.
pub const SLOW_SUBSCRIBER_GRACE: Duration = Duration::from_millis(200);

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;
    use crate::channels::subscriber_channel;

    #[test]
    fn late_joiner_receives_cached_sequence_headers_at_zero_timestamp() {
        let stream = Stream::default();
        stream.publish_data(ChannelData::Video {
            timestamp: 5000,
            data: Bytes::from_static(&[0x17, 0x00, 0, 0, 0]),
        });

        let (tx, _rx) = subscriber_channel();
        let replay = stream.add_subscriber(UniqueId::new_v4(), tx);
        assert_eq!(replay.len(), 1);
        assert_eq!(replay[0].timestamp(), 0);
    }

    #[test]
    fn publish_data_detects_codecs_from_first_frame() {
        let stream = Stream::default();
        assert_eq!(stream.video_codec(), None);
        assert_eq!(stream.audio_codec(), None);

        stream.publish_data(ChannelData::Video {
            timestamp: 0,
            data: Bytes::from_static(&[0x17, 0x00, 0, 0, 0]),
        });
        stream.publish_data(ChannelData::Audio {
            timestamp: 0,
            data: Bytes::from_static(&[0xAF, 0x00]),
        });

        assert_eq!(stream.video_codec(), Some("avc"));
        assert_eq!(stream.audio_codec(), Some("aac"));
    }

    #[test]
    fn publisher_clear_resets_cache() {
        let stream = Stream::default();
        let id = UniqueId::new_v4();
        stream.set_publisher(id);
        stream.publish_data(ChannelData::Audio {
            timestamp: 0,
            data: Bytes::from_static(&[0xAF, 0x00]),
        });
        assert_eq!(stream.cached_sequence_headers().len(), 1);

        stream.clear_publisher(id);
        assert!(stream.cached_sequence_headers().is_empty());
        assert!(!stream.has_publisher());
    }

    #[tokio::test]
    async fn slow_subscriber_drops_frames_without_blocking() {
        let stream = Stream::default();
        let (tx, mut rx) = subscriber_channel();
        stream.add_subscriber(UniqueId::new_v4(), tx);

        for _ in 0..(crate::channels::SUBSCRIBER_QUEUE_CAPACITY + 10) {
            stream.publish_data(ChannelData::Video {
                timestamp: 0,
                data: Bytes::from_static(b"frame"),
            });
        }

        // The channel is full, but publish_data never blocked getting here.
        assert!(rx.try_recv().is_ok());
    }
}
