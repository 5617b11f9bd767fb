mod define;
mod stream;

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

pub use define::{PlayError, PublishError, StreamKey, is_audio_sequence_header, is_video_sequence_header};
pub use stream::{SLOW_SUBSCRIBER_GRACE, Stream};

use crate::channels::{DataConsumer, DataProducer, UniqueId, subscriber_channel};

/// Process-wide table of live streams, keyed by `(app, stream name)`.
///
/// Looking a stream up never holds a lock across a [`Stream`]'s own
/// operations: the registry lock only ever guards the `HashMap` itself.
#[derive(Default)]
pub struct StreamRegistry {
    streams: RwLock<HashMap<StreamKey, Arc<Stream>>>,
}

impl StreamRegistry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn get_or_create(&self, key: &StreamKey) -> Arc<Stream> {
        if let Some(stream) = self.streams.read().unwrap().get(key) {
            return stream.clone();
        }

        self.streams.write().unwrap().entry(key.clone()).or_default().clone()
    }

    fn get(&self, key: &StreamKey) -> Option<Arc<Stream>> {
        self.streams.read().unwrap().get(key).cloned()
    }

    /// Claims the publisher slot for `key`. A stream may have at most one
    /// active publisher at a time.
    pub fn publish(&self, key: &StreamKey, id: UniqueId) -> Result<Arc<Stream>, PublishError> {
        let stream = self.get_or_create(key);
        if stream.has_publisher() {
            return Err(PublishError::AlreadyPublishing);
        }
        stream.set_publisher(id);
        Ok(stream)
    }

    pub fn unpublish(&self, key: &StreamKey, id: UniqueId) {
        if let Some(stream) = self.get(key) {
            stream.clear_publisher(id);
        }
    }

    /// Subscribes to `key`, requiring an already-live publisher; playing a
    /// stream that has never been published is rejected rather than left to
    /// wait indefinitely.
    pub fn subscribe(&self, key: &StreamKey, id: UniqueId) -> Result<(Arc<Stream>, DataConsumer), PlayError> {
        let stream = self.get(key).filter(|s| s.has_publisher()).ok_or(PlayError::StreamNotFound)?;
        let (tx, rx) = subscriber_channel();
        stream.add_subscriber(id, tx);
        Ok((stream, rx))
    }

    pub fn unsubscribe(&self, key: &StreamKey, id: &UniqueId) {
        if let Some(stream) = self.get(key) {
            stream.remove_subscriber(id);
        }
    }

    /// Attaches a recorder sink to an already-published stream.
    pub fn attach_recorder(&self, key: &StreamKey, sender: DataProducer) {
        if let Some(stream) = self.get(key) {
            stream.set_recorder(Some(sender));
        }
    }

    pub fn detach_recorder(&self, key: &StreamKey) {
        if let Some(stream) = self.get(key) {
            stream.set_recorder(None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_publisher_is_rejected() {
        let registry = StreamRegistry::new();
        let key = StreamKey::new("live", "stream1");
        let first = UniqueId::new_v4();
        let second = UniqueId::new_v4();

        registry.publish(&key, first).unwrap();
        let err = registry.publish(&key, second).unwrap_err();
        assert_eq!(err, PublishError::AlreadyPublishing);
    }

    #[test]
    fn republishing_after_unpublish_succeeds() {
        let registry = StreamRegistry::new();
        let key = StreamKey::new("live", "stream1");
        let first = UniqueId::new_v4();

        registry.publish(&key, first).unwrap();
        registry.unpublish(&key, first);
        registry.publish(&key, UniqueId::new_v4()).unwrap();
    }

    #[test]
    fn subscribing_to_absent_stream_fails() {
        let registry = StreamRegistry::new();
        let key = StreamKey::new("live", "nobody-publishing");
        let err = registry.subscribe(&key, UniqueId::new_v4()).unwrap_err();
        assert_eq!(err, PlayError::StreamNotFound);
    }

    #[test]
    fn subscribing_to_live_stream_succeeds() {
        let registry = StreamRegistry::new();
        let key = StreamKey::new("live", "stream1");
        registry.publish(&key, UniqueId::new_v4()).unwrap();
        assert!(registry.subscribe(&key, UniqueId::new_v4()).is_ok());
    }
}
