use bytes::Bytes;
use tokio::sync::mpsc;

/// A connection-scoped identifier handed out whenever a stream accepts a
/// publisher or subscriber, so later log lines and error messages can name
/// a specific session without holding on to the session itself.
pub type UniqueId = uuid::Uuid;

/// One media unit flowing from a publisher to every subscriber of a stream.
#[derive(Debug, Clone)]
pub enum ChannelData {
    Video { timestamp: u32, data: Bytes },
    Audio { timestamp: u32, data: Bytes },
    Metadata { timestamp: u32, data: Bytes },
}

impl ChannelData {
    pub fn timestamp(&self) -> u32 {
        match self {
            Self::Video { timestamp, .. } | Self::Audio { timestamp, .. } | Self::Metadata { timestamp, .. } => *timestamp,
        }
    }

    pub fn data(&self) -> &Bytes {
        match self {
            Self::Video { data, .. } | Self::Audio { data, .. } | Self::Metadata { data, .. } => data,
        }
    }

    /// Returns a copy of this unit with its timestamp reset to zero, used
    /// when replaying cached sequence headers to a subscriber that just
    /// joined: the first thing a late joiner sees must look like frame zero.
    pub fn with_zero_timestamp(&self) -> Self {
        match self {
            Self::Video { data, .. } => Self::Video { timestamp: 0, data: data.clone() },
            Self::Audio { data, .. } => Self::Audio { timestamp: 0, data: data.clone() },
            Self::Metadata { data, .. } => Self::Metadata { timestamp: 0, data: data.clone() },
        }
    }
}

/// Bounded so a stalled subscriber can't grow memory usage without limit; a
/// full queue means we drop media for that subscriber rather than block the
/// publisher or other subscribers.
pub const SUBSCRIBER_QUEUE_CAPACITY: usize = 100;

pub type DataProducer = mpsc::Sender<ChannelData>;
pub type DataConsumer = mpsc::Receiver<ChannelData>;

pub fn subscriber_channel() -> (DataProducer, DataConsumer) {
    mpsc::channel(SUBSCRIBER_QUEUE_CAPACITY)
}
